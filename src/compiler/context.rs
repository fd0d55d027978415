use crate::net::{DecompositionIndex, NodeIndex};
use std::collections::HashMap;

/// State living for exactly one translation run. Never shared between runs.
#[derive(Debug, Default)]
pub struct TranslationContext {
    node_count: u32,
    looping: HashMap<DecompositionIndex, Vec<String>>,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique node name, `Node_<infix>_<n>`.
    pub fn generate_id(&mut self, infix: &str) -> String {
        let id = format!("Node_{}_{}", infix, self.node_count);
        self.node_count += 1;
        id
    }

    pub fn generate_gateway_id(&mut self) -> String {
        self.generate_id("gw")
    }

    pub fn generated_count(&self) -> u32 {
        self.node_count
    }

    pub fn register_looping(&mut self, decomposition: DecompositionIndex, activity: &str) {
        let entries = self.looping.entry(decomposition).or_default();
        if !entries.iter().any(|a| a == activity) {
            entries.push(activity.to_string());
        }
    }

    pub fn take_looping(&mut self, decomposition: DecompositionIndex) -> Vec<String> {
        self.looping.remove(&decomposition).unwrap_or_default()
    }
}

/// Source-to-target node mapping of the decomposition under construction.
///
/// Several source nodes may share a target (folded gateways); registration
/// order is kept so linking is deterministic.
#[derive(Debug)]
pub struct Scope<'a> {
    pub decomposition: DecompositionIndex,
    pub depth: usize,
    node_map: HashMap<&'a str, NodeIndex>,
    order: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn new(decomposition: DecompositionIndex, depth: usize) -> Self {
        Self {
            decomposition,
            depth,
            node_map: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, source: &'a str, target: NodeIndex) {
        if self.node_map.insert(source, target).is_none() {
            self.order.push(source);
        }
    }

    pub fn get(&self, source: &str) -> Option<NodeIndex> {
        self.node_map.get(source).copied()
    }

    pub fn mapped(&self) -> Vec<&'a str> {
        self.order.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
