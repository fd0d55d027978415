use crate::dsl::{Diagram, Node, SequenceFlow};
use std::collections::HashMap;

/// Read-only adjacency index over a diagram.
///
/// Flows and attached events are kept in declaration order so that every
/// consumer (linker, gateway folder, loop detection) sees a deterministic
/// traversal.
pub struct SourceGraph<'a> {
    diagram: &'a Diagram,
    nodes: HashMap<&'a str, &'a Node>,
    outgoing: HashMap<&'a str, Vec<&'a SequenceFlow>>,
    incoming: HashMap<&'a str, Vec<&'a SequenceFlow>>,
    attached: HashMap<&'a str, Vec<&'a Node>>,
}

impl<'a> SourceGraph<'a> {
    pub fn new(diagram: &'a Diagram) -> Self {
        let mut nodes = HashMap::new();
        let mut attached: HashMap<&str, Vec<&Node>> = HashMap::new();
        for node in diagram.all_nodes() {
            nodes.insert(node.id.as_str(), node);
            if let Some(host) = node.attached_to() {
                attached.entry(host).or_default().push(node);
            }
        }

        let mut outgoing: HashMap<&str, Vec<&SequenceFlow>> = HashMap::new();
        let mut incoming: HashMap<&str, Vec<&SequenceFlow>> = HashMap::new();
        for flow in &diagram.flows {
            outgoing.entry(flow.source.as_str()).or_default().push(flow);
            incoming.entry(flow.target.as_str()).or_default().push(flow);
        }

        Self { diagram, nodes, outgoing, incoming, attached }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn outgoing(&self, id: &str) -> &[&'a SequenceFlow] {
        self.outgoing.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn incoming(&self, id: &str) -> &[&'a SequenceFlow] {
        self.incoming.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn fan_out(&self, id: &str) -> usize {
        self.outgoing(id).len()
    }

    pub fn fan_in(&self, id: &str) -> usize {
        self.incoming(id).len()
    }

    /// Boundary events anchored on `host`.
    pub fn attached_events(&self, host: &str) -> &[&'a Node] {
        self.attached.get(host).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Source node of the first incoming flow.
    pub fn first_predecessor(&self, id: &str) -> Option<&'a Node> {
        self.incoming(id).first().and_then(|f| self.node(&f.source))
    }

    /// Target node of the first outgoing flow.
    pub fn first_successor(&self, id: &str) -> Option<&'a Node> {
        self.outgoing(id).first().and_then(|f| self.node(&f.target))
    }
}
