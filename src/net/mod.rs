pub mod query;
pub mod serialize;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};

pub type NodeIndex = usize;
pub type DecompositionIndex = usize;

/// A workflow net: the root decomposition plus one per subprocess and one per
/// atomic task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Net {
    pub id: String,
    pub data_type_definition: Option<String>,
    pub decompositions: Vec<Decomposition>,
}

impl Net {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            data_type_definition: None,
            decompositions: Vec::new(),
        }
    }

    pub fn create_decomposition(&mut self, id: &str, kind: DecompositionKind) -> DecompositionIndex {
        self.decompositions.push(Decomposition::new(id, kind));
        self.decompositions.len() - 1
    }

    pub fn decomposition(&self, index: DecompositionIndex) -> &Decomposition {
        &self.decompositions[index]
    }

    pub fn decomposition_mut(&mut self, index: DecompositionIndex) -> &mut Decomposition {
        &mut self.decompositions[index]
    }

    pub fn root(&self) -> Option<&Decomposition> {
        self.decompositions.iter().find(|d| d.root)
    }

    pub fn find(&self, id: &str) -> Option<&Decomposition> {
        self.decompositions.iter().find(|d| d.id == id)
    }

    pub fn decomposition_of(&self, task: &Task) -> Option<&Decomposition> {
        task.decomposes_to.map(|i| &self.decompositions[i])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DecompositionKind {
    Net,
    WebServiceGateway,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decomposition {
    pub id: String,
    pub kind: DecompositionKind,
    pub root: bool,
    pub nodes: Vec<NetNode>,
    pub edges: Vec<Edge>,
    pub input_condition: Option<NodeIndex>,
    pub output_condition: Option<NodeIndex>,
    pub local_variables: Vec<Variable>,
    pub input_params: Vec<Variable>,
    pub output_params: Vec<Variable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "node")]
pub enum NetNode {
    Condition(Condition),
    Task(Task),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConditionKind {
    Input,
    Output,
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub id: String,
    pub name: String,
    pub kind: ConditionKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SplitJoinType {
    #[default]
    None,
    And,
    Or,
    Xor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub split_type: SplitJoinType,
    pub join_type: SplitJoinType,
    pub decomposes_to: Option<DecompositionIndex>,
    pub timer: Option<Timer>,
    pub multi_instance: Option<MultiInstanceParam>,
    pub resourcing: Option<Resourcing>,
    pub cancellation_set: Vec<NodeIndex>,
    pub starting_mappings: Vec<VariableMapping>,
    pub completed_mappings: Vec<VariableMapping>,
}

impl Task {
    pub fn add_starting_mapping(&mut self, mapping: VariableMapping) -> bool {
        push_mapping(&mut self.starting_mappings, mapping)
    }

    pub fn add_completed_mapping(&mut self, mapping: VariableMapping) -> bool {
        push_mapping(&mut self.completed_mappings, mapping)
    }
}

fn push_mapping(mappings: &mut Vec<VariableMapping>, mapping: VariableMapping) -> bool {
    if mappings.iter().any(|m| m.query.eq_ignore_ascii_case(&mapping.query)) {
        return false;
    }
    mappings.push(mapping);
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: NodeIndex,
    pub target: NodeIndex,
    pub default: bool,
    pub predicate: String,
    pub ordering: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    pub name: String,
    pub data_type: String,
    pub initial_value: Option<String>,
}

impl Variable {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            initial_value: None,
        }
    }

    pub fn with_initial_value(mut self, value: Option<String>) -> Self {
        self.initial_value = value;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariableMapping {
    pub query: String,
    pub variable: String,
}

impl VariableMapping {
    pub fn new(query: String, variable: &str) -> Self {
        Self { query, variable: variable.to_string() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerTrigger {
    OnEnabled,
    OnExecuting,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timer {
    pub trigger: TimerTrigger,
    pub cycle: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CreationMode {
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiInstanceParam {
    pub minimum: u32,
    pub maximum: u32,
    pub threshold: Option<u32>,
    pub creation_mode: CreationMode,
    pub data_input: MiDataInput,
    pub data_output: MiDataOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiDataInput {
    pub expression: String,
    pub splitting_expression: String,
    pub formal_input_param: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MiDataOutput {
    pub formal_output_expression: String,
    pub output_joining_expression: String,
    pub result_applied_to_local_variable: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Initiator {
    #[default]
    User,
    System,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceKind {
    Role,
    Participant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DistributionSet {
    pub initial_set: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Resourcing {
    pub offer: Initiator,
    pub allocate: Initiator,
    pub start: Initiator,
    pub offer_distribution_set: Option<DistributionSet>,
    pub allocate_distribution_set: Option<DistributionSet>,
}

impl Decomposition {
    pub fn new(id: &str, kind: DecompositionKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            root: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            input_condition: None,
            output_condition: None,
            local_variables: Vec::new(),
            input_params: Vec::new(),
            output_params: Vec::new(),
        }
    }

    pub fn create_task(&mut self, id: String, name: &str) -> NodeIndex {
        self.nodes.push(NetNode::Task(Task {
            id,
            name: name.to_string(),
            ..Default::default()
        }));
        self.nodes.len() - 1
    }

    pub fn create_condition(&mut self, id: String, name: &str) -> NodeIndex {
        self.push_condition(id, name, ConditionKind::Plain)
    }

    pub fn ensure_input_condition(&mut self, id: impl FnOnce() -> String, name: &str) -> NodeIndex {
        if let Some(existing) = self.input_condition {
            return existing;
        }
        let index = self.push_condition(id(), name, ConditionKind::Input);
        self.input_condition = Some(index);
        index
    }

    pub fn ensure_output_condition(&mut self, id: impl FnOnce() -> String, name: &str) -> NodeIndex {
        if let Some(existing) = self.output_condition {
            return existing;
        }
        let index = self.push_condition(id(), name, ConditionKind::Output);
        self.output_condition = Some(index);
        index
    }

    fn push_condition(&mut self, id: String, name: &str, kind: ConditionKind) -> NodeIndex {
        self.nodes.push(NetNode::Condition(Condition {
            id,
            name: name.to_string(),
            kind,
        }));
        self.nodes.len() - 1
    }

    pub fn node(&self, index: NodeIndex) -> &NetNode {
        &self.nodes[index]
    }

    pub fn node_id(&self, index: NodeIndex) -> &str {
        match &self.nodes[index] {
            NetNode::Condition(c) => &c.id,
            NetNode::Task(t) => &t.id,
        }
    }

    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        (0..self.nodes.len()).find(|&i| self.node_id(i) == id)
    }

    pub fn task(&self, index: NodeIndex) -> Option<&Task> {
        match &self.nodes[index] {
            NetNode::Task(t) => Some(t),
            NetNode::Condition(_) => None,
        }
    }

    pub fn task_mut(&mut self, index: NodeIndex) -> Option<&mut Task> {
        match &mut self.nodes[index] {
            NetNode::Task(t) => Some(t),
            NetNode::Condition(_) => None,
        }
    }

    pub fn is_condition(&self, index: NodeIndex) -> bool {
        matches!(self.nodes[index], NetNode::Condition(_))
    }

    pub fn is_boundary_condition(&self, index: NodeIndex) -> bool {
        self.input_condition == Some(index) || self.output_condition == Some(index)
    }

    pub fn tasks(&self) -> impl Iterator<Item = (NodeIndex, &Task)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            NetNode::Task(t) => Some((i, t)),
            NetNode::Condition(_) => None,
        })
    }

    pub fn create_edge(&mut self, source: NodeIndex, target: NodeIndex, default: bool, predicate: &str, ordering: u32) {
        self.edges.push(Edge {
            source,
            target,
            default,
            predicate: predicate.to_string(),
            ordering,
        });
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn outgoing_edges(&self, node: NodeIndex) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.source == node)
    }

    pub fn incoming_edges(&self, node: NodeIndex) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.target == node)
    }

    pub fn outgoing_count(&self, node: NodeIndex) -> usize {
        self.outgoing_edges(node).count()
    }

    pub fn incoming_count(&self, node: NodeIndex) -> usize {
        self.incoming_edges(node).count()
    }

    pub fn has_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
        self.edges.iter().any(|e| e.source == source && e.target == target)
    }

    pub fn take_outgoing(&mut self, node: NodeIndex) -> Vec<Edge> {
        let (taken, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.source == node);
        self.edges = kept;
        taken
    }

    pub fn take_incoming(&mut self, node: NodeIndex) -> Vec<Edge> {
        let (taken, kept): (Vec<Edge>, Vec<Edge>) =
            std::mem::take(&mut self.edges).into_iter().partition(|e| e.target == node);
        self.edges = kept;
        taken
    }

    pub fn outgoing_edges_mut(&mut self, node: NodeIndex) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut().filter(move |e| e.source == node)
    }

    /// Adds `member` to the cancellation set of `task`. Input/output conditions,
    /// the task itself and duplicates are refused.
    pub fn cancel_on(&mut self, task: NodeIndex, member: NodeIndex) -> bool {
        if task == member || self.is_boundary_condition(member) {
            return false;
        }
        match self.task_mut(task) {
            Some(t) if !t.cancellation_set.contains(&member) => {
                t.cancellation_set.push(member);
                true
            }
            _ => false,
        }
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.local_variables.iter().any(|v| v.name.eq_ignore_ascii_case(name))
    }

    pub fn add_local_variable(&mut self, variable: Variable) -> bool {
        push_variable(&mut self.local_variables, variable)
    }

    pub fn add_input_param(&mut self, variable: Variable) -> bool {
        push_variable(&mut self.input_params, variable)
    }

    pub fn add_output_param(&mut self, variable: Variable) -> bool {
        push_variable(&mut self.output_params, variable)
    }
}

fn push_variable(variables: &mut Vec<Variable>, variable: Variable) -> bool {
    if variables.iter().any(|v| v.name.eq_ignore_ascii_case(&variable.name)) {
        return false;
    }
    variables.push(variable);
    true
}
