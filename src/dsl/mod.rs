pub mod builder;
pub mod graph;

use serde::{Serialize, Deserialize};

/// A parsed source diagram: one or more pools plus the flows and data objects
/// connecting their nodes. Node ids are unique across the whole diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Diagram {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data_type_definition: Option<String>,
    pub processes: Vec<Container>,
    #[serde(default)]
    pub flows: Vec<SequenceFlow>,
    #[serde(default)]
    pub data_objects: Vec<DataObject>,
}

/// A pool (top-level process).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Container {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lane {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Lane the node is drawn in, if any.
    #[serde(default)]
    pub lane: Option<String>,
    #[serde(flatten)]
    pub kind: NodeType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeType {
    Task {
        #[serde(default)]
        activity: Activity,
    },
    SubProcess {
        #[serde(default)]
        activity: Activity,
        #[serde(default)]
        nodes: Vec<Node>,
    },
    Gateway {
        gateway: GatewayKind,
    },
    StartEvent,
    EndEvent {
        #[serde(default)]
        result: EndResult,
    },
    IntermediateEvent {
        trigger: EventTrigger,
        #[serde(default)]
        timer: TimerDefinition,
        /// Host activity for boundary events.
        #[serde(default)]
        attached_to: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GatewayKind {
    And,
    Or,
    XorData,
    XorEvent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EndResult {
    #[default]
    Plain,
    Error,
    Terminate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventTrigger {
    Plain,
    Timer,
    Message,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimerDefinition {
    /// Literal date, `dd/mm/yy`.
    #[serde(default)]
    pub time_date: Option<String>,
    #[serde(default)]
    pub time_cycle: Option<String>,
}

/// Attributes shared by tasks and subprocesses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Activity {
    #[serde(default)]
    pub loop_type: LoopType,
    #[serde(default)]
    pub loop_condition: String,
    /// `Some` marks the activity as multiple-instance.
    #[serde(default)]
    pub multi_instance: Option<MiCompletion>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub offered_by: Option<String>,
    #[serde(default)]
    pub allocated_by: Option<String>,
    #[serde(default)]
    pub started_by: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LoopType {
    #[default]
    None,
    Standard,
}

/// Completion condition of a multiple-instance activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MiCompletion {
    None,
    One,
    All,
    Complex,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assignment {
    pub to: String,
    pub assign_time: AssignTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssignTime {
    Start,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceFlow {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub condition: Option<String>,
    /// Taken only when no sibling guard holds.
    #[serde(default)]
    pub default: bool,
}

/// How a flow is guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCondition<'a> {
    None,
    Expression(&'a str),
    Default,
}

impl SequenceFlow {
    pub fn condition(&self) -> FlowCondition<'_> {
        if self.default {
            return FlowCondition::Default;
        }
        match self.condition.as_deref() {
            Some(expr) if !expr.is_empty() => FlowCondition::Expression(expr),
            _ => FlowCondition::None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataObject {
    pub id: String,
    pub label: String,
    #[serde(default = "default_data_type")]
    pub data_type: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Nodes reading the object.
    #[serde(default)]
    pub feeds: Vec<String>,
    /// Nodes writing the object.
    #[serde(default)]
    pub fed_by: Vec<String>,
}

fn default_data_type() -> String {
    "string".to_string()
}

impl Node {
    pub fn activity(&self) -> Option<&Activity> {
        match &self.kind {
            NodeType::Task { activity } | NodeType::SubProcess { activity, .. } => Some(activity),
            _ => None,
        }
    }

    pub fn is_gateway(&self) -> bool {
        matches!(self.kind, NodeType::Gateway { .. })
    }

    /// AND, OR and data-based XOR gateways: the ones folded into split/join decorators.
    pub fn is_control_gateway(&self) -> bool {
        matches!(
            self.kind,
            NodeType::Gateway { gateway: GatewayKind::And | GatewayKind::Or | GatewayKind::XorData }
        )
    }

    pub fn attached_to(&self) -> Option<&str> {
        match &self.kind {
            NodeType::IntermediateEvent { attached_to, .. } => attached_to.as_deref(),
            _ => None,
        }
    }

    pub fn is_end_with(&self, expected: EndResult) -> bool {
        matches!(&self.kind, NodeType::EndEvent { result } if *result == expected)
    }
}

impl Diagram {
    /// Depth-first walk over every node of every pool, subprocess children included.
    pub fn all_nodes(&self) -> Vec<&Node> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Node>) {
            for node in nodes {
                out.push(node);
                if let NodeType::SubProcess { nodes, .. } = &node.kind {
                    walk(nodes, out);
                }
            }
        }

        let mut out = Vec::new();
        for process in &self.processes {
            walk(&process.nodes, &mut out);
        }
        out
    }
}
