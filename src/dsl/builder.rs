use crate::dsl::{
    Activity, AssignTime, Assignment, Container, DataObject, Diagram, EndResult, EventTrigger,
    GatewayKind, Lane, LoopType, MiCompletion, Node, NodeType, Property, SequenceFlow,
    TimerDefinition,
};

pub struct DiagramBuilder {
    id: String,
    name: String,
    data_type_definition: Option<String>,
    processes: Vec<Container>,
    flows: Vec<SequenceFlow>,
    data_objects: Vec<DataObject>,
}

impl DiagramBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            data_type_definition: None,
            processes: Vec::new(),
            flows: Vec::new(),
            data_objects: Vec::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn data_types(mut self, definition: &str) -> Self {
        self.data_type_definition = Some(definition.to_string());
        self
    }

    /// Adds a pool; nodes are declared through the closure.
    pub fn pool(mut self, id: &str, nodes: impl FnOnce(ContainerBuilder) -> ContainerBuilder) -> Self {
        let built = nodes(ContainerBuilder::new());
        self.processes.push(Container {
            id: id.to_string(),
            name: id.to_string(),
            lanes: built.lanes,
            nodes: built.nodes,
        });
        self
    }

    pub fn connect(mut self, source: &str, target: &str) -> Self {
        self.flows.push(SequenceFlow {
            source: source.to_string(),
            target: target.to_string(),
            condition: None,
            default: false,
        });
        self
    }

    pub fn connect_if(mut self, source: &str, target: &str, condition: &str) -> Self {
        self.flows.push(SequenceFlow {
            source: source.to_string(),
            target: target.to_string(),
            condition: Some(condition.to_string()),
            default: false,
        });
        self
    }

    pub fn connect_default(mut self, source: &str, target: &str) -> Self {
        self.flows.push(SequenceFlow {
            source: source.to_string(),
            target: target.to_string(),
            condition: None,
            default: true,
        });
        self
    }

    /// Declares a data object read by `feeds` and written by `fed_by`.
    pub fn data_object(
        mut self,
        id: &str,
        label: &str,
        data_type: &str,
        feeds: &[&str],
        fed_by: &[&str],
    ) -> Self {
        self.data_objects.push(DataObject {
            id: id.to_string(),
            label: label.to_string(),
            data_type: data_type.to_string(),
            value: None,
            feeds: feeds.iter().map(|s| s.to_string()).collect(),
            fed_by: fed_by.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn build(self) -> Diagram {
        Diagram {
            id: self.id,
            name: self.name,
            data_type_definition: self.data_type_definition,
            processes: self.processes,
            flows: self.flows,
            data_objects: self.data_objects,
        }
    }
}

/// Collects the nodes of a pool or subprocess.
pub struct ContainerBuilder {
    lanes: Vec<Lane>,
    nodes: Vec<Node>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self { lanes: Vec::new(), nodes: Vec::new() }
    }

    fn push(mut self, id: &str, label: &str, kind: NodeType) -> Self {
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            lane: None,
            kind,
        });
        self
    }

    pub fn lane(mut self, id: &str, name: &str) -> Self {
        self.lanes.push(Lane { id: id.to_string(), name: name.to_string() });
        self
    }

    pub fn start(self, id: &str) -> Self {
        self.push(id, "", NodeType::StartEvent)
    }

    pub fn end(self, id: &str) -> Self {
        self.push(id, "", NodeType::EndEvent { result: EndResult::Plain })
    }

    pub fn end_error(self, id: &str) -> Self {
        self.push(id, "", NodeType::EndEvent { result: EndResult::Error })
    }

    pub fn end_terminate(self, id: &str) -> Self {
        self.push(id, "", NodeType::EndEvent { result: EndResult::Terminate })
    }

    pub fn task(self, id: &str, label: &str) -> Self {
        self.push(id, label, NodeType::Task { activity: Activity::default() })
    }

    /// Adds a task whose activity attributes are configured through the closure.
    pub fn task_with(mut self, id: &str, label: &str, configure: impl FnOnce(ActivityBuilder) -> ActivityBuilder) -> Self {
        let built = configure(ActivityBuilder::default());
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            lane: built.lane,
            kind: NodeType::Task { activity: built.activity },
        });
        self
    }

    pub fn subprocess(self, id: &str, label: &str, nodes: impl FnOnce(ContainerBuilder) -> ContainerBuilder) -> Self {
        self.subprocess_with(id, label, |a| a, nodes)
    }

    pub fn subprocess_with(
        mut self,
        id: &str,
        label: &str,
        configure: impl FnOnce(ActivityBuilder) -> ActivityBuilder,
        nodes: impl FnOnce(ContainerBuilder) -> ContainerBuilder,
    ) -> Self {
        let built = configure(ActivityBuilder::default());
        let children = nodes(ContainerBuilder::new());
        self.nodes.push(Node {
            id: id.to_string(),
            label: label.to_string(),
            lane: built.lane,
            kind: NodeType::SubProcess { activity: built.activity, nodes: children.nodes },
        });
        self
    }

    pub fn gateway(self, id: &str, gateway: GatewayKind) -> Self {
        self.push(id, "", NodeType::Gateway { gateway })
    }

    pub fn intermediate(self, id: &str, trigger: EventTrigger) -> Self {
        self.push(id, "", NodeType::IntermediateEvent {
            trigger,
            timer: TimerDefinition::default(),
            attached_to: None,
        })
    }

    pub fn timer(self, id: &str, time_date: Option<&str>, time_cycle: Option<&str>) -> Self {
        self.push(id, "", NodeType::IntermediateEvent {
            trigger: EventTrigger::Timer,
            timer: TimerDefinition {
                time_date: time_date.map(str::to_string),
                time_cycle: time_cycle.map(str::to_string),
            },
            attached_to: None,
        })
    }

    /// Boundary event anchored on `host`.
    pub fn attached(self, id: &str, trigger: EventTrigger, host: &str) -> Self {
        self.push(id, "", NodeType::IntermediateEvent {
            trigger,
            timer: TimerDefinition::default(),
            attached_to: Some(host.to_string()),
        })
    }

    pub fn attached_timer(self, id: &str, time_cycle: &str, host: &str) -> Self {
        self.push(id, "", NodeType::IntermediateEvent {
            trigger: EventTrigger::Timer,
            timer: TimerDefinition { time_date: None, time_cycle: Some(time_cycle.to_string()) },
            attached_to: Some(host.to_string()),
        })
    }
}

#[derive(Default)]
pub struct ActivityBuilder {
    activity: Activity,
    lane: Option<String>,
}

impl ActivityBuilder {
    pub fn standard_loop(mut self, condition: &str) -> Self {
        self.activity.loop_type = LoopType::Standard;
        self.activity.loop_condition = condition.to_string();
        self
    }

    pub fn multi_instance(mut self, completion: MiCompletion) -> Self {
        self.activity.multi_instance = Some(completion);
        self
    }

    pub fn property(mut self, name: &str, ty: &str, value: &str) -> Self {
        self.activity.properties.push(Property {
            name: name.to_string(),
            ty: Some(ty.to_string()),
            value: Some(value.to_string()),
        });
        self
    }

    pub fn assign(mut self, to: &str, assign_time: AssignTime) -> Self {
        self.activity.assignments.push(Assignment {
            to: to.to_string(),
            assign_time,
        });
        self
    }

    pub fn offered_by(mut self, initiator: &str) -> Self {
        self.activity.offered_by = Some(initiator.to_string());
        self
    }

    pub fn allocated_by(mut self, initiator: &str) -> Self {
        self.activity.allocated_by = Some(initiator.to_string());
        self
    }

    pub fn started_by(mut self, initiator: &str) -> Self {
        self.activity.started_by = Some(initiator.to_string());
        self
    }

    pub fn lane(mut self, lane: &str) -> Self {
        self.lane = Some(lane.to_string());
        self
    }
}
