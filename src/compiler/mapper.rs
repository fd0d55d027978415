use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::compiler::data::TaskVariables;
use crate::dsl::{
    Activity, EndResult, EventTrigger, GatewayKind, LoopType, Node, NodeType, TimerDefinition,
};
use crate::error::TranslateError;
use crate::net::{query, DecompositionIndex, NodeIndex, Timer, TimerTrigger, Variable, VariableMapping};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Id infix of tasks mapped from end-error events. The exception compiler
/// finds the error path of a subprocess by it.
pub const ERROR_EVENT_INFIX: &str = "ErrorEvent";

pub const TIMER_DATE_FORMAT: &str = "%d/%m/%y";

impl<'a> Translation<'a> {
    /// Maps one source node. Returns `None` for control gateways (folded later)
    /// and for nodes without a counterpart.
    pub(crate) fn map_element(
        &mut self,
        scope: &mut Scope<'a>,
        node: &'a Node,
    ) -> Result<Option<NodeIndex>, TranslateError> {
        let dec = scope.decomposition;
        let mapped = match &node.kind {
            NodeType::SubProcess { activity, nodes } => {
                let label = if node.label.is_empty() { &node.id } else { &node.label };
                let sub = self.build_decomposition(&node.id, label, nodes, false, scope.depth + 1)?;
                Some(self.map_task(dec, node, activity, Some(sub)))
            }
            NodeType::Task { activity } => Some(self.map_task(dec, node, activity, None)),
            NodeType::StartEvent => Some(
                self.net
                    .decomposition_mut(dec)
                    .ensure_input_condition(|| self.ctx.generate_id("input"), "inputCondition"),
            ),
            NodeType::EndEvent { result: EndResult::Plain } => Some(
                self.net
                    .decomposition_mut(dec)
                    .ensure_output_condition(|| self.ctx.generate_id("output"), "outputCondition"),
            ),
            NodeType::EndEvent { result: EndResult::Error } => {
                let id = self.ctx.generate_id(ERROR_EVENT_INFIX);
                Some(self.net.decomposition_mut(dec).create_task(id, "TaskMappedFromErrorEvent"))
            }
            NodeType::EndEvent { result: EndResult::Terminate } => {
                let id = self.ctx.generate_id("endTerminate");
                Some(self.net.decomposition_mut(dec).create_task(id, "CancellationTask"))
            }
            NodeType::Gateway { gateway: GatewayKind::XorEvent } => Some(self.map_event_based_gateway(scope, node)),
            NodeType::Gateway { .. } => None,
            NodeType::IntermediateEvent { trigger, timer, .. } => {
                self.map_intermediate_event(dec, node, *trigger, timer)
            }
        };

        if let Some(target) = mapped {
            scope.register(&node.id, target);
            debug!(
                node = %node.id,
                target = %self.net.decomposition(dec).node_id(target),
                "Mapped node"
            );
        }
        Ok(mapped)
    }

    /// An event-based gateway becomes a deferred-choice condition, shared with
    /// its predecessor when that one is already a condition.
    fn map_event_based_gateway(&mut self, scope: &Scope<'a>, node: &Node) -> NodeIndex {
        let dec = scope.decomposition;
        let predecessor = self
            .graph
            .first_predecessor(&node.id)
            .and_then(|pred| scope.get(&pred.id))
            .filter(|&pred| self.net.decomposition(dec).is_condition(pred));

        match predecessor {
            Some(condition) => condition,
            None => {
                let id = self.ctx.generate_id("EXorGW");
                self.net.decomposition_mut(dec).create_condition(id, "Condition")
            }
        }
    }

    fn map_intermediate_event(
        &mut self,
        dec: DecompositionIndex,
        node: &Node,
        trigger: EventTrigger,
        timer: &TimerDefinition,
    ) -> Option<NodeIndex> {
        let predecessor = self.graph.first_predecessor(&node.id);
        let after_gateway = predecessor.is_some_and(|p| p.is_gateway());
        let after_event_gateway = predecessor.is_some_and(|p| {
            matches!(p.kind, NodeType::Gateway { gateway: GatewayKind::XorEvent })
        });
        let before_gateway = self.graph.first_successor(&node.id).is_some_and(|s| s.is_gateway());

        match trigger {
            EventTrigger::Timer => Some(self.map_timer_event(dec, timer, false)),
            EventTrigger::Message if after_event_gateway => {
                Some(self.map_event_task(dec, "msg", "TaskMappedFromIntermediateMessageEvent"))
            }
            _ if after_gateway => {
                Some(self.map_event_task(dec, "intermediate", "TaskMappedFromIntermediateEvent"))
            }
            EventTrigger::Plain if before_gateway => {
                let id = self.ctx.generate_id("plain");
                Some(
                    self.net
                        .decomposition_mut(dec)
                        .create_condition(id, "ConditionMappedFromIntermediatePlainEvent"),
                )
            }
            _ => None,
        }
    }

    fn map_event_task(&mut self, dec: DecompositionIndex, infix: &str, name: &str) -> NodeIndex {
        let id = self.ctx.generate_id(infix);
        let task = self.net.decomposition_mut(dec).create_task(id, name);
        self.ensure_task_decomposition(dec, task);
        task
    }

    /// Maps a timer event to a timer task. Attached timers fire while their
    /// host executes, free-standing ones as soon as they are enabled.
    pub(crate) fn map_timer_event(&mut self, dec: DecompositionIndex, definition: &TimerDefinition, attached: bool) -> NodeIndex {
        let id = self.ctx.generate_id("timer");
        let date = definition
            .time_date
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .and_then(|text| match NaiveDate::parse_from_str(text, TIMER_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!(timer = %id, date = %text, error = %e, "Malformed timer date, timer keeps no fixed date");
                    None
                }
            });
        let trigger = if attached { TimerTrigger::OnExecuting } else { TimerTrigger::OnEnabled };

        let decomposition = self.net.decomposition_mut(dec);
        let scope_id = decomposition.id.clone();
        let variable = Variable::new(&format!("{}_timer", id), "string");
        decomposition.add_local_variable(variable.clone());

        let task = decomposition.create_task(id, "TimerTask");
        if let Some(t) = decomposition.task_mut(task) {
            t.timer = Some(Timer {
                trigger,
                cycle: definition.time_cycle.clone(),
                date,
            });
            t.add_starting_mapping(VariableMapping::new(
                query::read_variable(&scope_id, &variable.name),
                &variable.name,
            ));
        }

        if let Some(sub) = self.ensure_task_decomposition(dec, task) {
            self.net.decomposition_mut(sub).add_input_param(variable);
        }
        task
    }

    pub(crate) fn map_task(
        &mut self,
        dec: DecompositionIndex,
        node: &Node,
        activity: &Activity,
        sub: Option<DecompositionIndex>,
    ) -> NodeIndex {
        let id = self.ctx.generate_id("task");
        let task = self.net.decomposition_mut(dec).create_task(id, &node.label);

        let mut variables = TaskVariables::default();
        self.bind_properties(dec, task, activity, &mut variables);
        self.bind_assignments(dec, task, activity, &mut variables);

        let task_dec = match sub {
            Some(sub) => {
                if let Some(t) = self.net.decomposition_mut(dec).task_mut(task) {
                    t.decomposes_to = Some(sub);
                }
                Some(sub)
            }
            None => self.ensure_task_decomposition(dec, task),
        };
        if let Some(task_dec) = task_dec {
            self.declare_task_variables(dec, task_dec, variables);
        }

        if let Some(completion) = activity.multi_instance {
            self.compile_multi_instance(dec, task, completion);
        }

        if activity.loop_type == LoopType::Standard || self.is_structural_loop(&node.id) {
            self.ctx.register_looping(dec, &node.id);
        }

        if matches!(node.kind, NodeType::Task { .. }) {
            self.bind_resourcing(dec, task, node, activity);
        }
        task
    }
}
