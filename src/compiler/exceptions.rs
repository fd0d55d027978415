use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::compiler::mapper::ERROR_EVENT_INFIX;
use crate::dsl::{EventTrigger, Node, NodeType};
use crate::net::{query, DecompositionIndex, Edge, NodeIndex, SplitJoinType, Variable, VariableMapping};
use tracing::{debug, warn};

impl<'a> Translation<'a> {
    pub(crate) fn compile_exceptions(&mut self, scope: &mut Scope<'a>, host: &'a Node) {
        let dec = scope.decomposition;
        let Some(host_task) = scope.get(&host.id) else {
            warn!(activity = %host.id, "Activity with boundary events has no task");
            return;
        };

        let events = self.graph.attached_events(&host.id);
        let (timers, others): (Vec<&'a Node>, Vec<&'a Node>) =
            events.iter().copied().partition(|e| trigger_of(e) == Some(EventTrigger::Timer));

        if !others.is_empty() {
            // The host chooses between its normal path and the error paths, so it
            // becomes an XOR split; a wider split moves onto a new downstream task.
            let decomposition = self.net.decomposition(dec);
            if decomposition.outgoing_count(host_task) > 1 {
                let split_type = decomposition.task(host_task).map(|t| t.split_type).unwrap_or_default();
                self.factor_split(dec, host_task, split_type, "newSplitTask");
            }
            if let Some(t) = self.net.decomposition_mut(dec).task_mut(host_task) {
                t.split_type = SplitJoinType::Xor;
            }
        }

        for event in others {
            match trigger_of(event) {
                Some(EventTrigger::Error) => self.compile_error_handler(scope, host_task, event),
                trigger => debug!(event = %event.id, ?trigger, "Boundary event has no exception mapping"),
            }
        }
        if !timers.is_empty() {
            self.compile_timer_handlers(scope, host_task, &timers);
        }
    }

    fn compile_error_handler(&mut self, scope: &Scope<'a>, host: NodeIndex, event: &Node) {
        let dec = scope.decomposition;
        let Some(target) = self.graph.first_successor(&event.id).and_then(|n| scope.get(&n.id)) else {
            warn!(event = %event.id, "Error boundary event has no mapped target");
            return;
        };

        let decomposition = self.net.decomposition_mut(dec);
        let scope_id = decomposition.id.clone();
        let host_id = decomposition.node_id(host).to_string();
        let flag = query::error_flag_name(&host_id);
        let inner_flag = query::inner_error_flag_name(&host_id);
        let predicate = query::text_path(&scope_id, &flag);

        // Error edges take the first slots, unguarded siblings become the default.
        for edge in decomposition.outgoing_edges_mut(host) {
            edge.ordering += 1;
            if edge.predicate.is_empty() {
                edge.default = true;
            }
        }
        decomposition.add_edge(Edge {
            source: host,
            target,
            default: false,
            predicate,
            ordering: 1,
        });

        decomposition.add_local_variable(
            Variable::new(&flag, "boolean").with_initial_value(Some("false".to_string())),
        );
        let inner_dec = decomposition.task_mut(host).and_then(|t| t.decomposes_to);
        let Some(inner_dec) = inner_dec else {
            warn!(task = %host_id, "Host task has no decomposition to raise its error flag");
            return;
        };
        let inner_scope = self.net.decomposition(inner_dec).id.clone();
        if let Some(t) = self.net.decomposition_mut(dec).task_mut(host) {
            t.add_completed_mapping(VariableMapping::new(
                query::wrap(&flag, &query::text_path(&inner_scope, &inner_flag)),
                &flag,
            ));
        }

        let inner = self.net.decomposition_mut(inner_dec);
        inner.add_local_variable(
            Variable::new(&inner_flag, "boolean").with_initial_value(Some("false".to_string())),
        );
        inner.add_output_param(Variable::new(&inner_flag, "boolean"));

        let error_tasks: Vec<NodeIndex> = inner
            .tasks()
            .filter(|(_, t)| t.id.contains(ERROR_EVENT_INFIX))
            .map(|(i, _)| i)
            .collect();
        if error_tasks.is_empty() {
            warn!(task = %host_id, "No error-event task found inside the host, flag is never raised");
        }
        for error_task in error_tasks {
            if let Some(t) = self.net.decomposition_mut(inner_dec).task_mut(error_task) {
                t.add_completed_mapping(VariableMapping::new(query::literal(&inner_flag, "true"), &inner_flag));
            }
            self.ensure_task_decomposition(inner_dec, error_task);
        }
        debug!(task = %host_id, flag = %flag, "Error handler compiled");
    }

    /// Maps the timers attached to `host` and puts host and timers into one
    /// mutual cancellation set, all enabled by a shared predecessor.
    fn compile_timer_handlers(&mut self, scope: &mut Scope<'a>, host: NodeIndex, timers: &[&'a Node]) {
        let dec = scope.decomposition;
        let mut timer_tasks = Vec::new();
        for timer in timers {
            let NodeType::IntermediateEvent { timer: definition, .. } = &timer.kind else {
                continue;
            };
            let task = self.map_timer_event(dec, definition, true);
            scope.register(&timer.id, task);
            match self.graph.first_successor(&timer.id).and_then(|n| scope.get(&n.id)) {
                Some(target) => self.net.decomposition_mut(dec).create_edge(task, target, false, "", 1),
                None => warn!(event = %timer.id, "Timer boundary event has no mapped target"),
            }
            timer_tasks.push(task);
        }

        let decomposition = self.net.decomposition_mut(dec);
        for &timer in &timer_tasks {
            decomposition.cancel_on(host, timer);
            decomposition.cancel_on(timer, host);
            for &other in &timer_tasks {
                decomposition.cancel_on(timer, other);
            }
        }

        let Some(predecessor) = self.timer_predecessor(dec, host) else {
            warn!(
                task = %self.net.decomposition(dec).node_id(host),
                "Host has no predecessor, attached timers stay unconnected"
            );
            return;
        };
        let decomposition = self.net.decomposition_mut(dec);
        let mut order = decomposition.outgoing_count(predecessor) as u32;
        for timer in timer_tasks {
            order += 1;
            decomposition.create_edge(predecessor, timer, false, "", order);
        }
        if let Some(t) = decomposition.task_mut(predecessor) {
            t.split_type = SplitJoinType::And;
        }
    }

    /// The task enabling the host and its timers together. An existing sole
    /// predecessor task is reused when it leads only to the host or already
    /// splits in parallel; otherwise a new task is put in front of the host.
    fn timer_predecessor(&mut self, dec: DecompositionIndex, host: NodeIndex) -> Option<NodeIndex> {
        let decomposition = self.net.decomposition(dec);
        let incoming: Vec<NodeIndex> = decomposition
            .incoming_edges(host)
            .filter(|e| e.source != host)
            .map(|e| e.source)
            .collect();

        match incoming.as_slice() {
            [] => None,
            [source] => {
                let source = *source;
                let reusable = decomposition.task(source).is_some_and(|t| {
                    decomposition.outgoing_count(source) == 1 || t.split_type == SplitJoinType::And
                });
                if reusable {
                    return Some(source);
                }
                let predecessor = self.synthesize_task(dec, "Task");
                let decomposition = self.net.decomposition_mut(dec);
                for edge in decomposition.edges.iter_mut() {
                    if edge.source == source && edge.target == host {
                        edge.target = predecessor;
                    }
                }
                decomposition.create_edge(predecessor, host, false, "", 1);
                Some(predecessor)
            }
            _ => {
                // Several incoming edges: the new task takes over the host's join.
                let join_type = decomposition.task(host).map(|t| t.join_type).unwrap_or_default();
                let predecessor = self.factor_join(dec, host, join_type, "Task");
                let decomposition = self.net.decomposition_mut(dec);
                if let Some(t) = decomposition.task_mut(host) {
                    t.join_type = SplitJoinType::None;
                }
                debug!(
                    task = %decomposition.node_id(host),
                    join = ?join_type,
                    "Join factored ahead of attached timers"
                );
                Some(predecessor)
            }
        }
    }
}

fn trigger_of(node: &Node) -> Option<EventTrigger> {
    match &node.kind {
        NodeType::IntermediateEvent { trigger, .. } => Some(*trigger),
        _ => None,
    }
}
