use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::dsl::{FlowCondition, LoopType, Node};
use crate::net::{DecompositionIndex, Edge, NodeIndex, SplitJoinType};
use tracing::{debug, warn};

impl<'a> Translation<'a> {
    pub(crate) fn rewrite_loops(&mut self, scope: &Scope<'a>) {
        let dec = scope.decomposition;
        for activity_id in self.ctx.take_looping(dec) {
            let (Some(node), Some(task)) = (self.graph.node(&activity_id), scope.get(&activity_id)) else {
                warn!(activity = %activity_id, "Looping activity has no task, loop dropped");
                continue;
            };
            let guard = self.loop_guard(node);
            self.rewrite_looping_task(dec, task, &guard);
        }
    }

    fn loop_guard(&self, node: &Node) -> String {
        match node.activity() {
            Some(activity) if activity.loop_type == LoopType::Standard => activity.loop_condition.clone(),
            _ => self.structural_loop_guard(&node.id).unwrap_or_default(),
        }
    }

    /// Factors AND decorators off `task`, then gives it a self-loop guarded by
    /// `guard` at ordering 1 with XOR split and join.
    pub(crate) fn rewrite_looping_task(&mut self, dec: DecompositionIndex, task: NodeIndex, guard: &str) {
        let Some((split_type, join_type)) = self
            .net
            .decomposition(dec)
            .task(task)
            .map(|t| (t.split_type, t.join_type))
        else {
            return;
        };

        if split_type == SplitJoinType::And {
            self.factor_split(dec, task, SplitJoinType::And, "SplitTask");
        }
        if join_type == SplitJoinType::And {
            self.factor_join(dec, task, SplitJoinType::And, "JoinTask");
        }

        let decomposition = self.net.decomposition_mut(dec);
        for edge in decomposition.outgoing_edges_mut(task) {
            edge.ordering += 1;
        }
        {
            let mut exits = decomposition.outgoing_edges_mut(task);
            if let (Some(exit), None) = (exits.next(), exits.next()) {
                if exit.predicate.is_empty() {
                    exit.default = true;
                }
            }
        }

        decomposition.create_edge(task, task, false, guard, 1);
        if let Some(t) = decomposition.task_mut(task) {
            t.split_type = SplitJoinType::Xor;
            t.join_type = SplitJoinType::Xor;
        }
        debug!(task = %decomposition.node_id(task), guard, "Loop rewritten");
    }

    /// Moves the outgoing edges of `task` onto a new downstream task carrying
    /// `split_type`, linked from `task` by a single edge. Returns the new task.
    pub(crate) fn factor_split(
        &mut self,
        dec: DecompositionIndex,
        task: NodeIndex,
        split_type: SplitJoinType,
        name: &str,
    ) -> NodeIndex {
        let split = self.synthesize_task(dec, name);
        let decomposition = self.net.decomposition_mut(dec);
        if let Some(t) = decomposition.task_mut(split) {
            t.split_type = split_type;
        }
        for edge in decomposition.take_outgoing(task) {
            decomposition.add_edge(Edge { source: split, ..edge });
        }
        decomposition.create_edge(task, split, false, "", 1);
        split
    }

    pub(crate) fn factor_join(
        &mut self,
        dec: DecompositionIndex,
        task: NodeIndex,
        join_type: SplitJoinType,
        name: &str,
    ) -> NodeIndex {
        let join = self.synthesize_task(dec, name);
        let decomposition = self.net.decomposition_mut(dec);
        if let Some(t) = decomposition.task_mut(join) {
            t.join_type = join_type;
        }
        for edge in decomposition.take_incoming(task) {
            decomposition.add_edge(Edge { target: join, ..edge });
        }
        decomposition.create_edge(join, task, false, "", 1);
        join
    }

    /// Whether `id` closes a cycle through exactly two control gateways:
    /// `id -> gateway -> gateway -> id`.
    pub(crate) fn is_structural_loop(&self, id: &str) -> bool {
        self.structural_loop_guard(id).is_some()
    }

    /// Guard of a structural loop: the expression on the flow between the two
    /// gateways, or empty when that flow is unguarded. `None` when `id` does
    /// not loop.
    pub(crate) fn structural_loop_guard(&self, id: &str) -> Option<String> {
        let mut found = None;
        for first in self.graph.outgoing(id) {
            let Some(gateway) = self.graph.node(&first.target).filter(|n| n.is_control_gateway()) else {
                continue;
            };
            for second in self.graph.outgoing(&gateway.id) {
                let Some(back) = self.graph.node(&second.target).filter(|n| n.is_control_gateway()) else {
                    continue;
                };
                if !self.graph.outgoing(&back.id).iter().any(|third| third.target == id) {
                    continue;
                }
                if let FlowCondition::Expression(expr) = second.condition() {
                    return Some(expr.to_string());
                }
                found.get_or_insert_with(String::new);
            }
        }
        found
    }
}
