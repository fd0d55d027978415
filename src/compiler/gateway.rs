use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::dsl::{GatewayKind, Node, NodeType};
use crate::net::{NodeIndex, SplitJoinType};
use tracing::debug;

pub fn decorator_for(gateway: GatewayKind) -> SplitJoinType {
    match gateway {
        GatewayKind::And => SplitJoinType::And,
        GatewayKind::Or => SplitJoinType::Or,
        GatewayKind::XorData | GatewayKind::XorEvent => SplitJoinType::Xor,
    }
}

impl<'a> Translation<'a> {
    /// Resolves a deferred gateway to a task carrying its split and/or join
    /// decorator. A split folds onto its predecessor task and a join onto its
    /// successor task when that neighbour is a task of its own; otherwise a new
    /// task is synthesized.
    pub(crate) fn fold_gateway(&mut self, scope: &mut Scope<'a>, node: &'a Node) {
        let NodeType::Gateway { gateway } = node.kind else {
            return;
        };
        let dec = scope.decomposition;
        let fan_in = self.graph.fan_in(&node.id);
        let fan_out = self.graph.fan_out(&node.id);

        let (task, split, join) = if fan_in > 1 && fan_out > 1 {
            (self.synthesize_task(dec, "Task"), true, true)
        } else if fan_out > 1 {
            let neighbour = self.graph.incoming(&node.id).first().map(|f| f.source.as_str());
            let neighbour_fan = neighbour.map(|n| self.graph.fan_out(n)).unwrap_or(0);
            (self.fold_target(scope, neighbour, neighbour_fan), true, false)
        } else if fan_in > 1 {
            let neighbour = self.graph.outgoing(&node.id).first().map(|f| f.target.as_str());
            let neighbour_fan = neighbour.map(|n| self.graph.fan_in(n)).unwrap_or(0);
            (self.fold_target(scope, neighbour, neighbour_fan), false, true)
        } else {
            debug!(gateway = %node.id, "Pass-through gateway becomes a plain task");
            (self.synthesize_task(dec, "Task"), false, false)
        };

        let decorator = decorator_for(gateway);
        let decomposition = self.net.decomposition_mut(dec);
        if let Some(t) = decomposition.task_mut(task) {
            if split {
                t.split_type = decorator;
            }
            if join {
                t.join_type = decorator;
            }
        }
        debug!(
            gateway = %node.id,
            task = %decomposition.node_id(task),
            split,
            join,
            "Gateway resolved"
        );
        scope.register(&node.id, task);
    }

    fn fold_target(&mut self, scope: &Scope<'a>, neighbour: Option<&str>, neighbour_fan: usize) -> NodeIndex {
        let dec = scope.decomposition;
        match neighbour.and_then(|n| scope.get(n)) {
            Some(existing) if neighbour_fan <= 1 && !self.net.decomposition(dec).is_condition(existing) => existing,
            _ => self.synthesize_task(dec, "Task"),
        }
    }
}
