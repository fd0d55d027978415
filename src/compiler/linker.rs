use crate::compiler::context::Scope;
use crate::compiler::core::Translation;
use crate::dsl::{EndResult, FlowCondition};
use crate::net::NodeIndex;
use std::collections::HashMap;
use tracing::debug;

impl<'a> Translation<'a> {
    /// Turns the sequence flows of every mapped node into edges.
    ///
    /// Each source task numbers its outgoing edges from 1 in traversal order; a
    /// default flow is held back and numbered after all of its siblings. Flows
    /// collapsed by gateway folding and flows with an unmapped endpoint are
    /// dropped. Returns the terminating tasks, whose cancellation sets are
    /// closed once the decomposition is complete.
    pub(crate) fn link(&mut self, scope: &Scope<'a>) -> Vec<NodeIndex> {
        let dec = scope.decomposition;
        let mut counter: HashMap<NodeIndex, u32> = HashMap::new();
        let mut terminates = Vec::new();

        for source_id in scope.mapped() {
            let (Some(node), Some(source)) = (self.graph.node(source_id), scope.get(source_id)) else {
                continue;
            };

            let terminate = node.is_end_with(EndResult::Terminate);
            if terminate || node.is_end_with(EndResult::Error) {
                let decomposition = self.net.decomposition_mut(dec);
                if let Some(output) = decomposition.output_condition {
                    decomposition.create_edge(source, output, false, "", 1);
                }
                if terminate && !terminates.contains(&source) {
                    terminates.push(source);
                }
                continue;
            }

            let mut defaults = Vec::new();
            for flow in self.graph.outgoing(source_id) {
                let Some(target) = scope.get(&flow.target) else {
                    debug!(source = %flow.source, target = %flow.target, "Dropping flow with unmapped endpoint");
                    continue;
                };
                // Folded gateways share their neighbour's task, except a gateway looping onto itself.
                if source == target && !(node.is_gateway() && flow.target == node.id) {
                    continue;
                }

                let predicate = match flow.condition() {
                    FlowCondition::Default => {
                        defaults.push(target);
                        continue;
                    }
                    FlowCondition::Expression(expr) => expr,
                    FlowCondition::None => "",
                };
                let order = counter.entry(source).or_insert(0);
                *order += 1;
                self.net.decomposition_mut(dec).create_edge(source, target, false, predicate, *order);
            }

            for target in defaults {
                let order = counter.entry(source).or_insert(0);
                *order += 1;
                self.net.decomposition_mut(dec).create_edge(source, target, true, "", *order);
            }
        }
        terminates
    }
}
