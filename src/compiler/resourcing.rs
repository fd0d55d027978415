use crate::compiler::core::Translation;
use crate::dsl::{Activity, Node};
use crate::net::{DecompositionIndex, DistributionSet, Initiator, NodeIndex, Resourcing};
use tracing::debug;

pub fn parse_initiator(value: Option<&str>) -> Initiator {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("system") => Initiator::System,
        _ => Initiator::User,
    }
}

impl<'a> Translation<'a> {
    pub(crate) fn bind_resourcing(&mut self, dec: DecompositionIndex, task: NodeIndex, node: &Node, activity: &Activity) {
        let mut resourcing = Resourcing {
            offer: parse_initiator(activity.offered_by.as_deref()),
            allocate: parse_initiator(activity.allocated_by.as_deref()),
            start: parse_initiator(activity.started_by.as_deref()),
            ..Resourcing::default()
        };

        if let Some(lane) = node.lane.as_deref() {
            match self.resourcing.get(lane) {
                Some(resource) => {
                    let set = DistributionSet { initial_set: vec![resource.clone()] };
                    if resourcing.offer == Initiator::System {
                        resourcing.offer_distribution_set = Some(set.clone());
                    }
                    if resourcing.allocate == Initiator::System {
                        resourcing.allocate_distribution_set = Some(set);
                    }
                }
                None => debug!(activity = %node.id, lane, "No resource registered for lane"),
            }
        }

        if let Some(t) = self.net.decomposition_mut(dec).task_mut(task) {
            t.resourcing = Some(resourcing);
        }
    }
}
