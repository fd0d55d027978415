use bpmn_yawl::compiler::core::{ResourcingMap, Translator};
use bpmn_yawl::compiler::resourcing::parse_initiator;
use bpmn_yawl::dsl::builder::{ActivityBuilder, DiagramBuilder};
use bpmn_yawl::dsl::Diagram;
use bpmn_yawl::net::{Initiator, Resource, ResourceKind, Resourcing};

fn clerk() -> Resource {
    Resource {
        id: "clerk".to_string(),
        name: "Clerk".to_string(),
        kind: ResourceKind::Role,
    }
}

fn single_task(activity: impl FnOnce(ActivityBuilder) -> ActivityBuilder) -> Diagram {
    DiagramBuilder::new("resourcing")
        .pool("pool", |p| p.lane("l1", "Clerks").start("s").task_with("a", "A", activity).end("e"))
        .connect("s", "a")
        .connect("a", "e")
        .build()
}

fn resourcing_of(diagram: &Diagram, map: &ResourcingMap) -> Option<Resourcing> {
    let net = Translator::new().translate(diagram, 0, map).unwrap();
    let root = net.root().unwrap();
    root.tasks().find(|(_, t)| t.name == "A").and_then(|(_, t)| t.resourcing.clone())
}

#[test]
fn test_system_offer_uses_lane_resource() {
    let diagram = single_task(|a| a.lane("l1").offered_by("SYSTEM").allocated_by("user"));
    let map = ResourcingMap::from([("l1".to_string(), clerk())]);

    let resourcing = resourcing_of(&diagram, &map).expect("no resourcing");

    assert_eq!(resourcing.offer, Initiator::System);
    assert_eq!(resourcing.allocate, Initiator::User);
    assert_eq!(resourcing.start, Initiator::User);
    assert_eq!(resourcing.offer_distribution_set.unwrap().initial_set, vec![clerk()]);
    assert!(resourcing.allocate_distribution_set.is_none());
}

#[test]
fn test_system_allocation_uses_lane_resource() {
    let diagram = single_task(|a| a.lane("l1").offered_by("system").allocated_by("System").started_by("system"));
    let map = ResourcingMap::from([("l1".to_string(), clerk())]);

    let resourcing = resourcing_of(&diagram, &map).unwrap();

    assert_eq!(resourcing.start, Initiator::System);
    assert!(resourcing.offer_distribution_set.is_some());
    assert_eq!(resourcing.allocate_distribution_set.unwrap().initial_set[0].id, "clerk");
}

#[test]
fn test_missing_lane_entry_leaves_no_distribution_set() {
    let diagram = single_task(|a| a.lane("l1").offered_by("system"));

    let resourcing = resourcing_of(&diagram, &ResourcingMap::new()).unwrap();

    assert_eq!(resourcing.offer, Initiator::System);
    assert!(resourcing.offer_distribution_set.is_none());
}

#[test]
fn test_task_outside_lane_defaults_to_user() {
    let diagram = single_task(|a| a);
    let map = ResourcingMap::from([("l1".to_string(), clerk())]);

    let resourcing = resourcing_of(&diagram, &map).unwrap();

    assert_eq!(resourcing, Resourcing::default());
}

#[test]
fn test_subprocess_has_no_resourcing() {
    let diagram = DiagramBuilder::new("sub")
        .pool("pool", |p| {
            p.lane("l1", "Clerks")
                .start("s")
                .subprocess_with("sp", "Sub", |a| a.lane("l1").offered_by("system"), |c| c.task("t", "T"))
                .end("e")
        })
        .connect("s", "sp")
        .connect("sp", "e")
        .build();
    let map = ResourcingMap::from([("l1".to_string(), clerk())]);

    let net = Translator::new().translate(&diagram, 0, &map).unwrap();
    let root = net.root().unwrap();
    let (_, composite) = root.tasks().find(|(_, t)| t.name == "Sub").unwrap();

    assert!(composite.resourcing.is_none());
}

#[test]
fn test_parse_initiator() {
    assert_eq!(parse_initiator(Some("System")), Initiator::System);
    assert_eq!(parse_initiator(Some(" system ")), Initiator::System);
    assert_eq!(parse_initiator(Some("user")), Initiator::User);
    assert_eq!(parse_initiator(Some("robot")), Initiator::User);
    assert_eq!(parse_initiator(None), Initiator::User);
}
