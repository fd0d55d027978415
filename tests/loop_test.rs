use bpmn_yawl::compiler::core::{ResourcingMap, Translator};
use bpmn_yawl::dsl::builder::DiagramBuilder;
use bpmn_yawl::dsl::{Diagram, EventTrigger, GatewayKind};
use bpmn_yawl::net::{Decomposition, Edge, Net, NodeIndex, SplitJoinType, Task};

fn translate(diagram: &Diagram) -> Net {
    Translator::new().translate(diagram, 0, &ResourcingMap::new()).expect("translation failed")
}

fn task_named<'n>(dec: &'n Decomposition, name: &str) -> (NodeIndex, &'n Task) {
    dec.tasks().find(|(_, t)| t.name == name).expect("task not found")
}

fn assert_orderings(net: &Net) {
    for dec in &net.decompositions {
        let mut sources: Vec<NodeIndex> = dec.edges.iter().map(|e| e.source).collect();
        sources.sort_unstable();
        sources.dedup();
        for source in sources {
            let mut orderings: Vec<u32> = dec.outgoing_edges(source).map(|e| e.ordering).collect();
            let count = orderings.len();
            orderings.sort_unstable();
            orderings.dedup();
            assert_eq!(orderings.len(), count, "duplicate ordering on {}", dec.node_id(source));
            assert!(orderings.iter().all(|&o| o > 0), "ordering 0 on {}", dec.node_id(source));

            let defaults: Vec<&Edge> = dec.outgoing_edges(source).filter(|e| e.default).collect();
            assert!(defaults.len() <= 1, "several defaults on {}", dec.node_id(source));
            if let Some(default) = defaults.first() {
                assert_eq!(Some(&default.ordering), orderings.last(), "default not last on {}", dec.node_id(source));
            }
        }
    }
}

fn self_loops(dec: &Decomposition, task: NodeIndex) -> Vec<&Edge> {
    dec.edges.iter().filter(|e| e.source == task && e.target == task).collect()
}

#[test]
fn test_standard_loop_gets_guarded_self_loop() {
    let diagram = DiagramBuilder::new("loop")
        .pool("pool", |p| {
            p.start("s")
                .task_with("a", "A", |a| a.standard_loop("x<3"))
                .task("b", "B")
                .end("e")
        })
        .connect("s", "a")
        .connect("a", "b")
        .connect("b", "e")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (a, task) = task_named(root, "A");
    let (b, _) = task_named(root, "B");

    assert_eq!(task.split_type, SplitJoinType::Xor);
    assert_eq!(task.join_type, SplitJoinType::Xor);

    let loops = self_loops(root, a);
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].predicate, "x<3");
    assert_eq!(loops[0].ordering, 1);
    assert!(!loops[0].default);

    let exit = root.outgoing_edges(a).find(|e| e.target == b).unwrap();
    assert_eq!(exit.ordering, 2);
    assert!(exit.default);
}

#[test]
fn test_loop_with_and_split_moves_split_downstream() {
    let diagram = DiagramBuilder::new("and-loop")
        .pool("pool", |p| {
            p.start("s")
                .task_with("a", "A", |a| a.standard_loop("more"))
                .gateway("fork", GatewayKind::And)
                .task("b", "B")
                .task("c", "C")
                .gateway("sync", GatewayKind::And)
                .task("d", "D")
                .end("e")
        })
        .connect("s", "a")
        .connect("a", "fork")
        .connect("fork", "b")
        .connect("fork", "c")
        .connect("b", "sync")
        .connect("c", "sync")
        .connect("sync", "d")
        .connect("d", "e")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (a, task) = task_named(root, "A");
    let (b, _) = task_named(root, "B");
    let (c, _) = task_named(root, "C");
    let (split, split_task) = task_named(root, "SplitTask");

    assert_eq!(task.split_type, SplitJoinType::Xor);
    assert_eq!(self_loops(root, a).len(), 1);
    assert_eq!(self_loops(root, a)[0].ordering, 1);
    assert_eq!(self_loops(root, a)[0].predicate, "more");

    // The original successors now hang off the factored split task
    assert_eq!(split_task.split_type, SplitJoinType::And);
    assert!(root.has_edge(split, b));
    assert!(root.has_edge(split, c));
    assert!(!root.has_edge(a, b));
    assert!(!root.has_edge(a, c));

    let exit = root.outgoing_edges(a).find(|e| e.target == split).unwrap();
    assert_eq!(exit.ordering, 2);
    assert!(exit.default);
    assert_eq!(root.outgoing_count(a), 2);
}

#[test]
fn test_loop_with_and_join_moves_join_upstream() {
    let diagram = DiagramBuilder::new("join-loop")
        .pool("pool", |p| {
            p.start("s")
                .gateway("fork", GatewayKind::And)
                .task("b", "B")
                .task("c", "C")
                .gateway("sync", GatewayKind::And)
                .task_with("a", "A", |a| a.standard_loop("again"))
                .end("e")
        })
        .connect("s", "fork")
        .connect("fork", "b")
        .connect("fork", "c")
        .connect("b", "sync")
        .connect("c", "sync")
        .connect("sync", "a")
        .connect("a", "e")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (a, task) = task_named(root, "A");
    let (b, _) = task_named(root, "B");
    let (c, _) = task_named(root, "C");
    let (join, join_task) = task_named(root, "JoinTask");

    assert_eq!(task.join_type, SplitJoinType::Xor);
    assert_eq!(join_task.join_type, SplitJoinType::And);
    assert!(root.has_edge(b, join));
    assert!(root.has_edge(c, join));
    assert!(root.has_edge(join, a));
    assert_eq!(self_loops(root, a).len(), 1);
}

#[test]
fn test_structural_loop_is_rewritten() {
    // a -> retry? -> back -> a
    let diagram = DiagramBuilder::new("structural")
        .pool("pool", |p| {
            p.start("s")
                .gateway("back", GatewayKind::XorData)
                .task("a", "A")
                .gateway("retry", GatewayKind::XorData)
                .task("b", "B")
                .end("e")
        })
        .connect("s", "back")
        .connect("back", "a")
        .connect("a", "retry")
        .connect_if("retry", "back", "failed = true")
        .connect_default("retry", "b")
        .connect("b", "e")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (a, task) = task_named(root, "A");
    let (b, _) = task_named(root, "B");

    // Both gateways fold onto the activity itself
    assert_eq!(root.tasks().count(), 2);
    assert_eq!(task.split_type, SplitJoinType::Xor);
    assert_eq!(task.join_type, SplitJoinType::Xor);

    let loops = self_loops(root, a);
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].predicate, "failed = true");
    assert_eq!(loops[0].ordering, 1);

    let exit = root.outgoing_edges(a).find(|e| e.target == b).unwrap();
    assert!(exit.default);
    assert_eq!(exit.ordering, 2);
    assert!(root.has_edge(root.input_condition.unwrap(), a));
}

#[test]
fn test_loops_are_rewritten_in_their_own_decomposition() {
    let diagram = DiagramBuilder::new("nested-loop")
        .pool("pool", |p| {
            p.start("s")
                .subprocess("sp", "Sub", |c| {
                    c.start("s2").task_with("inner", "Inner", |a| a.standard_loop("n < 5")).end("e2")
                })
                .end("e")
        })
        .connect("s", "sp")
        .connect("sp", "e")
        .connect("s2", "inner")
        .connect("inner", "e2")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (sp, composite) = task_named(root, "Sub");
    let sub = net.decomposition_of(composite).unwrap();
    let (inner, _) = task_named(sub, "Inner");

    assert_eq!(self_loops(sub, inner).len(), 1);
    assert_eq!(self_loops(sub, inner)[0].predicate, "n < 5");
    assert!(self_loops(root, sp).is_empty());
    assert_eq!(composite.split_type, SplitJoinType::None);
}

#[test]
fn test_looping_subprocess_with_errors_keeps_orderings_unique() {
    let diagram = DiagramBuilder::new("loop-errors")
        .pool("pool", |p| {
            p.start("s")
                .subprocess_with("sp", "Sub", |a| a.standard_loop("again"), |c| c.start("s2").end_error("fail"))
                .attached("err1", EventTrigger::Error, "sp")
                .attached("err2", EventTrigger::Error, "sp")
                .gateway("fork", GatewayKind::And)
                .task("a", "A")
                .task("b", "B")
                .task("h1", "Handle One")
                .task("h2", "Handle Two")
                .end("e")
        })
        .connect("s", "sp")
        .connect("sp", "fork")
        .connect("fork", "a")
        .connect("fork", "b")
        .connect("a", "e")
        .connect("b", "e")
        .connect("err1", "h1")
        .connect("err2", "h2")
        .connect("h1", "e")
        .connect("h2", "e")
        .connect("s2", "fail")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (sp, _) = task_named(root, "Sub");

    assert_eq!(self_loops(root, sp).len(), 1);
    assert_eq!(self_loops(root, sp)[0].ordering, 1);
    assert_orderings(&net);
}

#[test]
fn test_looping_host_with_timers_keeps_default_last() {
    let diagram = DiagramBuilder::new("loop-timers")
        .pool("pool", |p| {
            p.start("s")
                .gateway("choice", GatewayKind::XorData)
                .task_with("b", "B", |a| a.standard_loop("retry"))
                .attached_timer("t1", "PT5M", "b")
                .attached_timer("t2", "PT1H", "b")
                .task("c", "C")
                .end("e")
        })
        .connect("s", "choice")
        .connect_if("choice", "b", "go")
        .connect_default("choice", "c")
        .connect("b", "e")
        .connect("c", "e")
        .connect("t1", "e")
        .connect("t2", "e")
        .build();

    let net = translate(&diagram);
    let root = net.root().unwrap();
    let (b, task) = task_named(root, "B");

    assert_eq!(task.split_type, SplitJoinType::Xor);
    assert_eq!(self_loops(root, b)[0].predicate, "retry");
    assert_eq!(root.tasks().filter(|(_, t)| t.name == "TimerTask").count(), 2);
    assert_orderings(&net);
}
