use bpmn_yawl::compiler::core::Translator;
use bpmn_yawl::compiler::loader;
use bpmn_yawl::dsl::builder::DiagramBuilder;
use bpmn_yawl::net::ResourceKind;
use std::fs;

const DIAGRAM_YAML: &str = r#"
id: "order"
name: "Order handling"
processes:
  - id: "pool"
    name: "pool"
    lanes:
      - id: "l1"
        name: "Clerks"
    nodes:
      - id: "s"
        type: "StartEvent"
      - id: "a"
        label: "Check"
        lane: "l1"
        type: "Task"
        activity:
          loop_type: "Standard"
          loop_condition: "x < 3"
      - id: "e"
        type: "EndEvent"
flows:
  - source: "s"
    target: "a"
  - source: "a"
    target: "e"
"#;

#[test]
fn test_load_diagram_from_yaml() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("diagram.yaml");
    fs::write(&file_path, DIAGRAM_YAML).expect("Failed to write temp file");

    let loaded = loader::load_diagram_from_yaml(&file_path.to_string_lossy())
        .expect("Failed to load diagram from YAML");

    let expected = DiagramBuilder::new("order")
        .name("Order handling")
        .pool("pool", |p| {
            p.lane("l1", "Clerks")
                .start("s")
                .task_with("a", "Check", |a| a.lane("l1").standard_loop("x < 3"))
                .end("e")
        })
        .connect("s", "a")
        .connect("a", "e")
        .build();

    assert_eq!(loaded, expected);
}

#[test]
fn test_loaded_diagram_translates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let diagram_path = temp_dir.path().join("diagram.yaml");
    let resourcing_path = temp_dir.path().join("resourcing.yaml");
    fs::write(&diagram_path, DIAGRAM_YAML).unwrap();
    fs::write(
        &resourcing_path,
        r#"
l1:
  id: "clerk"
  name: "Clerk"
  kind: "Role"
"#,
    )
    .unwrap();

    let diagram = loader::load_diagram_from_yaml(&diagram_path.to_string_lossy()).unwrap();
    let resourcing = loader::load_resourcing_from_yaml(&resourcing_path.to_string_lossy()).unwrap();
    assert_eq!(resourcing["l1"].kind, ResourceKind::Role);

    let net = Translator::new().translate(&diagram, 0, &resourcing).unwrap();
    let root = net.root().unwrap();
    let (check, _) = root.tasks().find(|(_, t)| t.name == "Check").unwrap();
    assert!(root.edges.iter().any(|e| e.source == check && e.target == check && e.predicate == "x < 3"));
}

#[test]
fn test_load_partial_options() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file_path = temp_dir.path().join("options.yaml");
    fs::write(&file_path, "root_net_id: \"Main\"\n").unwrap();

    let options = loader::load_options_from_yaml(&file_path.to_string_lossy()).unwrap();

    assert_eq!(options.root_net_id, "Main");
    assert_eq!(options.model_id_prefix, "mymodel");
    assert_eq!(options.max_nesting_depth, 64);
}

#[test]
fn test_missing_file_reports_path() {
    let err = loader::load_diagram_from_yaml("/nonexistent/diagram.yaml").unwrap_err();

    assert!(format!("{:#}", err).contains("/nonexistent/diagram.yaml"));
}
