use graphiti_core::{Error, HitTarget, LayoutPolicy, ProbeShape, SceneDocument};

const DOC: &str = r#"{
  "width": 400,
  "height": 300,
  "nodeRadius": 12,
  "seed": 7,
  "layout": { "circleRadius": 90 },
  "hitTest": { "nodeModel": "square", "linkAccuracy": 6, "showTrace": true },
  "nodes": [
    { "id": "a", "title": "Alpha", "x": 40, "y": 40 },
    { "id": "b", "x": 200, "y": 40 },
    { "id": "c" }
  ],
  "links": [
    { "head": "a", "tail": "b", "cost": 2.5 },
    { "head": "b", "tail": "c" }
  ]
}"#;

#[test]
fn parses_options_and_builds_a_scene() {
    let doc = SceneDocument::from_json(DOC).unwrap();
    assert_eq!(doc.options.width, 400);
    assert_eq!(doc.options.node_radius, 12.0);
    assert_eq!(doc.options.layout.circle_radius, Some(90.0));
    assert_eq!(doc.options.layout.harmony_max_attempts, 10_000);
    assert_eq!(doc.options.hit_test.node_model, ProbeShape::Square);
    assert_eq!(doc.options.hit_test.node_accuracy(), 25.0);
    assert_eq!(doc.options.hit_test.link_accuracy, 6.0);
    assert!(doc.options.hit_test.show_trace);

    let mut scene = doc.to_scene().unwrap();
    assert_eq!(scene.nodes().len(), 3);
    assert_eq!(scene.node("a").unwrap().title, "Alpha");
    assert_eq!(scene.node("c").unwrap().x(), 0.0);
    assert_eq!(scene.link("a:b").unwrap().cost, 2.5);
    assert_eq!(scene.link("b:c").unwrap().cost, 0.0);

    scene.connect();
    assert_eq!(scene.item_at(40.0, 40.0), Some(HitTarget::Node("a".into())));
}

#[test]
fn missing_fields_take_defaults() {
    let doc = SceneDocument::from_json(r#"{ "nodes": [{ "id": "x" }] }"#).unwrap();
    assert_eq!((doc.options.width, doc.options.height), (800, 600));
    assert_eq!(doc.options.node_radius, 10.0);
    assert_eq!(doc.options.layout.circle_radius, Some(125.0));
    assert!(doc.links.is_empty());
}

#[test]
fn invalid_documents_surface_errors() {
    assert!(matches!(
        SceneDocument::from_json("{ not json"),
        Err(Error::Json(_))
    ));

    let doc = SceneDocument::from_json(
        r#"{ "nodes": [{ "id": "a" }], "links": [{ "head": "a", "tail": "b" }] }"#,
    )
    .unwrap();
    assert!(matches!(doc.to_scene(), Err(Error::MissingNode { .. })));

    let doc = SceneDocument::from_json(r#"{ "nodes": [{ "id": "a" }, { "id": "a" }] }"#).unwrap();
    assert!(matches!(doc.to_scene(), Err(Error::DuplicateNode { .. })));
}

#[test]
fn snapshot_reflects_layout() {
    let doc = SceneDocument::from_json(DOC).unwrap();
    let mut scene = doc.to_scene().unwrap();
    scene.organize(LayoutPolicy::Harmony);

    let snap = SceneDocument::from_scene(&scene);
    assert_eq!(snap.options, doc.options);
    assert_eq!(snap.links, doc.links);
    for (spec, node) in snap.nodes.iter().zip(scene.nodes()) {
        assert_eq!(spec.id, node.id);
        assert_eq!(spec.x, Some(node.x()));
        assert_eq!(spec.y, Some(node.y()));
    }

    let json = snap.to_json_pretty().unwrap();
    let back = SceneDocument::from_json(&json).unwrap();
    assert_eq!(back, snap);
}

#[test]
fn json_round_trip_keeps_exact_coordinates() {
    let doc = SceneDocument::from_json(r#"{ "nodes": [{ "id": "a" }, { "id": "b" }] }"#).unwrap();
    let mut scene = doc.to_scene().unwrap();
    let coords = [
        (252.21745219005498, 0.1 + 0.2),
        (1.0 / 3.0, 123.45678901234567),
    ];
    for (id, (x, y)) in ["a", "b"].into_iter().zip(coords) {
        assert!(scene.move_node(id, x, y));
    }

    let json = SceneDocument::from_scene(&scene).to_json_pretty().unwrap();
    let reloaded = SceneDocument::from_json(&json).unwrap().to_scene().unwrap();
    for (id, (x, y)) in ["a", "b"].into_iter().zip(coords) {
        let node = reloaded.node(id).unwrap();
        assert_eq!(node.x().to_bits(), x.to_bits(), "x of {id}");
        assert_eq!(node.y().to_bits(), y.to_bits(), "y of {id}");
    }
}
