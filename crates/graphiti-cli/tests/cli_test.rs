use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo_bin!("graphiti-cli"))
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.output().expect("run graphiti-cli");
    assert!(
        out.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("json stdout")
}

#[test]
fn pick_reports_nodes_links_and_misses() {
    let json = stdout_json(cli().args([
        "pick",
        "--at",
        "10,50",
        "--at",
        "60,50",
        "--at",
        "60,95",
        fixture("pair.json").to_string_lossy().as_ref(),
    ]));
    let hits = json.as_array().expect("array");
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["hit"], serde_json::json!({ "kind": "node", "id": "a" }));
    assert_eq!(hits[1]["hit"], serde_json::json!({ "kind": "link", "id": "a:b" }));
    assert!(hits[2]["hit"].is_null());
}

#[test]
fn layout_keeps_nodes_inside_the_surface() {
    let json = stdout_json(cli().args([
        "layout",
        "--policy",
        "random-square",
        "--seed",
        "11",
        fixture("pair.json").to_string_lossy().as_ref(),
    ]));
    assert_eq!(json["report"]["policy"], "random-square");
    assert_eq!(json["report"]["placed"], 2);
    assert_eq!(json["scene"]["seed"], 11);
    for node in json["scene"]["nodes"].as_array().expect("nodes") {
        let x = node["x"].as_f64().expect("x");
        let y = node["y"].as_f64().expect("y");
        assert!((10.0..=190.0).contains(&x), "x = {x}");
        assert!((10.0..=90.0).contains(&y), "y = {y}");
    }
    assert_eq!(json["scene"]["links"][0]["cost"], 2.0);
}

#[test]
fn layout_is_reproducible_for_a_seed() {
    let run = || {
        stdout_json(cli().args([
            "layout",
            "--policy",
            "harmony",
            "--seed",
            "5",
            fixture("pair.json").to_string_lossy().as_ref(),
        ]))
    };
    assert_eq!(run()["scene"], run()["scene"]);
}

#[test]
fn layout_reads_stdin() {
    let input = fs::read_to_string(fixture("pair.json")).expect("fixture");
    let out = cli()
        .args(["layout", "-"])
        .write_stdin(input)
        .output()
        .expect("run");
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json");
    assert!(json["report"].is_null());
    assert_eq!(json["scene"]["nodes"][1]["x"], 110.0);
}

#[test]
fn probes_end_with_node_probes() {
    let json = stdout_json(cli().args(["probes", fixture("pair.json").to_string_lossy().as_ref()]));
    let probes = json.as_array().expect("array");
    assert!(probes.len() > 2);
    let last = &probes[probes.len() - 1];
    assert_eq!(last["target"], serde_json::json!({ "kind": "node", "id": "b" }));
}

#[test]
fn render_writes_svg_file_with_highlight_and_trace() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("scene.svg");
    cli()
        .args([
            "render",
            "--highlight-at",
            "110,50",
            "--trace",
            "--id",
            "demo",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("pair.json").to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let svg = fs::read_to_string(&out).expect("read svg");
    assert!(svg.starts_with(r#"<svg id="demo""#));
    assert!(svg.contains(r#"class="node highlighted" data-id="b""#));
    assert!(svg.contains(r#"<g class="trace""#));
}

#[test]
fn missing_link_endpoint_fails() {
    let input = r#"{ "nodes": [{ "id": "a" }], "links": [{ "head": "a", "tail": "z" }] }"#;
    let out = cli()
        .args(["layout"])
        .write_stdin(input)
        .output()
        .expect("run");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains('z'), "stderr: {stderr}");
}

#[test]
fn malformed_point_is_rejected() {
    cli()
        .args(["pick", "--at", "oops", fixture("pair.json").to_string_lossy().as_ref()])
        .assert()
        .failure();
}

#[test]
fn invalid_hit_test_options_fail() {
    let input = r#"{ "hitTest": { "nodeAccuracy": -20 }, "nodes": [{ "id": "a", "x": 100, "y": 100 }] }"#;
    let out = cli()
        .args(["pick", "--at", "110,100"])
        .write_stdin(input)
        .output()
        .expect("run");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("nodeAccuracy"), "stderr: {stderr}");
}
