//! JSON contract of the wire types: what clients send and what every
//! endpoint returns, pinned down independently of the HTTP layer.

use serde_json::{json, Value};

use foglet_core::{NodeConfig, Task};
use foglet_node::FogNode;

fn test_node() -> FogNode {
    FogNode::new(NodeConfig {
        node_id: "fog-node-test".to_string(),
        location: "lab".to_string(),
        port: 0,
        workers: 0,
    })
}

#[test]
fn minimal_envelope_only_needs_a_type() {
    let task: Task = serde_json::from_value(json!({ "type": "caching" })).unwrap();
    assert_eq!(task.kind, "caching");
}

#[test]
fn garbage_does_not_parse() {
    assert!(serde_json::from_str::<Task>("{not json").is_err());
    assert!(serde_json::from_str::<Task>(r#"{"type": 7}"#).is_err());
}

#[test]
fn admitted_task_serializes_the_full_record() {
    let node = test_node();
    let task = node
        .submit(serde_json::from_value(json!({ "type": "preprocessing", "priority": 1 })).unwrap())
        .unwrap();

    let value = serde_json::to_value(&task).unwrap();
    let obj = value.as_object().unwrap();

    // The wire field is `type`, not the internal name.
    assert!(obj.contains_key("type"));
    assert!(!obj.contains_key("kind"));
    assert_eq!(obj["status"], "queued");
    assert_eq!(obj["cpu_cost"], 0.1);
    assert!(obj["id"].as_str().unwrap().starts_with("task-"));
    assert!(obj["submitted_at"].is_string());
    // Unset optionals are omitted entirely.
    assert!(!obj.contains_key("completed_at"));
    assert!(!obj.contains_key("result"));
}

#[test]
fn metrics_snapshot_has_the_five_canonical_fields() {
    let node = test_node();
    let value = serde_json::to_value(node.metrics_snapshot()).unwrap();
    let obj = value.as_object().unwrap();

    for field in [
        "tasks_processed",
        "tasks_rejected",
        "rejected_queue_size",
        "avg_latency_ms",
        "current_load",
    ] {
        assert!(obj.contains_key(field), "missing {field}");
    }
    assert_eq!(obj.len(), 5);
}

#[test]
fn rejected_task_record_captures_the_rejection_context() {
    let node = test_node();
    node.submit(serde_json::from_value(json!({ "type": "edge_analytics" })).unwrap())
        .unwrap();
    node.submit(serde_json::from_value(json!({ "type": "edge_analytics" })).unwrap())
        .unwrap();
    let _ = node.submit(serde_json::from_value(json!({ "type": "edge_analytics" })).unwrap());

    let rejected = node.rejected_tasks();
    let value = serde_json::to_value(&rejected[0]).unwrap();
    let obj = value.as_object().unwrap();

    assert!(obj["rejection_reason"]
        .as_str()
        .unwrap()
        .contains("Insufficient resources"));
    assert!(obj["rejected_at"].is_string());
    assert_eq!(obj["queue_size"], 2);
    assert_eq!(obj["task"]["status"], "rejected");
}

#[test]
fn node_info_serializes_iso8601_last_seen() {
    let node = test_node();
    let value = serde_json::to_value(node.info()).unwrap();

    assert_eq!(value["id"], "fog-node-test");
    assert_eq!(value["status"], "active");
    assert_eq!(value["load"], 0.0);
    let last_seen = value["last_seen"].as_str().unwrap();
    assert!(
        last_seen.contains('T') && last_seen.ends_with('Z'),
        "expected ISO-8601 UTC, got {last_seen}"
    );
}

#[test]
fn health_and_list_shapes() {
    let node = test_node();

    let health: Value = json!({ "status": "healthy", "node": node.id() });
    assert_eq!(health["node"], "fog-node-test");

    let tasks = node.rejected_tasks();
    let listing = json!({ "total": tasks.len(), "tasks": tasks });
    assert_eq!(listing["total"], 0);
    assert!(listing["tasks"].as_array().unwrap().is_empty());
}
