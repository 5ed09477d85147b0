use std::thread;
use std::time::Duration;

use serde_json::{json, Map, Value};

use foglet_core::TaskKind;

/// Run the type-specific handler for a task.
///
/// Handlers are pure functions of the payload: they never touch node
/// state, and they simulate work by sleeping for a type-specific fixed
/// duration. An unknown type is not an error: it completes with an
/// error mapping, so a misspelled type never shows up as a rejection.
pub fn execute(kind: TaskKind, payload: &Map<String, Value>) -> Value {
    match kind {
        TaskKind::DataAggregation => aggregate_data(payload),
        TaskKind::EdgeAnalytics => perform_analytics(payload),
        TaskKind::Preprocessing => preprocess_data(payload),
        TaskKind::Caching => cache_data(payload),
        TaskKind::Other => json!({ "error": "unknown task type" }),
    }
}

fn aggregate_data(_payload: &Map<String, Value>) -> Value {
    thread::sleep(Duration::from_millis(100));
    json!({
        "operation": "data_aggregation",
        "status": "success",
        "summary": "Aggregated sensor data from multiple sources",
        "count": 42,
    })
}

fn perform_analytics(_payload: &Map<String, Value>) -> Value {
    thread::sleep(Duration::from_millis(200));
    json!({
        "operation": "edge_analytics",
        "status": "success",
        "insights": "Anomaly detected in sensor readings",
        "confidence": 0.87,
    })
}

fn preprocess_data(_payload: &Map<String, Value>) -> Value {
    thread::sleep(Duration::from_millis(50));
    json!({
        "operation": "preprocessing",
        "status": "success",
        "filtered": true,
        "normalized": true,
    })
}

fn cache_data(_payload: &Map<String, Value>) -> Value {
    thread::sleep(Duration::from_millis(30));
    json!({
        "operation": "caching",
        "status": "success",
        "cached": true,
        "ttl": 3600,
    })
}
