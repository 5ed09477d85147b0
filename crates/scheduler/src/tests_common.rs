use chrono::Utc;
use foglet_core::{Task, TaskStatus};

pub fn make_task(kind: &str) -> Task {
    Task {
        id: String::new(),
        kind: kind.to_string(),
        payload: serde_json::Map::new(),
        priority: 0,
        criticality: 0,
        cpu_cost: 0.0,
        ram_cost: 0.0,
        storage_cost: 0.0,
        energy_cost: 0.0,
        estimated_latency_ms: 0,
        network_latency_ms: 0,
        smart_score: 0.0,
        status: TaskStatus::Queued,
        submitted_at: Utc::now(),
        completed_at: None,
        result: None,
    }
}
