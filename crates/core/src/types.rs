use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a task inside a node.
///
/// `Queued → Processing → Completed`, or a direct terminal `Rejected`
/// when admission declines the task. No other transitions exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Processing,
    Completed,
    Rejected,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Queued
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Queued => write!(f, "queued"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// The task types this node knows how to execute.
///
/// The wire field stays a free-form string so that unknown types remain
/// admissible; they are parsed into `Other` and their handler reports an
/// error result instead of failing the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    DataAggregation,
    EdgeAnalytics,
    Preprocessing,
    Caching,
    Other,
}

impl TaskKind {
    pub fn parse(s: &str) -> TaskKind {
        match s {
            "data_aggregation" => TaskKind::DataAggregation,
            "edge_analytics" => TaskKind::EdgeAnalytics,
            "preprocessing" => TaskKind::Preprocessing,
            "caching" => TaskKind::Caching,
            _ => TaskKind::Other,
        }
    }

    /// Per-type cost table applied when the client leaves a cost at zero.
    /// Energy defaults separately to half the resolved CPU cost.
    pub fn default_costs(&self) -> ResourceCost {
        match self {
            TaskKind::DataAggregation => ResourceCost::new(0.20, 0.15, 50.0, 0.10),
            TaskKind::EdgeAnalytics => ResourceCost::new(0.40, 0.30, 100.0, 0.20),
            TaskKind::Preprocessing => ResourceCost::new(0.10, 0.10, 25.0, 0.05),
            TaskKind::Caching => ResourceCost::new(0.05, 0.05, 10.0, 0.025),
            TaskKind::Other => ResourceCost::new(0.20, 0.15, 50.0, 0.10),
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::DataAggregation => write!(f, "data_aggregation"),
            TaskKind::EdgeAnalytics => write!(f, "edge_analytics"),
            TaskKind::Preprocessing => write!(f, "preprocessing"),
            TaskKind::Caching => write!(f, "caching"),
            TaskKind::Other => write!(f, "other"),
        }
    }
}

/// Declared resource footprint of a task across the four ledger
/// dimensions. CPU and RAM are fractions of node capacity, storage is
/// MB, energy is Wh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResourceCost {
    pub cpu: f64,
    pub ram: f64,
    pub storage_mb: f64,
    pub energy_wh: f64,
}

impl ResourceCost {
    pub fn new(cpu: f64, ram: f64, storage_mb: f64, energy_wh: f64) -> Self {
        Self {
            cpu,
            ram,
            storage_mb,
            energy_wh,
        }
    }
}

/// A computational task, from submission envelope to completed record.
///
/// Only `type` is required on submission; every other field is either
/// defaulted by the admission controller or owned by the node (`id`,
/// `smart_score`, `status`, timestamps, `result`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
    /// Client urgency hint; lower is more urgent.
    #[serde(default)]
    pub priority: i64,
    /// Business importance, 1-5; higher runs sooner.
    #[serde(default)]
    pub criticality: i64,
    #[serde(default)]
    pub cpu_cost: f64,
    #[serde(default)]
    pub ram_cost: f64,
    #[serde(default)]
    pub storage_cost: f64,
    #[serde(default)]
    pub energy_cost: f64,
    #[serde(default)]
    pub estimated_latency_ms: u64,
    #[serde(default)]
    pub network_latency_ms: u64,
    /// Scheduling key, computed once at admission and frozen.
    #[serde(default)]
    pub smart_score: f64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        TaskKind::parse(&self.kind)
    }

    /// The four declared costs as one ledger entry.
    pub fn cost(&self) -> ResourceCost {
        ResourceCost::new(
            self.cpu_cost,
            self.ram_cost,
            self.storage_cost,
            self.energy_cost,
        )
    }
}

/// A task declined at admission, retained for operator-initiated retry.
/// Load and queue length are captured at the rejection instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedTask {
    pub task: Task,
    pub rejected_at: DateTime<Utc>,
    pub rejection_reason: String,
    pub node_load: f64,
    pub queue_size: usize,
}

/// Externally visible node record served by `GET /status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub location: String,
    pub status: String,
    pub load: f64,
    pub last_seen: DateTime<Utc>,
}

impl NodeInfo {
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            status: "active".to_string(),
            load: 0.0,
            last_seen: Utc::now(),
        }
    }
}
