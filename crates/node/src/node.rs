use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use tracing::{info, warn};

use foglet_core::{
    NodeConfig, NodeError, NodeInfo, RejectedTask, RejectionReason, Task, TaskStatus,
};
use foglet_scheduler::admission::{self, LoadSnapshot};
use foglet_scheduler::{ResourceLedger, ScoreWeights, TaskQueue};

use crate::metrics::{Metrics, MetricsSnapshot};

/// Everything guarded by the node-wide lock: the task store, the
/// priority queue, the rejection queue, the resource ledger and the
/// externally visible node record. Metrics live outside with their own
/// inner lock so `/metrics` never contends with admission.
struct Shared {
    info: NodeInfo,
    tasks: HashMap<String, Task>,
    queue: TaskQueue,
    rejected: Vec<RejectedTask>,
    ledger: ResourceLedger,
    ids: IdGenerator,
}

/// A single fog node: admission, scheduling and execution state.
///
/// Nodes do not coordinate; clients pick which node to submit to. Share
/// by `Arc` between the HTTP layer, the worker pool and the load
/// ticker.
pub struct FogNode {
    config: NodeConfig,
    shared: Mutex<Shared>,
    task_ready: Condvar,
    weights: ScoreWeights,
    metrics: Metrics,
    shutting_down: AtomicBool,
}

impl FogNode {
    pub fn new(config: NodeConfig) -> Self {
        let info = NodeInfo::new(config.node_id.clone(), config.location.clone());
        Self {
            config,
            shared: Mutex::new(Shared {
                info,
                tasks: HashMap::new(),
                queue: TaskQueue::new(),
                rejected: Vec::new(),
                ledger: ResourceLedger::new(),
                ids: IdGenerator::new(),
            }),
            task_ready: Condvar::new(),
            weights: ScoreWeights::default(),
            metrics: Metrics::new(),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn id(&self) -> &str {
        &self.config.node_id
    }

    /// Admit or reject a submitted task.
    ///
    /// Defaults, scoring, gate evaluation and (on success) reservation +
    /// enqueue are one critical section, so concurrent admissions
    /// serialize and each decision sees the previous one's reservation.
    pub fn submit(&self, mut task: Task) -> Result<Task, RejectionReason> {
        let mut shared = self.shared.lock().unwrap();

        admission::apply_defaults(&mut task);
        task.smart_score = self.weights.score(&task);

        let snapshot = LoadSnapshot {
            load: shared.info.load,
            queue_len: shared.queue.len(),
        };

        match admission::check_gates(&task, snapshot, &shared.ledger) {
            Ok(()) => {
                task.id = shared.ids.next();
                task.status = TaskStatus::Queued;
                task.submitted_at = Utc::now();
                task.completed_at = None;
                task.result = None;

                let cost = task.cost();
                shared.ledger.reserve(&cost);
                shared.queue.push(task.id.clone(), task.smart_score);
                shared.tasks.insert(task.id.clone(), task.clone());
                drop(shared);

                self.task_ready.notify_one();
                info!(
                    "task {} admitted: type={} priority={} criticality={} score={:.4} \
                     reserved cpu={:.2} ram={:.2} storage={:.1} energy={:.3}",
                    task.id,
                    task.kind,
                    task.priority,
                    task.criticality,
                    task.smart_score,
                    cost.cpu,
                    cost.ram,
                    cost.storage_mb,
                    cost.energy_wh
                );
                Ok(task)
            }
            Err(reason) => {
                task.id = shared.ids.next();
                task.status = TaskStatus::Rejected;
                shared.rejected.push(RejectedTask {
                    task,
                    rejected_at: Utc::now(),
                    rejection_reason: reason.to_string(),
                    node_load: snapshot.load,
                    queue_size: snapshot.queue_len,
                });
                drop(shared);

                self.metrics.record_rejection();
                warn!("task rejected: {}", reason);
                Err(reason)
            }
        }
    }

    /// Look up a task by id in the store.
    pub fn task(&self, id: &str) -> Result<Task, NodeError> {
        let shared = self.shared.lock().unwrap();
        shared
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| NodeError::TaskNotFound(id.to_string()))
    }

    pub fn info(&self) -> NodeInfo {
        self.shared.lock().unwrap().info.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.shared.lock().unwrap().queue.len()
    }

    /// Snapshot of the resource ledger, for operators and tests.
    pub fn resources(&self) -> ResourceLedger {
        self.shared.lock().unwrap().ledger.clone()
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        let rejected_len = self.shared.lock().unwrap().rejected.len();
        self.metrics.snapshot(rejected_len)
    }

    /// All rejected tasks in insertion order.
    pub fn rejected_tasks(&self) -> Vec<RejectedTask> {
        self.shared.lock().unwrap().rejected.clone()
    }

    /// Retry a rejected task under current conditions.
    ///
    /// Retry is a salvage path: only the resource gate is re-checked,
    /// never the overload or energy gates. On failure the entry stays
    /// in the rejection queue for another attempt.
    pub fn retry_rejected(&self, id: &str) -> Result<Task, NodeError> {
        let mut shared = self.shared.lock().unwrap();

        let pos = shared
            .rejected
            .iter()
            .position(|r| r.task.id == id)
            .ok_or_else(|| NodeError::RejectedTaskNotFound(id.to_string()))?;

        let cost = shared.rejected[pos].task.cost();
        shared.ledger.check(&cost).map_err(NodeError::Rejected)?;

        let mut task = shared.rejected.remove(pos).task;
        // Inputs are unchanged between attempts, so this reproduces the
        // original score; recomputing keeps the admission path single.
        task.smart_score = self.weights.score(&task);
        task.status = TaskStatus::Queued;
        task.submitted_at = Utc::now();

        shared.ledger.reserve(&cost);
        shared.queue.push(task.id.clone(), task.smart_score);
        shared.tasks.insert(task.id.clone(), task.clone());
        drop(shared);

        self.task_ready.notify_one();
        info!("task {} resubmitted from rejection queue", task.id);
        Ok(task)
    }

    /// Empty the rejection queue, returning how many entries were
    /// discarded. The `tasks_rejected` counter is untouched.
    pub fn clear_rejected(&self) -> usize {
        let mut shared = self.shared.lock().unwrap();
        let count = shared.rejected.len();
        shared.rejected.clear();
        count
    }

    /// Block until a task is available or shutdown begins, then pop the
    /// lowest-score task and mark it processing. Workers call this.
    pub(crate) fn next_task(&self) -> Option<Task> {
        let mut shared = self.shared.lock().unwrap();
        loop {
            if self.shutting_down.load(Ordering::SeqCst) {
                return None;
            }
            if let Some(id) = shared.queue.pop() {
                if let Some(task) = shared.tasks.get_mut(&id) {
                    task.status = TaskStatus::Processing;
                    return Some(task.clone());
                }
                continue;
            }
            shared = self.task_ready.wait(shared).unwrap();
        }
    }

    /// Non-blocking variant of the worker pop, for embedders driving
    /// execution themselves.
    pub fn try_next_task(&self) -> Option<Task> {
        let mut shared = self.shared.lock().unwrap();
        while let Some(id) = shared.queue.pop() {
            if let Some(task) = shared.tasks.get_mut(&id) {
                task.status = TaskStatus::Processing;
                return Some(task.clone());
            }
        }
        None
    }

    /// Record a finished task: terminal status, result, timestamps, and
    /// the release of its reservation. Workers call this after the
    /// handler has returned; the handler itself runs without the lock.
    pub fn complete_task(&self, id: &str, result: serde_json::Value, elapsed: Duration) {
        let mut shared = self.shared.lock().unwrap();
        let cost = match shared.tasks.get_mut(id) {
            Some(task) => {
                task.status = TaskStatus::Completed;
                task.completed_at = Some(Utc::now());
                task.result = Some(result);
                task.cost()
            }
            None => return,
        };
        shared.ledger.release(&cost);
        drop(shared);

        self.metrics.record_completion(elapsed);
    }

    /// Recompute the exposed load from queue pressure and touch
    /// `last_seen`. Driven by the periodic ticker.
    pub fn refresh_load(&self) {
        let mut shared = self.shared.lock().unwrap();
        shared.info.load = shared.queue.len() as f64 / 100.0;
        shared.info.last_seen = Utc::now();
        let load = shared.info.load;
        drop(shared);

        self.metrics.set_load(load);
    }

    /// Begin shutdown: workers finish their current task and exit on
    /// the next loop iteration.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.task_ready.notify_all();
    }
}

/// Issues `task-<nanos>-<seq>` ids: wall-clock nanoseconds bumped to be
/// strictly greater than the previous issue, with a per-node counter
/// appended. Unique and submission-time ordered even on coarse clocks.
struct IdGenerator {
    last_nanos: u128,
    seq: u64,
}

impl IdGenerator {
    fn new() -> Self {
        Self {
            last_nanos: 0,
            seq: 0,
        }
    }

    fn next(&mut self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        self.last_nanos = if now > self.last_nanos {
            now
        } else {
            self.last_nanos + 1
        };
        self.seq += 1;
        format!("task-{}-{}", self.last_nanos, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_time_ordered() {
        let mut ids = IdGenerator::new();
        let mut seen = std::collections::HashSet::new();
        let mut last_nanos = 0u128;
        for _ in 0..10_000 {
            let id = ids.next();
            assert!(seen.insert(id.clone()), "duplicate id {id}");
            let nanos: u128 = id
                .strip_prefix("task-")
                .and_then(|rest| rest.split('-').next())
                .and_then(|n| n.parse().ok())
                .expect("id carries a nanosecond component");
            assert!(nanos > last_nanos, "nanos must strictly increase");
            last_nanos = nanos;
        }
    }
}
