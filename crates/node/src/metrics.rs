use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

#[derive(Default)]
struct Inner {
    tasks_processed: u64,
    tasks_rejected: u64,
    avg_latency: Duration,
    current_load: f64,
}

/// Node performance counters, behind their own lock so the metrics
/// endpoint never blocks admission or the workers.
#[derive(Default)]
pub struct Metrics {
    inner: Mutex<Inner>,
}

/// What `GET /metrics` serves.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub tasks_processed: u64,
    pub tasks_rejected: u64,
    pub rejected_queue_size: usize,
    pub avg_latency_ms: u64,
    pub current_load: f64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a completion and fold the sample into the running average.
    ///
    /// The average is the fixed recurrence `avg = (avg + sample) / 2`,
    /// an exponentially weighted estimator with weight 0.5, not an
    /// arithmetic mean. The first sample seeds it.
    pub fn record_completion(&self, sample: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.tasks_processed += 1;
        inner.avg_latency = if inner.avg_latency.is_zero() {
            sample
        } else {
            (inner.avg_latency + sample) / 2
        };
    }

    pub fn record_rejection(&self) {
        self.inner.lock().unwrap().tasks_rejected += 1;
    }

    pub fn set_load(&self, load: f64) {
        self.inner.lock().unwrap().current_load = load;
    }

    pub fn snapshot(&self, rejected_queue_size: usize) -> MetricsSnapshot {
        let inner = self.inner.lock().unwrap();
        MetricsSnapshot {
            tasks_processed: inner.tasks_processed,
            tasks_rejected: inner.tasks_rejected,
            rejected_queue_size,
            avg_latency_ms: inner.avg_latency.as_millis() as u64,
            current_load: inner.current_load,
        }
    }
}
