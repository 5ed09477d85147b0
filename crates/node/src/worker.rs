use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde_json::json;
use tracing::{info, warn};

use foglet_core::Task;

use crate::handlers;
use crate::node::FogNode;

/// Spawn the worker pool. Each worker loops: wait for a non-empty
/// queue, pop the lowest-score task, run its handler, release the
/// reservation. On shutdown a worker finishes its current task and
/// exits on the next iteration.
pub fn spawn_pool(node: &Arc<FogNode>) -> Vec<JoinHandle<()>> {
    (0..node.config().workers)
        .map(|worker_id| {
            let node = Arc::clone(node);
            thread::Builder::new()
                .name(format!("worker-{worker_id}"))
                .spawn(move || run(node, worker_id))
                .expect("spawn worker thread")
        })
        .collect()
}

fn run(node: Arc<FogNode>, worker_id: usize) {
    info!("worker {} started", worker_id);
    while let Some(task) = node.next_task() {
        process(&node, task);
    }
    info!("worker {} stopping", worker_id);
}

fn process(node: &FogNode, task: Task) {
    info!(
        "processing task {}: type={} priority={} criticality={} score={:.4}",
        task.id, task.kind, task.priority, task.criticality, task.smart_score
    );
    let started = Instant::now();

    // The handler runs without the node lock. A panicking handler must
    // not take the worker down with it; the task still completes, with
    // the panic surfaced in its result.
    let result = match catch_unwind(AssertUnwindSafe(|| {
        handlers::execute(task.kind(), &task.payload)
    })) {
        Ok(value) => value,
        Err(_) => {
            warn!("handler panicked while processing task {}", task.id);
            json!({ "error": "handler panicked" })
        }
    };

    let elapsed = started.elapsed();
    node.complete_task(&task.id, result, elapsed);
    info!("task {} completed in {:?}", task.id, elapsed);
}
