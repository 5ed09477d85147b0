use foglet_core::{RejectionReason, Task};
use tracing::debug;

use crate::ledger::ResourceLedger;

/// Load above which every submission is turned away.
pub const MAX_LOAD: f64 = 0.80;
/// Queue length above which every submission is turned away.
pub const MAX_QUEUE_LEN: usize = 50;
/// Criticality at and above which the energy gate applies.
pub const CRITICAL_THRESHOLD: i64 = 4;

/// Default network latency assumed when the client gives none.
const DEFAULT_NETWORK_LATENCY_MS: u64 = 10;

/// Node load and queue length as observed at the admission instant.
#[derive(Debug, Clone, Copy)]
pub struct LoadSnapshot {
    pub load: f64,
    pub queue_len: usize,
}

/// Fill in anything the client left unspecified (zero): costs from the
/// per-type table, criticality to the bottom of its 1-5 range. Energy
/// defaults to half the resolved CPU cost, so a client-declared CPU
/// cost also shapes the energy default.
pub fn apply_defaults(task: &mut Task) {
    let defaults = task.kind().default_costs();

    if task.criticality == 0 {
        task.criticality = 1;
    }
    if task.cpu_cost == 0.0 {
        task.cpu_cost = defaults.cpu;
    }
    if task.ram_cost == 0.0 {
        task.ram_cost = defaults.ram;
    }
    if task.storage_cost == 0.0 {
        task.storage_cost = defaults.storage_mb;
    }
    if task.energy_cost == 0.0 {
        task.energy_cost = task.cpu_cost * 0.5;
    }
    if task.network_latency_ms == 0 {
        task.network_latency_ms = DEFAULT_NETWORK_LATENCY_MS;
    }
}

/// Evaluate the three admission gates in order; the first failure wins.
///
/// 1. Overload: the node is past its load or queue ceiling.
/// 2. Resources: one of CPU/RAM/storage cannot be reserved.
/// 3. Energy: critical tasks are refused when the battery headroom is
///    low; routine tasks pass even then, keeping the remaining energy
///    for high-consequence work without starving routine throughput.
pub fn check_gates(
    task: &Task,
    snapshot: LoadSnapshot,
    ledger: &ResourceLedger,
) -> Result<(), RejectionReason> {
    if snapshot.load > MAX_LOAD || snapshot.queue_len > MAX_QUEUE_LEN {
        debug!(
            "overload gate tripped: load={:.2} queue={}",
            snapshot.load, snapshot.queue_len
        );
        return Err(RejectionReason::Overloaded {
            load: snapshot.load,
            queue_size: snapshot.queue_len,
        });
    }

    ledger.check(&task.cost())?;

    if task.criticality >= CRITICAL_THRESHOLD && ledger.low_energy() {
        debug!(
            "energy gate tripped: criticality={} energy={:.2}",
            task.criticality, ledger.energy_level
        );
        return Err(RejectionReason::LowEnergy {
            energy_level: ledger.energy_level,
        });
    }

    Ok(())
}
