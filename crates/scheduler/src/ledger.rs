use foglet_core::{RejectionReason, ResourceCost};
use serde::Serialize;

/// Energy level below which critical tasks are turned away.
pub const MIN_ENERGY_LEVEL: f64 = 0.30;

/// In-memory accounting of what the node has left to give.
///
/// Every successful admission subtracts the task's four declared costs
/// (reservation); completion restores the exact same amounts. The sum
/// of reservations over live tasks therefore always equals
/// `capacity − available` on each dimension.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceLedger {
    pub available_cpu: f64,
    pub available_ram: f64,
    pub available_storage: f64,
    pub energy_level: f64,
    capacity_cpu: f64,
    capacity_ram: f64,
    capacity_storage: f64,
    capacity_energy: f64,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceLedger {
    /// A fresh node: full CPU, RAM and energy, 1000 MB of storage.
    pub fn new() -> Self {
        Self {
            available_cpu: 1.0,
            available_ram: 1.0,
            available_storage: 1000.0,
            energy_level: 1.0,
            capacity_cpu: 1.0,
            capacity_ram: 1.0,
            capacity_storage: 1000.0,
            capacity_energy: 1.0,
        }
    }

    /// The resource gate: can this cost be reserved right now?
    /// Energy is deliberately absent here; it has its own gate that
    /// only applies to critical tasks.
    pub fn check(&self, cost: &ResourceCost) -> Result<(), RejectionReason> {
        if cost.cpu > self.available_cpu
            || cost.ram > self.available_ram
            || cost.storage_mb > self.available_storage
        {
            return Err(RejectionReason::InsufficientResources {
                cpu_cost: cost.cpu,
                available_cpu: self.available_cpu,
                ram_cost: cost.ram,
                available_ram: self.available_ram,
                storage_cost: cost.storage_mb,
                available_storage: self.available_storage,
            });
        }
        Ok(())
    }

    pub fn low_energy(&self) -> bool {
        self.energy_level < MIN_ENERGY_LEVEL
    }

    /// Deduct all four dimensions. Callers gate with `check` first.
    pub fn reserve(&mut self, cost: &ResourceCost) {
        self.available_cpu -= cost.cpu;
        self.available_ram -= cost.ram;
        self.available_storage -= cost.storage_mb;
        self.energy_level -= cost.energy_wh;
    }

    /// Restore a reservation on task completion.
    pub fn release(&mut self, cost: &ResourceCost) {
        self.available_cpu += cost.cpu;
        self.available_ram += cost.ram;
        self.available_storage += cost.storage_mb;
        self.energy_level += cost.energy_wh;
    }

    /// Reserved amounts per dimension, for conservation checks.
    pub fn reserved(&self) -> ResourceCost {
        ResourceCost::new(
            self.capacity_cpu - self.available_cpu,
            self.capacity_ram - self.available_ram,
            self.capacity_storage - self.available_storage,
            self.capacity_energy - self.energy_level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(cpu: f64, ram: f64, storage: f64, energy: f64) -> ResourceCost {
        ResourceCost::new(cpu, ram, storage, energy)
    }

    #[test]
    fn reserve_then_release_conserves_capacity() {
        let mut ledger = ResourceLedger::new();
        let first = cost(0.4, 0.3, 100.0, 0.2);
        let second = cost(0.2, 0.15, 50.0, 0.1);

        ledger.reserve(&first);
        ledger.reserve(&second);
        let reserved = ledger.reserved();
        assert!((reserved.cpu - 0.6).abs() < 1e-9);
        assert!((reserved.ram - 0.45).abs() < 1e-9);
        assert!((reserved.storage_mb - 150.0).abs() < 1e-9);
        assert!((reserved.energy_wh - 0.3).abs() < 1e-9);

        ledger.release(&first);
        ledger.release(&second);
        assert!((ledger.available_cpu - 1.0).abs() < 1e-9);
        assert!((ledger.available_ram - 1.0).abs() < 1e-9);
        assert!((ledger.available_storage - 1000.0).abs() < 1e-9);
        assert!((ledger.energy_level - 1.0).abs() < 1e-9);
    }

    #[test]
    fn check_rejects_any_single_dimension_overrun() {
        let mut ledger = ResourceLedger::new();
        ledger.reserve(&cost(0.9, 0.0, 0.0, 0.0));

        let err = ledger.check(&cost(0.4, 0.1, 10.0, 0.0)).unwrap_err();
        assert!(err.to_string().contains("Insufficient resources"));

        // RAM and storage alone also trip the gate
        assert!(ledger.check(&cost(0.0, 1.5, 0.0, 0.0)).is_err());
        assert!(ledger.check(&cost(0.0, 0.0, 2000.0, 0.0)).is_err());
    }

    #[test]
    fn energy_does_not_trip_the_resource_gate() {
        let mut ledger = ResourceLedger::new();
        ledger.reserve(&cost(0.0, 0.0, 0.0, 0.9));
        assert!(ledger.low_energy());
        // Resource gate still passes: energy is filtered elsewhere,
        // and only for critical tasks.
        assert!(ledger.check(&cost(0.1, 0.1, 10.0, 0.5)).is_ok());
    }
}
