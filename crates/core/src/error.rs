use thiserror::Error;

/// Why admission (or retry) declined a task. The `Display` renderings
/// are the reason strings clients see and the rejection queue records.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    #[error("Node overloaded: load={load:.2}, queue_size={queue_size}")]
    Overloaded { load: f64, queue_size: usize },

    #[error(
        "Insufficient resources: cpu={cpu_cost:.2}/{available_cpu:.2}, \
         ram={ram_cost:.2}/{available_ram:.2}, \
         storage={storage_cost:.1}/{available_storage:.1}"
    )]
    InsufficientResources {
        cpu_cost: f64,
        available_cpu: f64,
        ram_cost: f64,
        available_ram: f64,
        storage_cost: f64,
        available_storage: f64,
    },

    #[error("Low energy level ({energy_level:.2}), critical task rejected")]
    LowEnergy { energy_level: f64 },
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("{0}")]
    Rejected(#[from] RejectionReason),

    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Rejected task {0} not found")]
    RejectedTaskNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_reason_encodes_both_values() {
        let reason = RejectionReason::Overloaded {
            load: 0.0,
            queue_size: 51,
        };
        let text = reason.to_string();
        assert!(text.contains("load=0.00"));
        assert!(text.contains("queue_size=51"));
    }

    #[test]
    fn resource_reason_encodes_triple() {
        let reason = RejectionReason::InsufficientResources {
            cpu_cost: 0.4,
            available_cpu: 0.1,
            ram_cost: 0.3,
            available_ram: 0.5,
            storage_cost: 100.0,
            available_storage: 900.0,
        };
        let text = reason.to_string();
        assert!(text.starts_with("Insufficient resources"));
        assert!(text.contains("cpu=0.40/0.10"));
        assert!(text.contains("storage=100.0/900.0"));
    }
}
