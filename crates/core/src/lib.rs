pub mod config;
pub mod error;
pub mod types;

pub use config::NodeConfig;
pub use error::{NodeError, RejectionReason};
pub use types::{NodeInfo, RejectedTask, ResourceCost, Task, TaskKind, TaskStatus};
