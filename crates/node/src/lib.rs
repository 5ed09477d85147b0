pub mod api;
pub mod handlers;
pub mod metrics;
pub mod node;
pub mod worker;

pub use metrics::{Metrics, MetricsSnapshot};
pub use node::FogNode;
