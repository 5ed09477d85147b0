pub mod admission;
pub mod ledger;
pub mod queue;
pub mod score;

#[cfg(test)]
pub(crate) mod tests_common;

pub use admission::{apply_defaults, check_gates, LoadSnapshot};
pub use ledger::ResourceLedger;
pub use queue::TaskQueue;
pub use score::ScoreWeights;
