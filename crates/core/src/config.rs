use serde::{Deserialize, Serialize};

/// Number of worker threads draining the priority queue.
pub const DEFAULT_WORKERS: usize = 5;

/// Node bootstrap configuration.
///
/// Deployments configure nodes purely through the environment
/// (`NODE_ID`, `LOCATION`, `PORT`); a typical site runs several nodes
/// side by side on consecutive ports. There is no config file and no
/// persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: String,
    pub location: String,
    pub port: u16,
    /// Worker pool size. Fixed at `DEFAULT_WORKERS` in deployments;
    /// overridable so tests can run a deterministic pool.
    pub workers: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "fog-node-1".to_string(),
            location: "edge-site-1".to_string(),
            port: 8080,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            node_id: env_or("NODE_ID", defaults.node_id),
            location: env_or("LOCATION", defaults.location),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            workers: defaults.workers,
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default,
    }
}
