use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use foglet_core::NodeConfig;
use foglet_node::{api, worker, FogNode};

/// How long in-flight HTTP requests get to finish after the shutdown
/// signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "foglet-node", about = "Foglet edge compute node", version)]
struct Cli {
    /// Node identifier (overrides NODE_ID)
    #[arg(long)]
    node_id: Option<String>,

    /// Deployment location label (overrides LOCATION)
    #[arg(long)]
    location: Option<String>,

    /// HTTP port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; ignore when absent.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Precedence: CLI args > environment > defaults.
    let mut config = NodeConfig::from_env();
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(location) = cli.location {
        config.location = location;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!(
        "starting fog node {} at {} on port {} with {} workers",
        config.node_id, config.location, config.port, config.workers
    );

    let node = Arc::new(FogNode::new(config.clone()));
    let workers = worker::spawn_pool(&node);

    // Load ticker: every 5 s the exposed load is recomputed from queue
    // pressure and last_seen is touched.
    let ticker_node = Arc::clone(&node);
    let ticker = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            ticker_node.refresh_load();
        }
    });

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let server = tokio::spawn(api::serve(Arc::clone(&node), config.port, shutdown_rx));

    shutdown_signal().await;
    info!("shutdown signal received");

    // Cancellation first: workers finish their current task and stop,
    // the ticker stops. The HTTP server is then shut down with a grace
    // window for in-flight requests.
    node.shutdown();
    ticker.abort();

    let _ = shutdown_tx.send(());
    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(result) => result??,
        Err(_) => warn!("HTTP drain exceeded {:?}, giving up", SHUTDOWN_GRACE),
    }

    for handle in workers {
        let _ = handle.join();
    }
    info!("fog node {} stopped", node.id());

    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM (what orchestrators send).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
