//! HTTP surface of the node: a thin binding from routes to the
//! operations on `FogNode`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tracing::info;

use foglet_core::{NodeError, NodeInfo, Task};

use crate::metrics::MetricsSnapshot;
use crate::node::FogNode;

/// Build the application router with all routes and permissive CORS.
pub fn build_router(node: Arc<FogNode>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/metrics", get(metrics))
        .route("/tasks", post(submit_task))
        .route("/tasks/{id}", get(get_task))
        .route(
            "/rejected-tasks",
            get(rejected_tasks).delete(clear_rejected),
        )
        .route("/rejected-tasks/{id}/retry", post(retry_rejected))
        .layer(CorsLayer::permissive())
        .with_state(node)
}

/// Serve the router until the shutdown signal fires, then drain
/// in-flight requests gracefully.
pub async fn serve(
    node: Arc<FogNode>,
    port: u16,
    shutdown: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let app = build_router(node);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await?;
    Ok(())
}

async fn health(State(node): State<Arc<FogNode>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "node": node.id() }))
}

async fn status(State(node): State<Arc<FogNode>>) -> Json<NodeInfo> {
    Json(node.info())
}

async fn metrics(State(node): State<Arc<FogNode>>) -> Json<MetricsSnapshot> {
    Json(node.metrics_snapshot())
}

// Body parsed by hand so malformed JSON is always a 400, never a 422.
async fn submit_task(State(node): State<Arc<FogNode>>, body: Bytes) -> Response {
    let task: Task = match serde_json::from_slice(&body) {
        Ok(task) => task,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match node.submit(task) {
        Ok(task) => Json(task).into_response(),
        Err(reason) => (StatusCode::SERVICE_UNAVAILABLE, reason.to_string()).into_response(),
    }
}

async fn get_task(State(node): State<Arc<FogNode>>, Path(id): Path<String>) -> Response {
    match node.task(&id) {
        Ok(task) => Json(task).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn rejected_tasks(State(node): State<Arc<FogNode>>) -> Json<serde_json::Value> {
    let tasks = node.rejected_tasks();
    Json(json!({ "total": tasks.len(), "tasks": tasks }))
}

async fn retry_rejected(State(node): State<Arc<FogNode>>, Path(id): Path<String>) -> Response {
    match node.retry_rejected(&id) {
        Ok(task) => Json(json!({
            "message": "Task resubmitted under current conditions",
            "task": task,
        }))
        .into_response(),
        Err(NodeError::Rejected(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, reason.to_string()).into_response()
        }
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}

async fn clear_rejected(State(node): State<Arc<FogNode>>) -> Json<serde_json::Value> {
    let count = node.clear_rejected();
    info!("cleared {} rejected tasks", count);
    Json(json!({ "message": "Rejected tasks cleared", "count": count }))
}
