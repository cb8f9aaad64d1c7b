//! Local dev HTTP harness: exposes the workflow and executor handler
//! entrypoints over HTTP via `axum`, backed by `InMemoryStorage` and a
//! `CustomSender` that loops straight back into the in-process handlers
//! instead of a real queue. Lets a workflow be exercised end-to-end on a
//! laptop with no cloud account.

use std::sync::{Arc, OnceLock};

use axum::extract::State as AxumState;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use futures::FutureExt;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use api::ApiError;
use executor::ExecutorError;
use model::{Cloud, Component};
use queue::{CustomSender, QueueError, QueueSender};
use storage::InMemoryStorage;

use crate::demo;

const INVOCATION_ENDPOINT: &str = "local://invocation";
const EXECUTOR_ENDPOINT: &str = "local://executor";

#[derive(Clone)]
struct DevState {
    storage: Arc<InMemoryStorage>,
    task_map: Arc<executor::TaskMap>,
}

pub async fn serve(bind: &str) -> Result<(), std::io::Error> {
    let storage = Arc::new(InMemoryStorage::new());
    storage
        .register_endpoint(demo::WORKFLOW_NAME, Component::InvocationQueue, INVOCATION_ENDPOINT)
        .await;
    storage
        .register_endpoint(demo::WORKFLOW_NAME, Component::ExecutorQueue, EXECUTOR_ENDPOINT)
        .await;

    let state = DevState {
        storage: storage.clone(),
        task_map: Arc::new(demo::task_map()),
    };
    let sender = looped_sender(state.clone());
    api::set_custom_executor_queue(sender.clone());

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let app = Router::new()
        .route("/trigger", post(trigger_handler))
        .route("/invoke", post(invoke_handler))
        .route("/executor", post(executor_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(DevServerState { state, sender });

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("switchyard dev harness listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}

/// Builds a sender that loops a message straight back into the workflow or
/// executor handler, keyed off the endpoint it was addressed to. The sender
/// needs to hand itself to those handlers (so *their* enqueues loop back
/// too), which is why it's wired through a `OnceLock` rather than captured
/// directly — the closure can't name its own `Arc` before it exists.
fn looped_sender(state: DevState) -> Arc<dyn QueueSender> {
    let cell: Arc<OnceLock<Arc<dyn QueueSender>>> = Arc::new(OnceLock::new());
    let cell_for_closure = cell.clone();
    let sender: Arc<dyn QueueSender> = Arc::new(CustomSender::new(move |endpoint, body| {
        let state = state.clone();
        let cell = cell_for_closure.clone();
        async move {
            let sender = cell.get().expect("sender cell set before first send").clone();
            match endpoint.as_str() {
                INVOCATION_ENDPOINT => run_workflow_handler(state, sender, body)
                    .await
                    .map_err(|e| QueueError::Custom(e.to_string())),
                EXECUTOR_ENDPOINT => run_executor_handler(state, sender, body)
                    .await
                    .map(|_status| ())
                    .map_err(|e| QueueError::Custom(e.to_string())),
                _ => Err(QueueError::Unsupported("dev harness endpoint not recognized")),
            }
        }
        .boxed()
    }));
    cell.set(sender.clone()).ok();
    sender
}

/// Runs `init` -> the demo author program -> `done`, then resets the
/// singleton so the next looped-back message starts fresh.
async fn run_workflow_handler(state: DevState, sender: Arc<dyn QueueSender>, body: String) -> Result<(), ApiError> {
    api::set_custom_executor_queue(sender);
    let result = async {
        api::init(Cloud::Custom, demo::WORKFLOW_NAME, state.storage.clone(), &body).await?;
        demo::run().await?;
        api::done().await?;
        Ok(())
    }
    .await;
    api::reset();
    result
}

/// Returns the dispatcher's own status code (200/404) on success so HTTP
/// callers can surface the vocabulary finalized in SPEC_FULL.md §7.
async fn run_executor_handler(state: DevState, sender: Arc<dyn QueueSender>, body: String) -> Result<i32, ExecutorError> {
    executor::dispatch(
        Cloud::Custom,
        state.storage.clone(),
        sender,
        demo::WORKFLOW_NAME,
        &state.task_map,
        &body,
    )
    .await
}

#[derive(Clone)]
struct DevServerState {
    state: DevState,
    sender: Arc<dyn QueueSender>,
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn trigger_handler(AxumState(server): AxumState<DevServerState>) -> (StatusCode, Json<Value>) {
    let result = api::trigger(
        Cloud::Custom,
        server.state.storage.clone(),
        demo::WORKFLOW_NAME,
        Some(server.sender.clone()),
    )
    .await;
    match result {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "triggered"}))),
        Err(e) => (
            status_of(e.status_code()),
            Json(serde_json::json!({"status": "error", "message": e.to_string()})),
        ),
    }
}

async fn invoke_handler(AxumState(server): AxumState<DevServerState>, body: String) -> (StatusCode, Json<Value>) {
    match run_workflow_handler(server.state.clone(), server.sender.clone(), body).await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "ok"}))),
        Err(e) => (
            status_of(e.status_code()),
            Json(serde_json::json!({"status": "error", "message": e.to_string()})),
        ),
    }
}

async fn executor_handler(AxumState(server): AxumState<DevServerState>, body: String) -> (StatusCode, Json<Value>) {
    match run_executor_handler(server.state.clone(), server.sender.clone(), body).await {
        Ok(code) => (status_of(code as u16), Json(serde_json::json!({"status": code}))),
        Err(e) => (
            status_of(e.status_code()),
            Json(serde_json::json!({"status": "error", "message": e.to_string()})),
        ),
    }
}
