//! A tiny two-step workflow and its task map, used only by `serve` to
//! exercise the two handler entrypoints end-to-end without a real cloud
//! account. Not part of the orchestrator itself — a stand-in for whatever
//! straight-line program a real author would write against `api`.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::json;

use api::ApiError;
use executor::{FnTask, Task, TaskMap};

pub const WORKFLOW_NAME: &str = "demo";

/// The author's program: call `fetch`, then `notify`, in the same order on
/// every replay.
pub async fn run() -> Result<(), ApiError> {
    api::call("fetch", "fetch_data").await?;
    api::call("notify", "send_notification").await?;
    Ok(())
}

pub fn task_map() -> TaskMap {
    let mut tasks: TaskMap = HashMap::new();
    tasks.insert("fetch_data".to_string(), Arc::new(FnTask::new(fetch_data)) as Arc<dyn Task>);
    tasks.insert(
        "send_notification".to_string(),
        Arc::new(FnTask::new(send_notification)) as Arc<dyn Task>,
    );
    tasks
}

fn fetch_data(
    handle: &executor::TaskHandle,
    context: model::Context,
) -> futures::future::BoxFuture<'static, i32> {
    let storage = handle.storage.clone();
    let sender = handle.sender.clone();
    let cloud = handle.cloud;
    let workflow_name = handle.workflow_name.clone();
    async move {
        let mut ctx = context;
        ctx.completed = true;
        ctx.success = true;
        let Ok(mut response) = response::Response::new(cloud, storage, sender, workflow_name, ctx).await else {
            return 500;
        };
        response.add_body(HashMap::from([("fetched_at".to_string(), json!("now"))]));
        match response.send().await {
            Ok(()) => 200,
            Err(_) => 500,
        }
    }
    .boxed()
}

fn send_notification(
    handle: &executor::TaskHandle,
    context: model::Context,
) -> futures::future::BoxFuture<'static, i32> {
    let storage = handle.storage.clone();
    let sender = handle.sender.clone();
    let cloud = handle.cloud;
    let workflow_name = handle.workflow_name.clone();
    async move {
        let mut ctx = context;
        ctx.completed = true;
        ctx.success = true;
        let Ok(mut response) = response::Response::new(cloud, storage, sender, workflow_name, ctx).await else {
            return 500;
        };
        response.add_body(HashMap::new());
        match response.send().await {
            Ok(()) => 200,
            Err(_) => 500,
        }
    }
    .boxed()
}
