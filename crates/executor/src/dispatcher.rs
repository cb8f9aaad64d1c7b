//! The executor-queue handler: one message in, one task run, one status
//! code out.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use model::{Cloud, ContractError, ExecutorMessage};
use queue::QueueSender;
use response::Response;
use storage::Storage;

use crate::error::ExecutorError;
use crate::traits::{TaskHandle, TaskMap};

/// Runs the five-step dispatch algorithm against one raw executor-queue
/// message body and returns the status code a real handler would return
/// to its caller (200/404; a task's own terminal `Response` carries
/// 400/500 elsewhere).
#[instrument(skip(storage, sender, task_map, raw), fields(workflow = %workflow_name))]
pub async fn dispatch(
    cloud: Cloud,
    storage: Arc<dyn Storage>,
    sender: Arc<dyn QueueSender>,
    workflow_name: &str,
    task_map: &TaskMap,
    raw: &str,
) -> Result<i32, ExecutorError> {
    let message: ExecutorMessage =
        serde_json::from_str(raw).map_err(|e| ContractError::InvalidJson(e.to_string()))?;

    let task = match task_map.get(&message.task_key) {
        Some(task) => task.clone(),
        None => return Ok(404),
    };

    let mut context = message.into_context();
    context.executed = true;

    // Step 3: tell the workflow this task started, before running it, so
    // `executed` is durable even if the task body crashes.
    let mut started = Response::new(cloud, storage.clone(), sender.clone(), workflow_name, context.clone()).await?;
    started.add_body(HashMap::new());
    started.send().await?;

    let handle = TaskHandle {
        cloud,
        storage,
        workflow_name: workflow_name.to_string(),
        sender,
    };
    let status = task.run(&handle, context).await;
    Ok(status)
}
