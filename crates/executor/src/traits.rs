//! The `Task` trait — the contract every executor-side task body must
//! fulfil: a task builds and sends its own terminal `Response`, the
//! dispatcher only sends the "started" response before invoking it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use model::{Cloud, Context};
use queue::QueueSender;
use storage::Storage;

/// Everything a task needs to build and send its own `Response`.
pub struct TaskHandle {
    pub cloud: Cloud,
    pub storage: Arc<dyn Storage>,
    pub workflow_name: String,
    pub sender: Arc<dyn QueueSender>,
}

#[async_trait]
pub trait Task: Send + Sync {
    /// Run the task body. The task is responsible for sending its own
    /// terminal `Response` (success or failure); the returned status code
    /// is purely informational to the caller of the executor handler.
    async fn run(&self, handle: &TaskHandle, context: Context) -> i32;
}

pub type TaskMap = HashMap<String, Arc<dyn Task>>;
