//! `api` crate — the process-scoped public surface workflow authors call
//! directly.
//!
//! Modeled as process-wide state with explicit `Init`/`Reset` rather than a
//! class singleton: an ambient handle protected by a one-time guard is
//! sufficient because one handler process executes one invocation before
//! terminating. At most one [`engine::Workflow`] exists per process; `init`
//! rejects re-initialization until `reset` is called explicitly.

pub mod error;

pub use error::ApiError;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::Value;

use engine::{Workflow, WorkflowConfig};
use model::{Cloud, Status};
use queue::QueueSender;
use storage::Storage;

static ACTIVE: OnceLock<Mutex<Option<Workflow>>> = OnceLock::new();
static CUSTOM_SENDER: OnceLock<Mutex<Option<Arc<dyn QueueSender>>>> = OnceLock::new();

fn active() -> &'static Mutex<Option<Workflow>> {
    ACTIVE.get_or_init(|| Mutex::new(None))
}

fn custom_sender_slot() -> &'static Mutex<Option<Arc<dyn QueueSender>>> {
    CUSTOM_SENDER.get_or_init(|| Mutex::new(None))
}

/// Overrides the executor-queue sender used by the next `init`. Takes effect
/// for `Cloud::Aws`/`Cloud::Custom` only; `Gcp`/`Azure` always construct
/// their own stub (see `queue::sender_for`).
pub fn set_custom_executor_queue(sender: Arc<dyn QueueSender>) {
    *custom_sender_slot().lock().expect("custom sender lock poisoned") = Some(sender);
}

/// Constructs the process's one active `Workflow` by running the ingest
/// lifecycle against `context_string`. Fails with `ApiError::AlreadyActive`
/// if a prior `init` hasn't been followed by `reset`.
pub async fn init(
    cloud: Cloud,
    name: impl Into<String>,
    storage: Arc<dyn Storage>,
    context_string: &str,
) -> Result<(), ApiError> {
    {
        let guard = active().lock().expect("active workflow lock poisoned");
        if guard.is_some() {
            return Err(ApiError::AlreadyActive);
        }
    }

    let supplied = custom_sender_slot().lock().expect("custom sender lock poisoned").clone();
    let sender = queue::sender_for(cloud, supplied);
    let workflow = Workflow::ingest(name, cloud, storage, sender, WorkflowConfig::default(), context_string).await?;

    let mut guard = active().lock().expect("active workflow lock poisoned");
    *guard = Some(workflow);
    Ok(())
}

/// Clears the active workflow, allowing a subsequent `init`. Required after
/// `done()` — the workflow is not cleared automatically.
pub fn reset() {
    *active().lock().expect("active workflow lock poisoned") = None;
}

/// Runs `f` against the active workflow, returning it to the slot
/// afterwards. `f` is handed ownership rather than a guard because the
/// workflow's methods are `async` and a `std::sync::Mutex` guard must never
/// be held across an `.await`.
async fn with_workflow<F, Fut, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce(Workflow) -> Fut,
    Fut: Future<Output = (Workflow, Result<T, ApiError>)>,
{
    let workflow = {
        let mut guard = active().lock().expect("active workflow lock poisoned");
        guard.take().ok_or(ApiError::NotActive)?
    };
    let (workflow, result) = f(workflow).await;
    let mut guard = active().lock().expect("active workflow lock poisoned");
    *guard = Some(workflow);
    result
}

/// A single-task step.
pub async fn call(step_name: &str, task_key: &str) -> Result<(), ApiError> {
    with_workflow(|mut workflow| async move {
        let result = workflow.call(step_name, task_key).await.map_err(ApiError::from);
        (workflow, result)
    })
    .await
}

/// A fan-out step.
pub async fn parallel_call(step_name: &str, task_keys: &[&str]) -> Result<(), ApiError> {
    with_workflow(|mut workflow| async move {
        let result = workflow.parallel_call(step_name, task_keys).await.map_err(ApiError::from);
        (workflow, result)
    })
    .await
}

/// Read-through view of the active run's cache.
pub fn get_cache() -> Result<HashMap<String, Value>, ApiError> {
    let guard = active().lock().expect("active workflow lock poisoned");
    let workflow = guard.as_ref().ok_or(ApiError::NotActive)?;
    Ok(workflow.cache().clone())
}

/// Finalizes the replay and performs the invocation's single storage write,
/// returning the resulting status. The workflow stays active until `reset`
/// is called.
pub async fn done() -> Result<Status, ApiError> {
    with_workflow(|mut workflow| async move {
        let result = workflow.done().await.map_err(ApiError::from);
        (workflow, result)
    })
    .await
}

/// Sends the sentinel "new run" message to a workflow's invocation queue.
/// Independent of the process singleton — this is how an external caller
/// starts a new run, not how the handler resumes one.
pub async fn trigger(
    cloud: Cloud,
    storage: Arc<dyn Storage>,
    name: impl Into<String>,
    sender: Option<Arc<dyn QueueSender>>,
) -> Result<(), ApiError> {
    let sender = queue::sender_for(cloud, sender);
    let response = response::Trigger::new(cloud, storage, sender, name).await?;
    response.send().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use model::Component;
    use storage::InMemoryStorage;

    fn test_sender() -> (Arc<Mutex<Vec<(String, String)>>>, Arc<dyn QueueSender>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        let sender: Arc<dyn QueueSender> = Arc::new(queue::CustomSender::new(move |endpoint, body| {
            let captured = captured_clone.clone();
            async move {
                captured.lock().unwrap().push((endpoint, body));
                Ok(())
            }
            .boxed()
        }));
        (captured, sender)
    }

    // These tests share the process-global singleton, so each resets it on
    // entry and exit rather than relying on test isolation.
    fn clear() {
        reset();
        *custom_sender_slot().lock().unwrap() = None;
    }

    #[tokio::test]
    async fn operations_before_init_are_rejected() {
        clear();
        let err = call("s1", "t1").await.unwrap_err();
        assert!(matches!(err, ApiError::NotActive));
        let err = get_cache().unwrap_err();
        assert!(matches!(err, ApiError::NotActive));
        clear();
    }

    #[tokio::test]
    async fn init_call_done_round_trip() {
        clear();
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .register_endpoint("demo-api", Component::ExecutorQueue, "queue://executor")
            .await;
        let (captured, sender) = test_sender();
        set_custom_executor_queue(sender);

        let trigger = r#"{"ids":[-1,-1,-1],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        init(Cloud::Custom, "demo-api", storage.clone(), trigger).await.unwrap();

        call("s1", "t1").await.unwrap();
        let status = done().await.unwrap();

        assert_eq!(status, Status::InProcess);
        assert_eq!(captured.lock().unwrap().len(), 1);
        clear();
    }

    #[tokio::test]
    async fn re_init_without_reset_is_rejected() {
        clear();
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .register_endpoint("demo-api-2", Component::ExecutorQueue, "queue://executor")
            .await;
        let (_captured, sender) = test_sender();
        set_custom_executor_queue(sender.clone());

        let trigger = r#"{"ids":[-1,-1,-1],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        init(Cloud::Custom, "demo-api-2", storage.clone(), trigger).await.unwrap();

        let err = init(Cloud::Custom, "demo-api-2", storage, trigger).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyActive));
        clear();
    }
}
