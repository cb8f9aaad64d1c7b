//! `executor` crate — task dispatch for switchyard.
//!
//! The executor owns the executor queue's handler: given one message it
//! looks up the named task, marks it started, runs it, and returns a status
//! code. Tasks build and send their own terminal `Response`.

pub mod dispatcher;
pub mod error;
pub mod fn_task;
pub mod traits;

pub use dispatcher::dispatch;
pub use error::ExecutorError;
pub use fn_task::FnTask;
pub use traits::{Task, TaskHandle, TaskMap};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use futures::FutureExt;

    use model::{Cloud, Component};
    use queue::{CustomSender, QueueSender};
    use storage::{InMemoryStorage, Storage};

    use super::*;

    async fn harness() -> (Arc<InMemoryStorage>, Arc<Mutex<Vec<(String, String)>>>, Arc<dyn QueueSender>) {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .register_endpoint("demo", Component::InvocationQueue, "queue://invocation")
            .await;
        let captured = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        let sender: Arc<dyn QueueSender> = Arc::new(CustomSender::new(move |endpoint, body| {
            let captured = captured_clone.clone();
            async move {
                captured.lock().unwrap().push((endpoint, body));
                Ok(())
            }
            .boxed()
        }));
        (storage, captured, sender)
    }

    #[tokio::test]
    async fn unknown_task_key_returns_404() {
        let (storage, _captured, sender) = harness().await;
        let task_map: TaskMap = HashMap::new();
        let raw = r#"{"task_key":"missing","ids":[1,1,-1],"executed":false,"completed":false,"success":false,"cache":{}}"#;

        let status = dispatch(Cloud::Custom, storage, sender, "demo", &task_map, raw)
            .await
            .unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn known_task_runs_and_sends_started_response_first() {
        let (storage, captured, sender) = harness().await;
        let mut task_map: TaskMap = HashMap::new();
        task_map.insert(
            "t1".to_string(),
            Arc::new(FnTask::new(|_handle, _ctx| async move { 200 }.boxed())),
        );
        let raw = r#"{"task_key":"t1","ids":[1,1,-1],"executed":false,"completed":false,"success":false,"cache":{}}"#;

        let status = dispatch(Cloud::Custom, storage, sender, "demo", &task_map, raw)
            .await
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(captured.lock().unwrap().len(), 1, "started Response sent before the task ran");

        let body: serde_json::Value = serde_json::from_str(&captured.lock().unwrap()[0].1).unwrap();
        assert_eq!(body["executed"], true);
    }

    #[tokio::test]
    async fn task_can_send_its_own_terminal_response() {
        let (storage, captured, sender) = harness().await;
        let mut task_map: TaskMap = HashMap::new();
        task_map.insert(
            "t1".to_string(),
            Arc::new(FnTask::new(|handle: &TaskHandle, ctx| {
                let storage = handle.storage.clone();
                let sender = handle.sender.clone();
                let cloud = handle.cloud;
                let workflow_name = handle.workflow_name.clone();
                async move {
                    let mut ctx = ctx;
                    ctx.completed = true;
                    ctx.success = true;
                    let mut response = response::Response::new(cloud, storage, sender, workflow_name, ctx)
                        .await
                        .unwrap();
                    response.add_body(HashMap::new());
                    response.send().await.unwrap();
                    200
                }
                .boxed()
            })),
        );
        let raw = r#"{"task_key":"t1","ids":[1,1,-1],"executed":false,"completed":false,"success":false,"cache":{}}"#;

        dispatch(Cloud::Custom, storage, sender, "demo", &task_map, raw)
            .await
            .unwrap();
        assert_eq!(captured.lock().unwrap().len(), 2, "started response, then the task's own terminal response");

        let terminal: serde_json::Value = serde_json::from_str(&captured.lock().unwrap()[1].1).unwrap();
        assert_eq!(terminal["completed"], true);
        assert_eq!(terminal["success"], true);
    }
}
