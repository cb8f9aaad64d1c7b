//! The replay engine.
//!
//! A `Workflow` is built fresh for every invocation from the incoming
//! message and persisted `State`, then the author's straight-line program
//! drives it forward by calling `call`/`parallel_call` in order. Once the
//! engine makes its first execute-or-wait decision in a replay, every
//! further call this invocation is a no-op — this is what lets the author
//! write an unconditional sequence of calls and rely on the engine to find
//! the right place to resume.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use model::{Cloud, Component, Context, ExecutorMessage, ParallelStep, State, Status, Step, StepEntry};
use queue::QueueSender;
use storage::Storage;

use crate::config::WorkflowConfig;
use crate::error::EngineError;

pub struct Workflow {
    name: String,
    cloud: Cloud,
    storage: Arc<dyn Storage>,
    sender: Arc<dyn QueueSender>,
    config: WorkflowConfig,
    context: Context,
    state: State,
    /// Index of the last appended step, or `-1` for a brand new run.
    step_idx: i64,
    /// Walking counter across this invocation's replay of the author's program.
    step_cnt: i64,
    /// Set once the first execute-or-wait decision has been made this invocation.
    halted: bool,
    /// Set once something has been enqueued this invocation (gates `Done`).
    enqueued: bool,
}

impl Workflow {
    /// Runs the full ingest lifecycle: parse the context, load or allocate
    /// `State`, overlay cache, position at the current step, and fold the
    /// incoming outcome into it.
    #[instrument(skip(storage, sender, raw_context), fields(workflow = %name))]
    pub async fn ingest(
        name: impl Into<String>,
        cloud: Cloud,
        storage: Arc<dyn Storage>,
        sender: Arc<dyn QueueSender>,
        config: WorkflowConfig,
        raw_context: &str,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        let mut context = Context::from_json(raw_context)?;

        let mut state = if context.is_new_run() {
            let run_id = storage.increment_id(&name).await?;
            // `ids[1]` starts at 0 so the first appended step gets id 1
            // (`step_id = context.step_id() + 1`), matching the one-indexed
            // step numbering the rest of the contract assumes.
            context.ids = [run_id, 0, -1];
            State::new(&name, run_id)
        } else {
            let state = storage
                .read(&name, context.run_id())
                .await?
                .ok_or(storage::StorageError::NotFound)?;
            if state.steps.is_empty() {
                return Err(model::ContractError::EmptyStateForExistingRun.into());
            }
            state
        };

        state.overlay_cache(&context.cache);

        let step_idx = state.current_index().map(|i| i as i64).unwrap_or(-1);
        if step_idx >= 0 {
            let curr_step_id = state.steps[step_idx as usize].step_id();
            if curr_step_id != context.step_id() {
                return Err(EngineError::StepIdMismatch {
                    state_step_id: curr_step_id,
                    context_step_id: context.step_id(),
                });
            }

            if Self::is_impossible(&state.steps[step_idx as usize], &context) {
                debug!(run_id = context.run_id(), step_id = curr_step_id, "ignoring stale/duplicate context");
            } else {
                Self::fold_outcome(&mut state.steps[step_idx as usize], &mut context)?;
            }
        }

        Ok(Self {
            name,
            cloud,
            storage,
            sender,
            config,
            context,
            state,
            step_idx,
            step_cnt: 0,
            halted: false,
            enqueued: false,
        })
    }

    /// True if any outcome flag is `true` in the current step but `false` in
    /// the incoming context — a stale/duplicate redelivery.
    fn is_impossible(entry: &StepEntry, context: &Context) -> bool {
        let (executed, completed, success) = entry.outcome();
        (executed && !context.executed) || (completed && !context.completed) || (success && !context.success)
    }

    fn fold_outcome(entry: &mut StepEntry, context: &mut Context) -> Result<(), EngineError> {
        if context.task_id() >= 0 {
            let parallel = entry
                .as_parallel_mut()
                .ok_or(EngineError::ExpectedParallelStep(context.task_id()))?;
            let task = parallel
                .task_mut(context.task_id())
                .ok_or(EngineError::UnknownTaskId {
                    step_id: parallel.step_id,
                    task_id: context.task_id(),
                })?;
            task.fold_outcome(context.executed, context.completed, context.success);
            let (executed, completed, success) = parallel.recompute_aggregate();
            context.executed = executed;
            context.completed = completed;
            context.success = success;
        } else {
            let step = entry.as_step_mut().ok_or(EngineError::ExpectedParallelStep(-1))?;
            step.fold_outcome(context.executed, context.completed, context.success);
        }
        Ok(())
    }

    fn current_step_name(&self) -> Option<&str> {
        if self.step_idx < 0 {
            None
        } else {
            Some(self.state.steps[self.step_idx as usize].step_name())
        }
    }

    fn is_waiting(&self) -> bool {
        !(self.context.executed && self.context.completed)
    }

    fn needs_retry(&self) -> bool {
        self.context.executed && self.context.completed && !self.context.success
    }

    /// A single-task step.
    #[instrument(skip(self))]
    pub async fn call(&mut self, step_name: &str, task_key: &str) -> Result<(), EngineError> {
        if self.halted {
            return Ok(());
        }

        if self.step_cnt < self.step_idx {
            self.step_cnt += 1;
            return Ok(());
        }

        if self.is_waiting() {
            self.halted = true;
            return Ok(());
        }

        let matches_current = self.current_step_name() == Some(step_name);
        if matches_current {
            if self.needs_retry() {
                let step_id = self.state.steps[self.step_idx as usize]
                    .as_step_mut()
                    .expect("Call's current step is a plain Step")
                    .step_id;
                self.retry_current_step();
                self.enqueue_call(step_id, task_key).await?;
                self.halted = true;
            } else {
                self.step_cnt += 1;
            }
            return Ok(());
        }

        let step_id = self.context.step_id() + 1;
        let step = Step::new(step_id, step_name, task_key, self.config.default_retries);
        self.state.steps.push(StepEntry::Step(step));
        self.step_idx += 1;
        self.reset_context_for_new_step(step_id);
        self.enqueue_call(step_id, task_key).await?;
        self.halted = true;
        Ok(())
    }

    /// A fan-out step.
    #[instrument(skip(self, task_keys))]
    pub async fn parallel_call(&mut self, step_name: &str, task_keys: &[&str]) -> Result<(), EngineError> {
        if self.halted {
            return Ok(());
        }

        if self.step_cnt < self.step_idx {
            self.step_cnt += 1;
            return Ok(());
        }

        if self.is_waiting() {
            self.halted = true;
            return Ok(());
        }

        let matches_current = self.current_step_name() == Some(step_name);
        if matches_current {
            if self.needs_retry() {
                // Parallel retries re-run the whole group; individual task
                // flags reset along with the group's.
                let step_id = self.state.steps[self.step_idx as usize].step_id();
                let parallel = self.state.steps[self.step_idx as usize]
                    .as_parallel_mut()
                    .expect("ParallelCall's current step is a ParallelStep");
                for (task, task_key) in parallel.tasks.iter_mut().zip(task_keys) {
                    task.executed = false;
                    task.completed = false;
                    task.success = false;
                    task.task_key = task_key.to_string();
                }
                parallel.executed = false;
                parallel.completed = false;
                parallel.success = false;
                self.context.executed = false;
                self.context.completed = false;
                self.context.success = false;
                for task_id in 0..task_keys.len() as i64 {
                    self.enqueue_parallel_task(step_id, task_id, task_keys[task_id as usize]).await?;
                }
                self.halted = true;
            } else {
                self.step_cnt += 1;
            }
            return Ok(());
        }

        let step_id = self.context.step_id() + 1;
        let tasks: Vec<Step> = task_keys
            .iter()
            .enumerate()
            .map(|(i, key)| Step::new(step_id, "call", *key, self.config.default_retries).with_task_id(i as i64))
            .collect();
        self.state
            .steps
            .push(StepEntry::Parallel(ParallelStep::new(step_id, step_name, tasks)));
        self.step_idx += 1;
        self.reset_context_for_new_step(step_id);
        for (task_id, key) in task_keys.iter().enumerate() {
            self.enqueue_parallel_task(step_id, task_id as i64, key).await?;
        }
        self.halted = true;
        Ok(())
    }

    /// Decrement the retry budget on the current step; flip to `OutOfRetries`
    /// if exhausted.
    fn retry_current_step(&mut self) {
        let step = self.state.steps[self.step_idx as usize]
            .as_step_mut()
            .expect("retry path only reached for plain Step");
        match step.retries.checked_sub(1) {
            Some(remaining) => {
                step.retries = remaining;
                step.executed = false;
                step.completed = false;
                step.success = false;
                self.context.executed = false;
                self.context.completed = false;
                self.context.success = false;
            }
            None => {
                self.state.status = Status::OutOfRetries;
            }
        }
    }

    fn reset_context_for_new_step(&mut self, new_step_id: i64) {
        self.context.ids = [self.context.run_id(), new_step_id, -1];
        self.context.executed = false;
        self.context.completed = false;
        self.context.success = false;
    }

    async fn enqueue_call(&mut self, step_id: i64, task_key: &str) -> Result<(), EngineError> {
        if self.state.status == Status::OutOfRetries {
            return Ok(());
        }
        let endpoint = self.storage.get_endpoint(&self.name, Component::ExecutorQueue).await?;
        let mut context = self.context.clone();
        context.ids = [context.run_id(), step_id, -1];
        let message = ExecutorMessage::new(&self.name, task_key, &context);
        self.sender
            .send(&endpoint, serde_json::to_string(&message).expect("ExecutorMessage always serializes"))
            .await?;
        self.enqueued = true;
        Ok(())
    }

    async fn enqueue_parallel_task(&mut self, step_id: i64, task_id: i64, task_key: &str) -> Result<(), EngineError> {
        let endpoint = self.storage.get_endpoint(&self.name, Component::ExecutorQueue).await?;
        let mut context = self.context.clone();
        context.ids = [context.run_id(), step_id, task_id];
        let message = ExecutorMessage::new(&self.name, task_key, &context);
        self.sender
            .send(&endpoint, serde_json::to_string(&message).expect("ExecutorMessage always serializes"))
            .await?;
        self.enqueued = true;
        Ok(())
    }

    /// Read-through view of the current state's cache.
    pub fn cache(&self) -> &HashMap<String, Value> {
        &self.state.cache
    }

    pub fn run_id(&self) -> i64 {
        self.context.run_id()
    }

    pub fn cloud(&self) -> Cloud {
        self.cloud
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    /// Finalizes the replay and performs the invocation's single `write`:
    /// exactly one write per invocation, on every exit path.
    #[instrument(skip(self))]
    pub async fn done(&mut self) -> Result<Status, EngineError> {
        if !self.halted && self.state.status == Status::InProcess && !self.enqueued {
            self.state.status = Status::Completed;
        }
        self.storage.write(&self.state).await?;
        Ok(self.state.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Mutex;
    use storage::InMemoryStorage;

    async fn harness() -> (Arc<InMemoryStorage>, Arc<Mutex<Vec<(String, String)>>>, Arc<dyn QueueSender>) {
        let storage = Arc::new(InMemoryStorage::new());
        storage
            .register_endpoint("demo", Component::ExecutorQueue, "queue://executor")
            .await;
        let captured: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        let sender: Arc<dyn QueueSender> = Arc::new(queue::CustomSender::new(move |endpoint, body| {
            let captured = captured_clone.clone();
            async move {
                captured.lock().unwrap().push((endpoint, body));
                Ok(())
            }
            .boxed()
        }));
        (storage, captured, sender)
    }

    const TRIGGER: &str = r#"{"ids":[-1,-1,-1],"executed":true,"completed":true,"success":true,"cache":{}}"#;

    #[tokio::test]
    async fn new_run_single_step_enqueues_once() {
        let (storage, captured, sender) = harness().await;
        let mut wf = Workflow::ingest("demo", Cloud::Custom, storage.clone(), sender, WorkflowConfig::default(), TRIGGER)
            .await
            .unwrap();

        wf.call("s1", "t1").await.unwrap();
        let status = wf.done().await.unwrap();

        assert_eq!(status, Status::InProcess);
        assert_eq!(captured.lock().unwrap().len(), 1);

        let state = storage.read("demo", wf.run_id()).await.unwrap().unwrap();
        assert_eq!(state.steps.len(), 1);
        let (executed, completed, success) = state.steps[0].outcome();
        assert!(!executed && !completed && !success);
    }

    #[tokio::test]
    async fn task_success_completes_the_run() {
        let (storage, _captured, sender) = harness().await;
        let mut wf = Workflow::ingest("demo", Cloud::Custom, storage.clone(), sender.clone(), WorkflowConfig::default(), TRIGGER)
            .await
            .unwrap();
        wf.call("s1", "t1").await.unwrap();
        wf.done().await.unwrap();

        let success = format!(
            r#"{{"ids":[{},1,-1],"executed":true,"completed":true,"success":true,"cache":{{}}}}"#,
            wf.run_id()
        );
        let mut wf2 = Workflow::ingest("demo", Cloud::Custom, storage.clone(), sender, WorkflowConfig::default(), &success)
            .await
            .unwrap();
        wf2.call("s1", "t1").await.unwrap();
        let status = wf2.done().await.unwrap();

        assert_eq!(status, Status::Completed);
        let state = storage.read("demo", wf2.run_id()).await.unwrap().unwrap();
        let (executed, completed, success) = state.steps[0].outcome();
        assert!(executed && completed && success);
    }

    #[tokio::test]
    async fn two_step_sequence_enqueues_next_step_after_success() {
        let (storage, captured, sender) = harness().await;
        let mut wf = Workflow::ingest("demo", Cloud::Custom, storage.clone(), sender.clone(), WorkflowConfig::default(), TRIGGER)
            .await
            .unwrap();
        wf.call("s1", "t1").await.unwrap();
        wf.call("s2", "t2").await.unwrap();
        wf.done().await.unwrap();
        assert_eq!(captured.lock().unwrap().len(), 1, "only s1 enqueues on the first pass");

        let success = format!(
            r#"{{"ids":[{},1,-1],"executed":true,"completed":true,"success":true,"cache":{{}}}}"#,
            wf.run_id()
        );
        let mut wf2 = Workflow::ingest("demo", Cloud::Custom, storage.clone(), sender, WorkflowConfig::default(), &success)
            .await
            .unwrap();
        wf2.call("s1", "t1").await.unwrap();
        wf2.call("s2", "t2").await.unwrap();
        let status = wf2.done().await.unwrap();

        assert_eq!(status, Status::InProcess);
        let state = storage.read("demo", wf2.run_id()).await.unwrap().unwrap();
        assert_eq!(state.steps.len(), 2);
        assert_eq!(captured.lock().unwrap().len(), 2, "s2 enqueues on the second pass");
    }

    #[tokio::test]
    async fn new_run_sentinel_mismatch_is_rejected() {
        let (storage, _captured, sender) = harness().await;
        let bad = r#"{"ids":[-1,0,0],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        let err = Workflow::ingest("demo", Cloud::Custom, storage, sender, WorkflowConfig::default(), bad)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Contract(_)));
    }

    #[tokio::test]
    async fn existing_run_with_no_steps_yet_is_a_contract_error() {
        let (storage, _captured, sender) = harness().await;
        storage.write(&State::new("demo", 1)).await.unwrap();
        let msg = r#"{"ids":[1,0,-1],"executed":true,"completed":true,"success":true,"cache":{}}"#;
        let err = Workflow::ingest("demo", Cloud::Custom, storage, sender, WorkflowConfig::default(), msg)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Contract(model::ContractError::EmptyStateForExistingRun)
        ));
    }
}
