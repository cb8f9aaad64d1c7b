//! Engine-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Contract(#[from] model::ContractError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Queue(#[from] queue::QueueError),

    #[error("state has steps but current step_id {state_step_id} does not match context ids[1] {context_step_id}")]
    StepIdMismatch {
        state_step_id: i64,
        context_step_id: i64,
    },

    #[error("current step is not a ParallelStep but context carries task_id={0}")]
    ExpectedParallelStep(i64),

    #[error("task_id {task_id} not found in parallel step {step_id}")]
    UnknownTaskId { step_id: i64, task_id: i64 },
}

impl EngineError {
    /// Maps onto the status-code vocabulary finalized in SPEC_FULL.md §7.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Contract(_)
            | EngineError::StepIdMismatch { .. }
            | EngineError::ExpectedParallelStep(_)
            | EngineError::UnknownTaskId { .. } => 409,
            EngineError::Storage(_) | EngineError::Queue(_) => 500,
        }
    }
}
