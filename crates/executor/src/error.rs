//! Executor-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("unknown task_key '{0}'")]
    UnknownTaskKey(String),

    #[error(transparent)]
    Contract(#[from] model::ContractError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Queue(#[from] queue::QueueError),

    #[error(transparent)]
    Response(#[from] response::ResponseError),
}

impl ExecutorError {
    /// Maps onto the status-code vocabulary finalized in SPEC_FULL.md §7.
    pub fn status_code(&self) -> u16 {
        match self {
            ExecutorError::UnknownTaskKey(_) => 404,
            ExecutorError::Contract(_) => 409,
            ExecutorError::Storage(_) | ExecutorError::Queue(_) | ExecutorError::Response(_) => 500,
        }
    }
}
