//! Public API error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Every mutating operation requires a prior `init`.
    #[error("no active workflow: call init() first")]
    NotActive,

    #[error("a workflow is already active for this process; call done() or reset() first")]
    AlreadyActive,

    #[error(transparent)]
    Engine(#[from] engine::EngineError),

    #[error(transparent)]
    Response(#[from] response::ResponseError),
}

impl ApiError {
    /// Maps onto the status-code vocabulary finalized in SPEC_FULL.md §7.
    /// `NotActive`/`AlreadyActive` are configuration errors — fatal, never
    /// retried — so they share the 500 bucket with transport failures
    /// rather than the 409 contract-error bucket.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::NotActive | ApiError::AlreadyActive => 500,
            ApiError::Engine(e) => e.status_code(),
            ApiError::Response(_) => 500,
        }
    }
}
