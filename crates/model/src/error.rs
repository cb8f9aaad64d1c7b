use thiserror::Error;

/// Contract errors — a message is structurally wrong.
/// These are fatal: they indicate a bug or a corrupt message, never retried
/// by fixing up the data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("context is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("context missing required field 'ids'")]
    MissingIds,

    #[error("context 'ids' must have length 2 or 3, got {0}")]
    InvalidIdsLength(usize),

    #[error("context missing required boolean field '{0}'")]
    MissingField(&'static str),

    #[error("ids={0:?} has run_id=-1 without being the full new-run sentinel [-1,-1,-1]")]
    InvalidSentinel([i64; 3]),

    #[error("state has no steps but context is not a new-run sentinel")]
    EmptyStateForExistingRun,
}
