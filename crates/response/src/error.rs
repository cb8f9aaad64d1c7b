//! Response-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("send() called before add_body()")]
    BodyNotBuilt,

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error(transparent)]
    Queue(#[from] queue::QueueError),
}
