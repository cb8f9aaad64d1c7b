//! Queue-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("transport error sending to '{endpoint}': {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("queue provider not wired up yet: {0}")]
    Unsupported(&'static str),

    #[error("custom sender callback failed: {0}")]
    Custom(String),
}
