//! Typed error type for the `storage` crate: configuration and transport
//! errors. Callers decide whether to retry — the engine treats every
//! variant here as fatal-to-the-invocation and lets the queue redeliver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row not found")]
    NotFound,

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("no resource endpoint registered for component={component:?} name='{name}'")]
    EndpointNotFound {
        component: model::Component,
        name: String,
    },

    #[error("malformed state row: {0}")]
    Corrupt(String),
}
