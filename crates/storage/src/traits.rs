//! The `Storage` trait — abstract CRUD over workflow state and resource
//! discovery. Implementations live per-provider and a `Custom` variant
//! carries a user-supplied implementation for tests and bring-your-own
//! backends, instead of dynamic dispatch on a `Cloud` enum.

use async_trait::async_trait;

use model::{Component, State};

use crate::error::StorageError;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Return the current persisted run, or `None` if it doesn't exist yet.
    async fn read(&self, name: &str, run_id: i64) -> Result<Option<State>, StorageError>;

    /// Upsert by `(name, run_id)`. Must persist `steps`, `cache`, and
    /// `status` atomically as one row update.
    async fn write(&self, state: &State) -> Result<(), StorageError>;

    /// Return the next `run_id` for this workflow name. Implementations
    /// without a native counter may compute `max(run_id) + 1`; races between
    /// concurrent new-run allocations are acceptable because the authoring
    /// layer guarantees one workflow instance per handler process.
    async fn increment_id(&self, name: &str) -> Result<i64, StorageError>;

    /// Discovery lookup from the `resources` table. Fails if absent.
    async fn get_endpoint(&self, name: &str, component: Component) -> Result<String, StorageError>;
}
