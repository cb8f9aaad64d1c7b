//! `InMemoryStorage` — a `tokio::sync::Mutex`-backed `Storage` used by the
//! CLI dev harness and by engine/executor unit tests: a deterministic test
//! double that records enough state to make assertions straightforward.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use model::{Component, State};

use crate::error::StorageError;
use crate::traits::Storage;

#[derive(Default)]
struct Inner {
    states: HashMap<(String, i64), State>,
    next_id: HashMap<String, i64>,
    endpoints: HashMap<(Component, String), String>,
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a discoverable endpoint ahead of time (used by tests and the
    /// CLI dev harness in place of a `resources` table seeded by Terraform).
    pub async fn register_endpoint(&self, name: &str, component: Component, url: impl Into<String>) {
        let mut inner = self.inner.lock().await;
        inner
            .endpoints
            .insert((component, name.to_string()), url.into());
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn read(&self, name: &str, run_id: i64) -> Result<Option<State>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner.states.get(&(name.to_string(), run_id)).cloned())
    }

    async fn write(&self, state: &State) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        inner
            .states
            .insert((state.name.clone(), state.run_id), state.clone());
        Ok(())
    }

    async fn increment_id(&self, name: &str) -> Result<i64, StorageError> {
        let mut inner = self.inner.lock().await;
        let next = inner.next_id.entry(name.to_string()).or_insert(0);
        *next += 1;
        Ok(*next)
    }

    async fn get_endpoint(&self, name: &str, component: Component) -> Result<String, StorageError> {
        let inner = self.inner.lock().await;
        inner
            .endpoints
            .get(&(component, name.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::EndpointNotFound {
                component,
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Status;

    #[tokio::test]
    async fn increment_id_strictly_increases() {
        let storage = InMemoryStorage::new();
        let a = storage.increment_id("wf").await.unwrap();
        let b = storage.increment_id("wf").await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let storage = InMemoryStorage::new();
        let state = State::new("wf", 1);
        storage.write(&state).await.unwrap();
        let back = storage.read("wf", 1).await.unwrap().unwrap();
        assert_eq!(back.status, Status::InProcess);
    }

    #[tokio::test]
    async fn read_of_unknown_run_is_absent() {
        let storage = InMemoryStorage::new();
        assert!(storage.read("wf", 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn endpoint_lookup_fails_when_unregistered() {
        let storage = InMemoryStorage::new();
        assert!(storage.get_endpoint("wf", Component::InvocationQueue).await.is_err());
    }
}
