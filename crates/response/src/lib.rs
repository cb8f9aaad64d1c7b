//! `response` crate — builds and sends the message that reports a workflow
//! or task outcome back onto the invocation queue.
//!
//! `add_body()` must be called before `send()`, and `added_context` is
//! merged into the outgoing `cache` field, not the top level.

pub mod error;

pub use error::ResponseError;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use model::{Cloud, Component, Context};
use queue::QueueSender;
use storage::Storage;

/// Builds and sends a `Context`-shaped message to a workflow's invocation
/// queue. Construction resolves the endpoint eagerly so a misconfigured
/// `Resource` table fails fast, before the caller does any work assuming the
/// send will succeed.
pub struct Response {
    #[allow(dead_code)]
    cloud: Cloud,
    sender: Arc<dyn QueueSender>,
    workflow_name: String,
    endpoint: String,
    context: Context,
    body: Option<Value>,
}

impl Response {
    pub async fn new(
        cloud: Cloud,
        storage: Arc<dyn Storage>,
        sender: Arc<dyn QueueSender>,
        workflow_name: impl Into<String>,
        context: Context,
    ) -> Result<Self, ResponseError> {
        let workflow_name = workflow_name.into();
        let endpoint = storage
            .get_endpoint(&workflow_name, Component::InvocationQueue)
            .await?;
        Ok(Self {
            cloud,
            sender,
            workflow_name,
            endpoint,
            context,
            body: None,
        })
    }

    /// Must be called before `send()`. `added_context` is merged into the
    /// outgoing message's `cache` field; it does not replace the context's
    /// own cache, it layers on top.
    pub fn add_body(&mut self, added_context: HashMap<String, Value>) -> &mut Self {
        let mut wire = self.context.to_wire();
        if let Some(obj) = wire.as_object_mut() {
            let mut cache = self.context.cache.clone();
            for (k, v) in added_context {
                cache.insert(k, v);
            }
            obj.insert("cache".to_string(), serde_json::to_value(cache).expect("cache serializes"));
        }
        self.body = Some(wire);
        self
    }

    #[instrument(skip(self), fields(workflow = %self.workflow_name))]
    pub async fn send(&self) -> Result<(), ResponseError> {
        let body = self.body.as_ref().ok_or(ResponseError::BodyNotBuilt)?;
        self.sender.send(&self.endpoint, body.to_string()).await?;
        Ok(())
    }
}

/// A `Response` preconfigured to start a new run: `ids = [-1,-1,-1]`, all
/// three outcome flags `true`.
pub struct Trigger;

impl Trigger {
    pub async fn new(
        cloud: Cloud,
        storage: Arc<dyn Storage>,
        sender: Arc<dyn QueueSender>,
        workflow_name: impl Into<String>,
    ) -> Result<Response, ResponseError> {
        let context = Context::new_sentinel(None);
        let mut response = Response::new(cloud, storage, sender, workflow_name, context).await?;
        response.add_body(HashMap::new());
        Ok(response)
    }
}
