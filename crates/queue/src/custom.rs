//! `CustomSender` — a test double and bring-your-own-transport escape hatch.

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::QueueError;
use crate::traits::QueueSender;

type Callback = dyn Fn(String, String) -> BoxFuture<'static, Result<(), QueueError>> + Send + Sync;

/// Wraps a plain closure as a `QueueSender`. Used in unit tests (to assert on
/// what would have been sent) and by the CLI dev harness (to loop a message
/// straight back into the local handler instead of a real queue).
pub struct CustomSender {
    callback: Box<Callback>,
}

impl CustomSender {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(String, String) -> BoxFuture<'static, Result<(), QueueError>> + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

#[async_trait]
impl QueueSender for CustomSender {
    async fn send(&self, endpoint: &str, body: String) -> Result<(), QueueError> {
        (self.callback)(endpoint.to_string(), body).await
    }
}
