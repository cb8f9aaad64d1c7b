//! The `QueueSender` trait — the contract every queue transport must fulfil.

use async_trait::async_trait;

use crate::QueueError;

/// Sends one message body to a resolved endpoint URL.
///
/// `endpoint` is whatever `Storage::get_endpoint` returned — a queue URL, a
/// topic ARN, whatever the provider needs; `QueueSender` implementations
/// don't interpret it beyond handing it to their SDK client.
#[async_trait]
pub trait QueueSender: Send + Sync {
    async fn send(&self, endpoint: &str, body: String) -> Result<(), QueueError>;
}
