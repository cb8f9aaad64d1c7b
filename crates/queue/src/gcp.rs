//! `GcpPubSubSender` — documented stub.
//!
//! GCP message push is acknowledged but not actually implemented; this
//! sender keeps that shape explicit instead of silently returning `Ok(())`.

use async_trait::async_trait;

use crate::error::QueueError;
use crate::traits::QueueSender;

pub struct GcpPubSubSender;

#[async_trait]
impl QueueSender for GcpPubSubSender {
    async fn send(&self, _endpoint: &str, _body: String) -> Result<(), QueueError> {
        Err(QueueError::Unsupported("gcp pub/sub"))
    }
}
