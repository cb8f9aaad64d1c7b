//! `AzureServiceBusSender` — documented stub, same rationale as `gcp.rs`.

use async_trait::async_trait;

use crate::error::QueueError;
use crate::traits::QueueSender;

pub struct AzureServiceBusSender;

#[async_trait]
impl QueueSender for AzureServiceBusSender {
    async fn send(&self, _endpoint: &str, _body: String) -> Result<(), QueueError> {
        Err(QueueError::Unsupported("azure service bus"))
    }
}
