//! `AwsSqsSender` — the one real cloud transport this crate ships.
//!
//! Batching is disabled here by design: one `send_message` call per
//! `QueueSender::send`, since one queue message always corresponds to
//! exactly one task run.

use async_trait::async_trait;
use aws_sdk_sqs::Client;

use crate::error::QueueError;
use crate::traits::QueueSender;

pub struct AwsSqsSender {
    client: Client,
}

impl AwsSqsSender {
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: Client::new(&config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueSender for AwsSqsSender {
    async fn send(&self, endpoint: &str, body: String) -> Result<(), QueueError> {
        self.client
            .send_message()
            .queue_url(endpoint)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Transport {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?;
        Ok(())
    }
}
