//! `queue` crate — the `QueueSender` trait and per-provider implementations.
//!
//! Every queue transport, real or test double, implements [`QueueSender`].
//! Callers pick a concrete sender once via [`sender_for`] instead of
//! scattering `match cloud { ... }` calls through business logic.

pub mod aws;
pub mod azure;
pub mod custom;
pub mod error;
pub mod gcp;
pub mod traits;

pub use aws::AwsSqsSender;
pub use azure::AzureServiceBusSender;
pub use custom::CustomSender;
pub use error::QueueError;
pub use gcp::GcpPubSubSender;
pub use traits::QueueSender;

use std::sync::Arc;

use model::Cloud;

/// Resolve a `Cloud` tag to the concrete sender for it.
///
/// `Gcp`/`Azure` construct their stub synchronously. `Aws` and `Custom` both
/// require a sender built ahead of time by the caller — `AwsSqsSender`
/// because SDK client construction is async (`AwsSqsSender::from_env`),
/// `Custom` because there is no default callback to fall back to.
pub fn sender_for(cloud: Cloud, supplied: Option<Arc<dyn QueueSender>>) -> Arc<dyn QueueSender> {
    match cloud {
        Cloud::Aws => supplied.expect("Cloud::Aws requires a sender built via AwsSqsSender::from_env"),
        Cloud::Gcp => Arc::new(GcpPubSubSender),
        Cloud::Azure => Arc::new(AzureServiceBusSender),
        Cloud::Custom => supplied.expect("Cloud::Custom requires a sender to be supplied"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Mutex;

    #[tokio::test]
    async fn custom_sender_records_calls() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sender = CustomSender::new(move |endpoint, body| {
            let seen = seen_clone.clone();
            async move {
                seen.lock().unwrap().push((endpoint, body));
                Ok(())
            }
            .boxed()
        });

        sender.send("queue://local", "hello".to_string()).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap()[0].1, "hello");
    }

    #[tokio::test]
    async fn gcp_sender_is_an_explicit_stub() {
        let sender = GcpPubSubSender;
        let err = sender.send("topic", "x".to_string()).await.unwrap_err();
        assert!(matches!(err, QueueError::Unsupported(_)));
    }

    #[test]
    fn sender_for_custom_returns_the_supplied_sender() {
        let custom: Arc<dyn QueueSender> = Arc::new(CustomSender::new(|_, _| async { Ok(()) }.boxed()));
        let resolved = sender_for(Cloud::Custom, Some(custom));
        assert!(Arc::strong_count(&resolved) >= 1);
    }
}
