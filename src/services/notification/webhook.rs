//! Delivers rendered messages as JSON to an HTTP endpoint (an email/SMS relay).

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use tracing::debug;

use super::{MessageChannel, NotifyError, OutboundMessage};

const CHANNEL: &str = "webhook";

#[derive(Clone)]
pub struct WebhookChannel {
    client: Client,
    url: Arc<str>,
}

impl WebhookChannel {
    /// Build a channel posting to `url`.
    pub fn new(url: &str) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .build()
            .map_err(|source| NotifyError::Delivery {
                channel: CHANNEL,
                source: Box::new(source),
            })?;
        Ok(Self {
            client,
            url: Arc::from(url.trim()),
        })
    }
}

impl MessageChannel for WebhookChannel {
    fn deliver(&self, message: OutboundMessage) -> BoxFuture<'static, Result<(), NotifyError>> {
        let channel = self.clone();
        Box::pin(async move {
            let response = channel
                .client
                .post(channel.url.as_ref())
                .json(&message)
                .send()
                .await
                .map_err(|source| NotifyError::Delivery {
                    channel: CHANNEL,
                    source: Box::new(source),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(NotifyError::Rejected {
                    channel: CHANNEL,
                    status: status.as_u16(),
                });
            }

            debug!(kind = %message.kind, to = %message.to_email, "notification posted to webhook");
            Ok(())
        })
    }
}
