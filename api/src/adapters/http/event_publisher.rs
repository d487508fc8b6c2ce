//! HTTP event publisher
//!
//! Posts each event to `{base_url}/topics/{topic}` as a keyed record whose
//! value is the JSON-encoded event. Any 2xx response is an acknowledgement.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::ports::{ContentEvent, EventPublisher};
use crate::error::PublishError;

#[derive(Serialize)]
struct BrokerRecord<'a> {
    key: Option<&'a str>,
    value: String,
}

#[derive(Clone)]
pub struct HttpEventPublisher {
    http: Client,
    base_url: String,
}

impl HttpEventPublisher {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn topic_url(&self, topic: &str) -> String {
        format!("{}/topics/{}", self.base_url, topic)
    }

    async fn send(
        &self,
        topic: &str,
        key: Option<&str>,
        event: &ContentEvent,
    ) -> Result<(), PublishError> {
        let value = serde_json::to_string(event).map_err(|source| PublishError::Serialization {
            event_type: event.event_type(),
            source,
        })?;

        let response = self
            .http
            .post(self.topic_url(topic))
            .json(&BrokerRecord { key, value })
            .send()
            .await
            .map_err(|source| PublishError::Transport {
                topic: topic.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                status: status.as_u16(),
            });
        }

        tracing::debug!(topic = %topic, event_type = %event.event_type(), "Event published");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for HttpEventPublisher {
    async fn publish(
        &self,
        topic: &str,
        key: Option<&str>,
        event: &ContentEvent,
    ) -> Result<(), PublishError> {
        self.send(topic, key, event).await.inspect_err(|e| {
            tracing::error!(error = %e, topic = %topic, "Failed to publish event");
        })
    }

    fn publish_async(&self, topic: &str, key: Option<&str>, event: ContentEvent) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(error = %e, topic = %topic, "No runtime for async publish, event dropped");
                return;
            }
        };

        let publisher = self.clone();
        let topic = topic.to_string();
        let key = key.map(str::to_string);
        runtime.spawn(async move {
            if let Err(e) = publisher.send(&topic, key.as_deref(), &event).await {
                tracing::warn!(
                    error = %e,
                    topic = %topic,
                    event_type = %event.event_type(),
                    "Failed to publish async event"
                );
            }
        });
    }
}
