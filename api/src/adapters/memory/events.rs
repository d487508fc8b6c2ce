//! In-memory event bus
//!
//! Records every published event in order. Useful as the default publisher
//! when no broker is configured and as a probe in tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{ContentEvent, EventPublisher};
use crate::error::PublishError;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub topic: String,
    pub key: Option<String>,
    pub event: ContentEvent,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventBus {
    published: Arc<Mutex<Vec<PublishedEvent>>>,
    unavailable: bool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A bus whose broker is down: `publish` fails, `publish_async` drops events
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Events published on `topic`, in publish order
    pub fn events(&self, topic: &str) -> Vec<PublishedEvent> {
        self.lock()
            .iter()
            .filter(|p| p.topic == topic)
            .cloned()
            .collect()
    }

    pub fn all(&self) -> Vec<PublishedEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PublishedEvent>> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, topic: &str, key: Option<&str>, event: ContentEvent) -> Result<(), PublishError> {
        if self.unavailable {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
                status: 503,
            });
        }
        self.lock().push(PublishedEvent {
            topic: topic.to_string(),
            key: key.map(str::to_string),
            event,
        });
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(
        &self,
        topic: &str,
        key: Option<&str>,
        event: &ContentEvent,
    ) -> Result<(), PublishError> {
        self.record(topic, key, event.clone())
    }

    fn publish_async(&self, topic: &str, key: Option<&str>, event: ContentEvent) {
        let event_type = event.event_type();
        if let Err(e) = self.record(topic, key, event) {
            tracing::warn!(
                error = %e,
                topic = %topic,
                event_type = %event_type,
                "Failed to publish event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::entities::PostId;
    use crate::domain::ports::POSTS_TOPIC;

    fn deleted(id: i64) -> ContentEvent {
        ContentEvent::PostDeleted {
            post_id: PostId(id),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_per_topic_in_order() {
        let bus = InMemoryEventBus::new();

        bus.publish(POSTS_TOPIC, Some("1"), &deleted(1)).await.unwrap();
        bus.publish_async("users", None, deleted(9));
        bus.publish_async(POSTS_TOPIC, Some("2"), deleted(2));

        let keys: Vec<_> = bus
            .events(POSTS_TOPIC)
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(keys, vec![Some("1".to_string()), Some("2".to_string())]);
        assert_eq!(bus.all().len(), 3);
    }

    #[tokio::test]
    async fn unavailable_bus_fails_sync_and_swallows_async() {
        let bus = InMemoryEventBus::unavailable();

        let result = bus.publish(POSTS_TOPIC, None, &deleted(1)).await;
        bus.publish_async(POSTS_TOPIC, None, deleted(2));

        assert!(matches!(result, Err(PublishError::Rejected { status: 503, .. })));
        assert!(bus.all().is_empty());
    }
}
