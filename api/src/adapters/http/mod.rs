//! HTTP adapters

mod event_publisher;
mod webhook_notifier;

pub use event_publisher::HttpEventPublisher;
pub use webhook_notifier::WebhookNotifier;
