//! Log-only notifier
//!
//! Used when no webhook is configured. Every message goes to the log and is
//! kept so tests can inspect what was sent.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::NotificationPort;
use crate::error::NotificationError;

#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    sent: Arc<Mutex<Vec<String>>>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn send_notification(&self, message: &str) -> Result<(), NotificationError> {
        tracing::info!(message = %message, "Notification");
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_messages_in_order_across_clones() {
        let notifier = LogNotifier::new();
        let handle = notifier.clone();

        notifier.send_notification("first").await.unwrap();
        handle.send_notification("second").await.unwrap();

        assert_eq!(notifier.messages(), vec!["first", "second"]);
    }
}
