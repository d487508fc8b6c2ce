//! Notification port
//!
//! Short human-readable messages for operators, e.g. a batch summary.
//! Delivery is best effort: callers log failures and carry on.

use async_trait::async_trait;

use crate::error::NotificationError;

#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn send_notification(&self, message: &str) -> Result<(), NotificationError>;
}
