//! Dormant-user sweep
//!
//! Marks every active user whose last login is older than the dormancy
//! window as dormant, all inside a single write scope: either every
//! candidate is switched or none is. A non-empty sweep is announced with an
//! event and, when a notifier is attached, an operator notification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::service_config::DORMANT_AFTER_DAYS;
use super::transaction::with_transaction;
use crate::domain::entities::{User, UserStatus};
use crate::domain::ports::{
    ContentEvent, EventPublisher, NotificationPort, TransactionManager, TransactionMode,
    UnitOfWork, USERS_TOPIC,
};
use crate::error::AppError;

pub struct UserBatchService<TM>
where
    TM: TransactionManager,
{
    transactions: Arc<TM>,
    events: Arc<dyn EventPublisher>,
    notifications: Option<Arc<dyn NotificationPort>>,
    dormant_after: Duration,
}

impl<TM> UserBatchService<TM>
where
    TM: TransactionManager,
{
    pub fn new(transactions: Arc<TM>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            transactions,
            events,
            notifications: None,
            dormant_after: Duration::days(DORMANT_AFTER_DAYS),
        }
    }

    /// Override the dormancy window
    pub fn with_dormant_after(mut self, dormant_after: Duration) -> Self {
        self.dormant_after = dormant_after;
        self
    }

    /// Send a summary to operators after each non-empty sweep
    pub fn with_notifications(mut self, notifications: Arc<dyn NotificationPort>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Sweep users idle for longer than the dormancy window. Returns how many were marked.
    pub async fn process_dormant_users(&self) -> Result<usize, AppError> {
        if self.dormant_after <= Duration::zero() {
            return Err(AppError::Internal(format!(
                "dormancy window must be positive, got {} days",
                self.dormant_after.num_days()
            )));
        }
        let threshold = Utc::now()
            .checked_sub_signed(self.dormant_after)
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "dormancy window of {} days is out of range",
                    self.dormant_after.num_days()
                ))
            })?;
        self.process_dormant_users_before(threshold).await
    }

    /// Sweep active users whose last login is strictly before `threshold`
    pub async fn process_dormant_users_before(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        let marked = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let targets: Vec<User> = uow
                        .users()
                        .find_by_last_login_before_and_status(threshold, UserStatus::Active)
                        .await?
                        .into_iter()
                        .filter(|user| user.is_dormant_candidate(threshold))
                        .collect();

                    for mut user in targets.iter().cloned() {
                        user.switch_to_dormant();
                        uow.users().save(&user).await?;
                    }

                    Ok::<_, AppError>(targets.len())
                })
            },
        )
        .await?;

        tracing::info!(marked, threshold = %threshold, "Processed users to dormant status");

        if marked > 0 {
            self.events.publish_async(
                USERS_TOPIC,
                None,
                ContentEvent::DormantSweepCompleted {
                    marked,
                    threshold,
                    occurred_at: Utc::now(),
                },
            );
            self.notify(&format!(
                "Dormant-user sweep marked {} user(s) dormant (last login before {})",
                marked,
                threshold.format("%Y-%m-%d %H:%M:%S UTC")
            ))
            .await;
        }

        Ok(marked)
    }

    async fn notify(&self, message: &str) {
        if let Some(notifications) = &self.notifications {
            if let Err(e) = notifications.send_notification(message).await {
                tracing::warn!(error = %e, "Failed to send sweep notification");
            }
        }
    }
}
