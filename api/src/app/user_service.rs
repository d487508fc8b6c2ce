//! User service
//!
//! Registration, profile updates, logins and withdrawal. Each operation runs
//! in its own transaction scope; events go out only after the scope commits.

use std::sync::Arc;

use chrono::Utc;

use super::commands::{CreateUserCommand, UpdateUserCommand};
use super::dto::UserDto;
use super::transaction::with_transaction;
use crate::domain::entities::{User, UserId};
use crate::domain::ports::{
    ContentEvent, EventPublisher, TransactionManager, TransactionMode, UnitOfWork, USERS_TOPIC,
};
use crate::error::AppError;

/// Service for managing users
pub struct UserService<TM>
where
    TM: TransactionManager,
{
    transactions: Arc<TM>,
    events: Arc<dyn EventPublisher>,
}

impl<TM> UserService<TM>
where
    TM: TransactionManager,
{
    pub fn new(transactions: Arc<TM>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            transactions,
            events,
        }
    }

    /// Register a new user
    pub async fn create_user(&self, command: CreateUserCommand) -> Result<UserDto, AppError> {
        let (username, email) = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let user = User::new(&username, &email)?;
                    Ok::<_, AppError>(uow.users().save(&user).await?)
                })
            },
        )
        .await?;

        if let Some(id) = saved.id() {
            tracing::info!(user_id = %id, username = %saved.username(), "Registered user");
            self.events.publish_async(
                USERS_TOPIC,
                Some(&id.to_string()),
                ContentEvent::UserRegistered {
                    user_id: id,
                    username: saved.username().to_string(),
                    occurred_at: Utc::now(),
                },
            );
        }

        Ok(UserDto::from(&saved))
    }

    /// Replace a user's username and email
    pub async fn update_user(&self, command: UpdateUserCommand) -> Result<UserDto, AppError> {
        let (id, username, email) = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let mut user = uow
                        .users()
                        .find_by_id(&id)
                        .await?
                        .ok_or_else(|| AppError::not_found("User", id.0))?;
                    user.update_profile(&username, &email)?;
                    Ok::<_, AppError>(uow.users().save(&user).await?)
                })
            },
        )
        .await?;

        self.events.publish_async(
            USERS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::UserProfileUpdated {
                user_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(UserDto::from(&saved))
    }

    pub async fn get_user_by_id(&self, id: UserId) -> Result<UserDto, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            move |uow| {
                Box::pin(async move {
                    uow.users()
                        .find_by_id(&id)
                        .await?
                        .map(|user| UserDto::from(&user))
                        .ok_or_else(|| AppError::not_found("User", id.0))
                })
            },
        )
        .await
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserDto>, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            |uow| {
                Box::pin(async move {
                    let users = uow.users().find_all().await?;
                    Ok::<_, AppError>(users.iter().map(UserDto::from).collect())
                })
            },
        )
        .await
    }

    /// Hard-delete a user. Missing ids are reported as not found.
    pub async fn delete_user(&self, id: UserId) -> Result<(), AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    if uow.users().find_by_id(&id).await?.is_none() {
                        return Err(AppError::not_found("User", id.0));
                    }
                    uow.users().delete_by_id(&id).await?;
                    Ok(())
                })
            },
        )
        .await?;

        tracing::info!(user_id = %id, "Deleted user");
        self.events.publish_async(
            USERS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::UserDeleted {
                user_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(())
    }

    /// Record a login; a dormant user becomes active again
    pub async fn record_login(&self, id: UserId) -> Result<UserDto, AppError> {
        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let mut user = uow
                        .users()
                        .find_by_id(&id)
                        .await?
                        .ok_or_else(|| AppError::not_found("User", id.0))?;
                    user.login();
                    Ok::<_, AppError>(uow.users().save(&user).await?)
                })
            },
        )
        .await?;

        tracing::debug!(user_id = %id, status = %saved.status(), "Recorded login");
        Ok(UserDto::from(&saved))
    }

    /// Soft-delete: the user is kept with status `DELETED`
    pub async fn withdraw(&self, id: UserId) -> Result<UserDto, AppError> {
        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let mut user = uow
                        .users()
                        .find_by_id(&id)
                        .await?
                        .ok_or_else(|| AppError::not_found("User", id.0))?;
                    user.withdraw();
                    Ok::<_, AppError>(uow.users().save(&user).await?)
                })
            },
        )
        .await?;

        tracing::info!(user_id = %id, "User has been withdrawn");
        self.events.publish_async(
            USERS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::UserWithdrawn {
                user_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(UserDto::from(&saved))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::adapters::memory::{InMemoryEventBus, InMemoryStore, InMemoryTransactionManager};
    use crate::domain::entities::UserStatus;
    use crate::test_utils::{stored_user, stored_user_last_seen, SpyTransactionManager};

    fn service(store: &InMemoryStore) -> (UserService<InMemoryTransactionManager>, InMemoryEventBus) {
        let bus = InMemoryEventBus::new();
        let service = UserService::new(
            Arc::new(store.transaction_manager()),
            Arc::new(bus.clone()),
        );
        (service, bus)
    }

    fn create(username: &str, email: &str) -> CreateUserCommand {
        CreateUserCommand {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
        }
    }

    #[tokio::test]
    async fn create_user_persists_and_publishes() {
        let store = InMemoryStore::new();
        let (service, bus) = service(&store);

        let dto = service
            .create_user(create("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(dto.id, Some(1));
        assert_eq!(dto.status, UserStatus::Active);
        assert!(dto.created_at.is_some());
        assert!(dto.last_login_at.is_some());

        let events = bus.events(USERS_TOPIC);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key.as_deref(), Some("1"));
        assert!(matches!(
            events[0].event,
            ContentEvent::UserRegistered { user_id: UserId(1), .. }
        ));
    }

    #[tokio::test]
    async fn malformed_command_never_opens_a_scope() {
        let store = InMemoryStore::new();
        let spy = Arc::new(SpyTransactionManager::new(store.transaction_manager()));
        let service = UserService::new(spy.clone(), Arc::new(InMemoryEventBus::new()));

        let err = service
            .create_user(CreateUserCommand {
                username: Some("alice".to_string()),
                email: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("email"));
        assert_eq!(spy.begins(), 0);
        assert_eq!(store.repository_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_username_is_a_validation_error_and_nothing_is_stored() {
        let store = InMemoryStore::new();
        let (service, bus) = service(&store);

        let err = service
            .create_user(create("ab", "ab@example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.field(), Some("username"));
        assert!(service.get_all_users().await.unwrap().is_empty());
        assert!(bus.all().is_empty());
    }

    #[tokio::test]
    async fn update_user_replaces_profile() {
        let store = InMemoryStore::new().with_user(stored_user(1, "alice"));
        let (service, _) = service(&store);

        let dto = service
            .update_user(UpdateUserCommand {
                id: Some(1),
                username: Some("alicia".to_string()),
                email: Some("alicia@example.com".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(dto.username, "alicia");
        assert_eq!(
            service.get_user_by_id(UserId(1)).await.unwrap().email,
            "alicia@example.com"
        );
    }

    #[tokio::test]
    async fn update_user_with_bad_email_changes_nothing() {
        let store = InMemoryStore::new().with_user(stored_user(1, "alice"));
        let (service, bus) = service(&store);

        let err = service
            .update_user(UpdateUserCommand {
                id: Some(1),
                username: Some("alicia".to_string()),
                email: Some("not-an-email".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("email"));
        assert_eq!(service.get_user_by_id(UserId(1)).await.unwrap().username, "alice");
        assert!(bus.all().is_empty());
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let store = InMemoryStore::new();
        let (service, _) = service(&store);

        let err = service
            .update_user(UpdateUserCommand {
                id: Some(5),
                username: Some("alice".to_string()),
                email: Some("alice@example.com".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { resource: "User", id: 5 }));
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let (service, _) = service(&InMemoryStore::new());

        let err = service.get_user_by_id(UserId(3)).await.unwrap_err();

        assert_eq!(err.to_string(), "User with id 3 not found");
    }

    #[tokio::test]
    async fn delete_user_removes_it() {
        let store = InMemoryStore::new().with_user(stored_user(1, "alice"));
        let (service, bus) = service(&store);

        service.delete_user(UserId(1)).await.unwrap();

        assert!(matches!(
            service.get_user_by_id(UserId(1)).await,
            Err(AppError::NotFound { .. })
        ));
        assert_eq!(bus.events(USERS_TOPIC).len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let (service, bus) = service(&InMemoryStore::new());

        let err = service.delete_user(UserId(42)).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { resource: "User", id: 42 }));
        assert!(bus.all().is_empty());
    }

    #[tokio::test]
    async fn login_reactivates_dormant_user() {
        let long_ago = Utc::now() - Duration::days(500);
        let store = InMemoryStore::new().with_user(stored_user_last_seen(
            1,
            "sleepy",
            Some(long_ago),
            UserStatus::Dormant,
        ));
        let (service, _) = service(&store);

        let dto = service.record_login(UserId(1)).await.unwrap();

        assert_eq!(dto.status, UserStatus::Active);
        assert!(dto.last_login_at.unwrap() > long_ago);
    }

    #[tokio::test]
    async fn login_leaves_withdrawn_user_deleted() {
        let store = InMemoryStore::new().with_user(stored_user_last_seen(
            1,
            "gone",
            None,
            UserStatus::Deleted,
        ));
        let (service, _) = service(&store);

        let dto = service.record_login(UserId(1)).await.unwrap();

        assert_eq!(dto.status, UserStatus::Deleted);
        assert!(dto.last_login_at.is_some());
    }

    #[tokio::test]
    async fn withdraw_soft_deletes_and_publishes() {
        let store = InMemoryStore::new().with_user(stored_user(1, "alice"));
        let (service, bus) = service(&store);

        let dto = service.withdraw(UserId(1)).await.unwrap();

        assert_eq!(dto.status, UserStatus::Deleted);
        assert_eq!(
            service.get_user_by_id(UserId(1)).await.unwrap().status,
            UserStatus::Deleted
        );
        assert!(matches!(
            bus.events(USERS_TOPIC)[0].event,
            ContentEvent::UserWithdrawn { .. }
        ));
    }

    #[tokio::test]
    async fn broker_outage_does_not_fail_the_use_case() {
        let store = InMemoryStore::new();
        let service = UserService::new(
            Arc::new(store.transaction_manager()),
            Arc::new(InMemoryEventBus::unavailable()),
        );

        let dto = service
            .create_user(create("alice", "alice@example.com"))
            .await
            .unwrap();

        assert_eq!(service.get_user_by_id(UserId(dto.id.unwrap())).await.unwrap().username, "alice");
    }
}
