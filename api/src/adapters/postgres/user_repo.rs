//! PostgreSQL adapter for UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::entities::{User, UserId, UserStatus};
use crate::domain::ports::UserRepository;
use crate::entity::users;
use crate::error::DomainError;

/// PostgreSQL implementation of UserRepository, bound to one transaction
pub struct PostgresUserRepository {
    txn: Arc<DatabaseTransaction>,
}

impl PostgresUserRepository {
    pub fn new(txn: Arc<DatabaseTransaction>) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<User, DomainError> {
        let model = match user.id() {
            None => {
                let now = Utc::now().fixed_offset();
                users::ActiveModel {
                    id: NotSet,
                    username: Set(user.username().to_string()),
                    email: Set(user.email().to_string()),
                    status: Set(user.status().to_string()),
                    last_login_at: Set(user.last_login_at().map(|at| at.fixed_offset())),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                }
                .insert(self.txn.as_ref())
                .await
            }
            Some(id) => {
                users::ActiveModel {
                    id: Set(id.0),
                    username: Set(user.username().to_string()),
                    email: Set(user.email().to_string()),
                    status: Set(user.status().to_string()),
                    last_login_at: Set(user.last_login_at().map(|at| at.fixed_offset())),
                    updated_at: Set(user.updated_at().map(|at| at.fixed_offset())),
                    ..Default::default()
                }
                .update(self.txn.as_ref())
                .await
            }
        }
        .map_err(|e| DomainError::Database(e.to_string()))?;

        model.try_into()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let result = users::Entity::find_by_id(id.0)
            .one(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(User::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(User::try_from).collect()
    }

    async fn delete_by_id(&self, id: &UserId) -> Result<(), DomainError> {
        users::Entity::delete_by_id(id.0)
            .exec(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }

    async fn find_by_last_login_before_and_status(
        &self,
        threshold: DateTime<Utc>,
        status: UserStatus,
    ) -> Result<Vec<User>, DomainError> {
        let results = users::Entity::find()
            .filter(users::Column::LastLoginAt.lt(threshold.fixed_offset()))
            .filter(users::Column::Status.eq(status.to_string()))
            .order_by_asc(users::Column::Id)
            .all(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        results.into_iter().map(User::try_from).collect()
    }
}

/// Convert SeaORM model to domain entity
impl TryFrom<users::Model> for User {
    type Error = DomainError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        let status: UserStatus = model
            .status
            .parse()
            .map_err(|e: String| DomainError::Database(e))?;

        Ok(User::reconstitute(
            UserId(model.id),
            model.username,
            model.email,
            status,
            model.last_login_at.map(|at| at.with_timezone(&Utc)),
            model.created_at.with_timezone(&Utc),
            model.updated_at.map(|at| at.with_timezone(&Utc)),
        ))
    }
}
