//! PostgreSQL adapter for PostRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::entities::{Post, PostId, UserId};
use crate::domain::ports::PostRepository;
use crate::entity::posts;
use crate::error::DomainError;

/// PostgreSQL implementation of PostRepository, bound to one transaction
pub struct PostgresPostRepository {
    txn: Arc<DatabaseTransaction>,
}

impl PostgresPostRepository {
    pub fn new(txn: Arc<DatabaseTransaction>) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn save(&self, post: &Post) -> Result<Post, DomainError> {
        let model = match post.id() {
            None => {
                let now = Utc::now().fixed_offset();
                posts::ActiveModel {
                    id: NotSet,
                    title: Set(post.title().to_string()),
                    content: Set(post.content().to_string()),
                    author_id: Set(post.author_id().0),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                }
                .insert(self.txn.as_ref())
                .await
            }
            Some(id) => {
                posts::ActiveModel {
                    id: Set(id.0),
                    title: Set(post.title().to_string()),
                    content: Set(post.content().to_string()),
                    author_id: Set(post.author_id().0),
                    updated_at: Set(post.updated_at().map(|at| at.fixed_offset())),
                    ..Default::default()
                }
                .update(self.txn.as_ref())
                .await
            }
        }
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let result = posts::Entity::find_by_id(id.0)
            .one(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_all(&self) -> Result<Vec<Post>, DomainError> {
        let results = posts::Entity::find()
            .order_by_asc(posts::Column::Id)
            .all(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn find_by_author(&self, author_id: &UserId) -> Result<Vec<Post>, DomainError> {
        let results = posts::Entity::find()
            .filter(posts::Column::AuthorId.eq(author_id.0))
            .order_by_asc(posts::Column::Id)
            .all(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn delete_by_id(&self, id: &PostId) -> Result<(), DomainError> {
        posts::Entity::delete_by_id(id.0)
            .exec(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<posts::Model> for Post {
    fn from(model: posts::Model) -> Self {
        Post::reconstitute(
            PostId(model.id),
            model.title,
            model.content,
            UserId(model.author_id),
            model.created_at.with_timezone(&Utc),
            model.updated_at.map(|at| at.with_timezone(&Utc)),
        )
    }
}
