//! PostgreSQL adapter for CommentRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::entities::{Comment, CommentId, PostId, UserId};
use crate::domain::ports::CommentRepository;
use crate::entity::comments;
use crate::error::DomainError;

pub struct PostgresCommentRepository {
    txn: Arc<DatabaseTransaction>,
}

impl PostgresCommentRepository {
    pub fn new(txn: Arc<DatabaseTransaction>) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<Comment, DomainError> {
        let model = match comment.id() {
            None => {
                let now = Utc::now().fixed_offset();
                comments::ActiveModel {
                    id: NotSet,
                    content: Set(comment.content().to_string()),
                    post_id: Set(comment.post_id().0),
                    author_id: Set(comment.author_id().0),
                    created_at: Set(now),
                    updated_at: Set(Some(now)),
                }
                .insert(self.txn.as_ref())
                .await
            }
            Some(id) => {
                comments::ActiveModel {
                    id: Set(id.0),
                    content: Set(comment.content().to_string()),
                    updated_at: Set(comment.updated_at().map(|at| at.fixed_offset())),
                    ..Default::default()
                }
                .update(self.txn.as_ref())
                .await
            }
        }
        .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, DomainError> {
        let result = comments::Entity::find_by_id(id.0)
            .one(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }

    async fn find_by_post(&self, post_id: &PostId) -> Result<Vec<Comment>, DomainError> {
        let results = comments::Entity::find()
            .filter(comments::Column::PostId.eq(post_id.0))
            .order_by_asc(comments::Column::Id)
            .all(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(results.into_iter().map(|m| m.into()).collect())
    }

    async fn delete_by_id(&self, id: &CommentId) -> Result<(), DomainError> {
        comments::Entity::delete_by_id(id.0)
            .exec(self.txn.as_ref())
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Convert SeaORM model to domain entity
impl From<comments::Model> for Comment {
    fn from(model: comments::Model) -> Self {
        Comment::reconstitute(
            CommentId(model.id),
            model.content,
            PostId(model.post_id),
            UserId(model.author_id),
            model.created_at.with_timezone(&Utc),
            model.updated_at.map(|at| at.with_timezone(&Utc)),
        )
    }
}
