//! Comment service

use std::sync::Arc;

use chrono::Utc;

use super::commands::{CreateCommentCommand, UpdateCommentCommand};
use super::dto::CommentDto;
use super::transaction::with_transaction;
use crate::domain::entities::{Comment, CommentId, PostId};
use crate::domain::ports::{
    ContentEvent, EventPublisher, TransactionManager, TransactionMode, UnitOfWork, COMMENTS_TOPIC,
};
use crate::error::AppError;

pub struct CommentService<TM>
where
    TM: TransactionManager,
{
    transactions: Arc<TM>,
    events: Arc<dyn EventPublisher>,
}

impl<TM> CommentService<TM>
where
    TM: TransactionManager,
{
    pub fn new(transactions: Arc<TM>, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            transactions,
            events,
        }
    }

    pub async fn create_comment(
        &self,
        command: CreateCommentCommand,
    ) -> Result<CommentDto, AppError> {
        let input = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let comment =
                        Comment::new(&input.content, Some(input.post_id), Some(input.author_id))?;
                    Ok::<_, AppError>(uow.comments().save(&comment).await?)
                })
            },
        )
        .await?;

        if let Some(id) = saved.id() {
            self.events.publish_async(
                COMMENTS_TOPIC,
                Some(&id.to_string()),
                ContentEvent::CommentAdded {
                    comment_id: id,
                    post_id: saved.post_id(),
                    author_id: saved.author_id(),
                    occurred_at: Utc::now(),
                },
            );
        }

        Ok(CommentDto::from(&saved))
    }

    pub async fn update_comment(
        &self,
        command: UpdateCommentCommand,
    ) -> Result<CommentDto, AppError> {
        let (id, content) = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let mut comment = uow
                        .comments()
                        .find_by_id(&id)
                        .await?
                        .ok_or_else(|| AppError::not_found("Comment", id.0))?;
                    comment.update_content(&content)?;
                    Ok::<_, AppError>(uow.comments().save(&comment).await?)
                })
            },
        )
        .await?;

        self.events.publish_async(
            COMMENTS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::CommentEdited {
                comment_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(CommentDto::from(&saved))
    }

    pub async fn get_comment_by_id(&self, id: CommentId) -> Result<CommentDto, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            move |uow| {
                Box::pin(async move {
                    uow.comments()
                        .find_by_id(&id)
                        .await?
                        .map(|comment| CommentDto::from(&comment))
                        .ok_or_else(|| AppError::not_found("Comment", id.0))
                })
            },
        )
        .await
    }

    pub async fn get_comments_by_post_id(
        &self,
        post_id: PostId,
    ) -> Result<Vec<CommentDto>, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            move |uow| {
                Box::pin(async move {
                    let comments = uow.comments().find_by_post(&post_id).await?;
                    Ok::<_, AppError>(comments.iter().map(CommentDto::from).collect())
                })
            },
        )
        .await
    }

    pub async fn delete_comment(&self, id: CommentId) -> Result<(), AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    if uow.comments().find_by_id(&id).await?.is_none() {
                        return Err(AppError::not_found("Comment", id.0));
                    }
                    uow.comments().delete_by_id(&id).await?;
                    Ok(())
                })
            },
        )
        .await?;

        self.events.publish_async(
            COMMENTS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::CommentDeleted {
                comment_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEventBus, InMemoryStore, InMemoryTransactionManager};
    use crate::domain::entities::UserId;
    use crate::test_utils::stored_comment;

    fn service(store: &InMemoryStore) -> (CommentService<InMemoryTransactionManager>, InMemoryEventBus) {
        let bus = InMemoryEventBus::new();
        let service = CommentService::new(
            Arc::new(store.transaction_manager()),
            Arc::new(bus.clone()),
        );
        (service, bus)
    }

    #[tokio::test]
    async fn create_comment_keeps_references() {
        let store = InMemoryStore::new();
        let (service, bus) = service(&store);

        let dto = service
            .create_comment(CreateCommentCommand {
                content: Some("Nice".to_string()),
                post_id: Some(3),
                author_id: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(dto.post_id, 3);
        assert_eq!(dto.author_id, 2);
        assert!(dto.id.is_some());
        assert!(matches!(
            bus.events(COMMENTS_TOPIC)[0].event,
            ContentEvent::CommentAdded { post_id: PostId(3), author_id: UserId(2), .. }
        ));
    }

    #[tokio::test]
    async fn missing_post_id_is_reported_before_storage() {
        let store = InMemoryStore::new();
        let (service, _) = service(&store);

        let err = service
            .create_comment(CreateCommentCommand {
                content: Some("Nice".to_string()),
                post_id: None,
                author_id: Some(2),
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("postId"));
        assert_eq!(store.repository_calls(), 0);
    }

    #[tokio::test]
    async fn oversize_comment_is_rejected() {
        let store = InMemoryStore::new();
        let (service, _) = service(&store);

        let err = service
            .create_comment(CreateCommentCommand {
                content: Some("x".repeat(1_001)),
                post_id: Some(1),
                author_id: Some(1),
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("content"));
    }

    #[tokio::test]
    async fn update_comment_changes_content_only() {
        let store = InMemoryStore::new().with_comment(stored_comment(4, 1, 2, "First"));
        let (service, _) = service(&store);

        let dto = service
            .update_comment(UpdateCommentCommand {
                id: Some(4),
                content: Some("Edited".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(dto.content, "Edited");
        assert_eq!(dto.post_id, 1);
        assert_eq!(dto.author_id, 2);
    }

    #[tokio::test]
    async fn update_missing_comment_is_not_found() {
        let (service, _) = service(&InMemoryStore::new());

        let err = service
            .update_comment(UpdateCommentCommand {
                id: Some(4),
                content: Some("Edited".to_string()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { resource: "Comment", id: 4 }));
    }

    #[tokio::test]
    async fn comments_listed_by_post() {
        let store = InMemoryStore::new()
            .with_comment(stored_comment(1, 10, 1, "a"))
            .with_comment(stored_comment(2, 11, 1, "b"))
            .with_comment(stored_comment(3, 10, 2, "c"));
        let (service, _) = service(&store);

        let ids: Vec<_> = service
            .get_comments_by_post_id(PostId(10))
            .await
            .unwrap()
            .into_iter()
            .filter_map(|c| c.id)
            .collect();

        assert_eq!(ids, vec![1, 3]);
        assert!(service
            .get_comments_by_post_id(PostId(99))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn delete_comment_then_missing() {
        let store = InMemoryStore::new().with_comment(stored_comment(4, 1, 2, "Bye"));
        let (service, bus) = service(&store);

        service.delete_comment(CommentId(4)).await.unwrap();

        assert!(matches!(
            service.get_comment_by_id(CommentId(4)).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_comment(CommentId(4)).await,
            Err(AppError::NotFound { resource: "Comment", id: 4 })
        ));
        assert_eq!(bus.events(COMMENTS_TOPIC).len(), 1);
    }
}
