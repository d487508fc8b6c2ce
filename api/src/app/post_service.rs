//! Post service
//!
//! Single-post reads go through the cache (`post:{id}`). Writes evict the
//! cached entry after their scope commits. Cache failures are logged and
//! never fail a use case.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::commands::{CreatePostCommand, UpdatePostCommand};
use super::dto::PostDto;
use super::service_config::post_cache_key;
use super::transaction::with_transaction;
use crate::domain::entities::{Post, PostId, UserId};
use crate::domain::ports::{
    CacheExt, CachePort, ContentEvent, EventPublisher, TransactionManager, TransactionMode,
    UnitOfWork, POSTS_TOPIC,
};
use crate::error::AppError;

pub struct PostService<TM>
where
    TM: TransactionManager,
{
    transactions: Arc<TM>,
    cache: Arc<dyn CachePort>,
    events: Arc<dyn EventPublisher>,
    cache_ttl: Option<Duration>,
}

impl<TM> PostService<TM>
where
    TM: TransactionManager,
{
    pub fn new(
        transactions: Arc<TM>,
        cache: Arc<dyn CachePort>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            transactions,
            cache,
            events,
            cache_ttl: None,
        }
    }

    /// Expiry for cached posts; the cache's default applies otherwise
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub async fn create_post(&self, command: CreatePostCommand) -> Result<PostDto, AppError> {
        let input = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let post = Post::new(&input.title, &input.content, Some(input.author_id))?;
                    Ok::<_, AppError>(uow.posts().save(&post).await?)
                })
            },
        )
        .await?;

        if let Some(id) = saved.id() {
            tracing::info!(post_id = %id, author_id = %saved.author_id(), "Published post");
            self.events.publish_async(
                POSTS_TOPIC,
                Some(&id.to_string()),
                ContentEvent::PostPublished {
                    post_id: id,
                    author_id: saved.author_id(),
                    title: saved.title().to_string(),
                    occurred_at: Utc::now(),
                },
            );
        }

        Ok(PostDto::from(&saved))
    }

    pub async fn update_post(&self, command: UpdatePostCommand) -> Result<PostDto, AppError> {
        let (id, title, content) = command.validate()?;

        let saved = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    let mut post = uow
                        .posts()
                        .find_by_id(&id)
                        .await?
                        .ok_or_else(|| AppError::not_found("Post", id.0))?;
                    post.update_content(&title, &content)?;
                    Ok::<_, AppError>(uow.posts().save(&post).await?)
                })
            },
        )
        .await?;

        self.evict(id).await;
        self.events.publish_async(
            POSTS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::PostEdited {
                post_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(PostDto::from(&saved))
    }

    /// Cache-aside read of a single post
    pub async fn get_post_by_id(&self, id: PostId) -> Result<PostDto, AppError> {
        let key = post_cache_key(id);

        match self.cache.get_json::<PostDto>(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(key = %key, "Post cache hit");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, key = %key, "Post cache read failed"),
        }

        let dto = with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            move |uow| {
                Box::pin(async move {
                    uow.posts()
                        .find_by_id(&id)
                        .await?
                        .map(|post| PostDto::from(&post))
                        .ok_or_else(|| AppError::not_found("Post", id.0))
                })
            },
        )
        .await?;

        if let Err(e) = self.cache.put_json(&key, &dto, self.cache_ttl).await {
            tracing::warn!(error = %e, key = %key, "Post cache write failed");
        }

        Ok(dto)
    }

    pub async fn get_all_posts(&self) -> Result<Vec<PostDto>, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            |uow| {
                Box::pin(async move {
                    let posts = uow.posts().find_all().await?;
                    Ok::<_, AppError>(posts.iter().map(PostDto::from).collect())
                })
            },
        )
        .await
    }

    pub async fn get_posts_by_author(&self, author_id: UserId) -> Result<Vec<PostDto>, AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadOnly,
            move |uow| {
                Box::pin(async move {
                    let posts = uow.posts().find_by_author(&author_id).await?;
                    Ok::<_, AppError>(posts.iter().map(PostDto::from).collect())
                })
            },
        )
        .await
    }

    pub async fn delete_post(&self, id: PostId) -> Result<(), AppError> {
        with_transaction(
            self.transactions.as_ref(),
            TransactionMode::ReadWrite,
            move |uow| {
                Box::pin(async move {
                    if uow.posts().find_by_id(&id).await?.is_none() {
                        return Err(AppError::not_found("Post", id.0));
                    }
                    uow.posts().delete_by_id(&id).await?;
                    Ok(())
                })
            },
        )
        .await?;

        self.evict(id).await;
        tracing::info!(post_id = %id, "Deleted post");
        self.events.publish_async(
            POSTS_TOPIC,
            Some(&id.to_string()),
            ContentEvent::PostDeleted {
                post_id: id,
                occurred_at: Utc::now(),
            },
        );

        Ok(())
    }

    async fn evict(&self, id: PostId) {
        let key = post_cache_key(id);
        if let Err(e) = self.cache.evict(&key).await {
            tracing::warn!(error = %e, key = %key, "Post cache eviction failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryCache, InMemoryEventBus, InMemoryStore, InMemoryTransactionManager,
    };
    use crate::test_utils::{stored_post, FailingCache, SpyTransactionManager};

    struct Fixture {
        service: PostService<SpyTransactionManager<InMemoryTransactionManager>>,
        transactions: Arc<SpyTransactionManager<InMemoryTransactionManager>>,
        cache: Arc<InMemoryCache>,
        bus: InMemoryEventBus,
    }

    fn fixture(store: &InMemoryStore) -> Fixture {
        let transactions = Arc::new(SpyTransactionManager::new(store.transaction_manager()));
        let cache = Arc::new(InMemoryCache::default());
        let bus = InMemoryEventBus::new();
        let service = PostService::new(transactions.clone(), cache.clone(), Arc::new(bus.clone()));
        Fixture {
            service,
            transactions,
            cache,
            bus,
        }
    }

    fn create(title: &str, content: &str, author_id: Option<i64>) -> CreatePostCommand {
        CreatePostCommand {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            author_id,
        }
    }

    #[tokio::test]
    async fn create_post_assigns_id_and_created_at() {
        let store = InMemoryStore::new();
        let f = fixture(&store);

        let dto = f
            .service
            .create_post(create("Hi", "World", Some(1)))
            .await
            .unwrap();

        assert!(dto.id.is_some());
        assert!(dto.created_at.is_some());
        assert_eq!(dto.author_id, 1);
        assert_eq!(f.bus.events(POSTS_TOPIC).len(), 1);
    }

    #[tokio::test]
    async fn empty_title_is_a_validation_error_on_title() {
        let store = InMemoryStore::new();
        let f = fixture(&store);

        let err = f
            .service
            .create_post(create("", "World", Some(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.field(), Some("title"));
        assert!(f.service.get_all_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_author_never_reaches_storage() {
        let store = InMemoryStore::new();
        let f = fixture(&store);

        let err = f
            .service
            .create_post(create("Hi", "World", None))
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("authorId"));
        assert_eq!(f.transactions.begins(), 0);
        assert_eq!(store.repository_calls(), 0);
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let store = InMemoryStore::new().with_post(stored_post(5, 1, "Cached"));
        let f = fixture(&store);

        let first = f.service.get_post_by_id(PostId(5)).await.unwrap();
        let begins_after_first = f.transactions.begins();
        let second = f.service.get_post_by_id(PostId(5)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(begins_after_first, 1);
        assert_eq!(f.transactions.begins(), 1);
        assert!(f.cache.exists("post:5").await.unwrap());
    }

    #[tokio::test]
    async fn update_evicts_cached_post() {
        let store = InMemoryStore::new().with_post(stored_post(5, 1, "Before"));
        let f = fixture(&store);
        f.service.get_post_by_id(PostId(5)).await.unwrap();

        f.service
            .update_post(UpdatePostCommand {
                id: Some(5),
                title: Some("After".to_string()),
                content: Some("New body".to_string()),
            })
            .await
            .unwrap();

        assert!(!f.cache.exists("post:5").await.unwrap());
        assert_eq!(f.service.get_post_by_id(PostId(5)).await.unwrap().title, "After");
    }

    #[tokio::test]
    async fn rejected_update_keeps_stored_post() {
        let store = InMemoryStore::new().with_post(stored_post(5, 1, "Before"));
        let f = fixture(&store);

        let err = f
            .service
            .update_post(UpdatePostCommand {
                id: Some(5),
                title: Some("After".to_string()),
                content: Some(" ".to_string()),
            })
            .await
            .unwrap_err();

        assert_eq!(err.field(), Some("content"));
        assert_eq!(f.service.get_post_by_id(PostId(5)).await.unwrap().title, "Before");
        assert!(f.bus.all().is_empty());
    }

    #[tokio::test]
    async fn delete_evicts_and_then_reads_are_not_found() {
        let store = InMemoryStore::new().with_post(stored_post(5, 1, "Doomed"));
        let f = fixture(&store);
        f.service.get_post_by_id(PostId(5)).await.unwrap();

        f.service.delete_post(PostId(5)).await.unwrap();

        assert!(!f.cache.exists("post:5").await.unwrap());
        assert!(matches!(
            f.service.get_post_by_id(PostId(5)).await,
            Err(AppError::NotFound { resource: "Post", id: 5 })
        ));
    }

    #[tokio::test]
    async fn delete_missing_post_is_not_found() {
        let store = InMemoryStore::new();
        let f = fixture(&store);

        let err = f.service.delete_post(PostId(8)).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { resource: "Post", id: 8 }));
    }

    #[tokio::test]
    async fn posts_by_author_filters() {
        let store = InMemoryStore::new()
            .with_post(stored_post(1, 1, "Mine"))
            .with_post(stored_post(2, 2, "Theirs"))
            .with_post(stored_post(3, 1, "Also mine"));
        let f = fixture(&store);

        let titles: Vec<_> = f
            .service
            .get_posts_by_author(UserId(1))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();

        assert_eq!(titles, vec!["Mine", "Also mine"]);
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_storage() {
        let store = InMemoryStore::new().with_post(stored_post(5, 1, "Stored"));
        let service = PostService::new(
            Arc::new(store.transaction_manager()),
            Arc::new(FailingCache),
            Arc::new(InMemoryEventBus::new()),
        );

        let dto = service.get_post_by_id(PostId(5)).await.unwrap();
        service.delete_post(PostId(5)).await.unwrap();

        assert_eq!(dto.title, "Stored");
    }
}
