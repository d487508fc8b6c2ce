//! Quillboard content service
//!
//! Users, posts and comments behind explicit transaction boundaries, with
//! cache, distributed lock and event publisher ports.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod entity;
pub mod error;
pub mod handlers;

#[cfg(test)]
mod test_utils;

use adapters::{HttpEventPublisher, InMemoryEventBus, LogNotifier, WebhookNotifier};
use app::{CommentService, PostService, UserService};
use config::Config;
use domain::ports::{CachePort, EventPublisher, NotificationPort, TransactionManager};

/// Application state shared across all handlers
pub struct AppState<TM>
where
    TM: TransactionManager,
{
    pub user_service: Arc<UserService<TM>>,
    pub post_service: Arc<PostService<TM>>,
    pub comment_service: Arc<CommentService<TM>>,
}

impl<TM: TransactionManager> Clone for AppState<TM> {
    fn clone(&self) -> Self {
        Self {
            user_service: self.user_service.clone(),
            post_service: self.post_service.clone(),
            comment_service: self.comment_service.clone(),
        }
    }
}

impl<TM: TransactionManager> AppState<TM> {
    /// Wire every service against one transaction manager, cache and publisher
    pub fn new(
        transactions: Arc<TM>,
        cache: Arc<dyn CachePort>,
        events: Arc<dyn EventPublisher>,
        config: &Config,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(transactions.clone(), events.clone())),
            post_service: Arc::new(
                PostService::new(transactions.clone(), cache, events.clone())
                    .with_cache_ttl(config.cache_ttl),
            ),
            comment_service: Arc::new(CommentService::new(transactions, events)),
        }
    }
}

/// Event publisher selected by configuration
pub fn event_publisher(config: &Config) -> Arc<dyn EventPublisher> {
    match &config.event_broker_url {
        Some(url) => {
            tracing::info!(broker = %url, "Publishing events over HTTP");
            Arc::new(HttpEventPublisher::new(url.clone()))
        }
        None => {
            tracing::info!("No event broker configured, events stay in memory");
            Arc::new(InMemoryEventBus::new())
        }
    }
}

/// Operator notifier selected by configuration
pub fn notifier(config: &Config) -> Arc<dyn NotificationPort> {
    match &config.notification_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier::new()),
    }
}

/// Build the HTTP router
pub fn router<TM>(state: AppState<TM>) -> Router
where
    TM: TransactionManager + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/users",
            post(handlers::create_user::<TM>).get(handlers::list_users::<TM>),
        )
        .route(
            "/users/:id",
            get(handlers::get_user::<TM>)
                .put(handlers::update_user::<TM>)
                .delete(handlers::delete_user::<TM>),
        )
        .route("/users/:id/login", post(handlers::record_login::<TM>))
        .route("/users/:id/withdraw", post(handlers::withdraw_user::<TM>))
        .route("/users/:id/posts", get(handlers::list_posts_by_author::<TM>))
        .route(
            "/posts",
            post(handlers::create_post::<TM>).get(handlers::list_posts::<TM>),
        )
        .route(
            "/posts/:id",
            get(handlers::get_post::<TM>)
                .put(handlers::update_post::<TM>)
                .delete(handlers::delete_post::<TM>),
        )
        .route(
            "/posts/:id/comments",
            get(handlers::list_comments_by_post::<TM>),
        )
        .route("/comments", post(handlers::create_comment::<TM>))
        .route(
            "/comments/:id",
            get(handlers::get_comment::<TM>)
                .put(handlers::update_comment::<TM>)
                .delete(handlers::delete_comment::<TM>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
