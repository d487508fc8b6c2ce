//! Post handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::app::{CommentDto, CreatePostCommand, PostDto, UpdatePostCommand};
use crate::domain::entities::PostId;
use crate::domain::ports::TransactionManager;
use crate::error::AppError;
use crate::AppState;

/// POST /posts
pub async fn create_post<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    body: Result<Json<CreatePostCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<PostDto>), AppError> {
    let Json(command) = body?;
    let post = state.post_service.create_post(command).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /posts
pub async fn list_posts<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
) -> Result<Json<Vec<PostDto>>, AppError> {
    Ok(Json(state.post_service.get_all_posts().await?))
}

/// GET /posts/:id
///
/// Served from the post cache when present.
pub async fn get_post<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.post_service.get_post_by_id(PostId(id)).await?))
}

/// PUT /posts/:id
pub async fn update_post<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdatePostCommand>, JsonRejection>,
) -> Result<Json<PostDto>, AppError> {
    let Path(id) = id?;
    let Json(mut command) = body?;
    command.id = Some(id);
    Ok(Json(state.post_service.update_post(command).await?))
}

/// DELETE /posts/:id
pub async fn delete_post<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.post_service.delete_post(PostId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /posts/:id/comments
pub async fn list_comments_by_post<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<CommentDto>>, AppError> {
    let Path(id) = id?;
    Ok(Json(
        state
            .comment_service
            .get_comments_by_post_id(PostId(id))
            .await?,
    ))
}
