//! Comment handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::app::{CommentDto, CreateCommentCommand, UpdateCommentCommand};
use crate::domain::entities::CommentId;
use crate::domain::ports::TransactionManager;
use crate::error::AppError;
use crate::AppState;

/// POST /comments
pub async fn create_comment<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    body: Result<Json<CreateCommentCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<CommentDto>), AppError> {
    let Json(command) = body?;
    let comment = state.comment_service.create_comment(command).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /comments/:id
pub async fn get_comment<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CommentDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(
        state.comment_service.get_comment_by_id(CommentId(id)).await?,
    ))
}

/// PUT /comments/:id
pub async fn update_comment<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateCommentCommand>, JsonRejection>,
) -> Result<Json<CommentDto>, AppError> {
    let Path(id) = id?;
    let Json(mut command) = body?;
    command.id = Some(id);
    Ok(Json(state.comment_service.update_comment(command).await?))
}

/// DELETE /comments/:id
pub async fn delete_comment<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.comment_service.delete_comment(CommentId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
