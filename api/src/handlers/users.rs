//! User handlers
//!
//! Registration, profile edits, login tracking, withdrawal and removal.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};

use crate::app::{CreateUserCommand, PostDto, UpdateUserCommand, UserDto};
use crate::domain::entities::UserId;
use crate::domain::ports::TransactionManager;
use crate::error::AppError;
use crate::AppState;

/// POST /users
pub async fn create_user<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    body: Result<Json<CreateUserCommand>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), AppError> {
    let Json(command) = body?;
    let user = state.user_service.create_user(command).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
pub async fn list_users<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
) -> Result<Json<Vec<UserDto>>, AppError> {
    Ok(Json(state.user_service.get_all_users().await?))
}

/// GET /users/:id
pub async fn get_user<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.user_service.get_user_by_id(UserId(id)).await?))
}

/// PUT /users/:id
///
/// The path id wins over any id in the body.
pub async fn update_user<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserCommand>, JsonRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = id?;
    let Json(mut command) = body?;
    command.id = Some(id);
    Ok(Json(state.user_service.update_user(command).await?))
}

/// DELETE /users/:id
pub async fn delete_user<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    state.user_service.delete_user(UserId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/:id/login
pub async fn record_login<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.user_service.record_login(UserId(id)).await?))
}

/// POST /users/:id/withdraw
pub async fn withdraw_user<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.user_service.withdraw(UserId(id)).await?))
}

/// GET /users/:id/posts
pub async fn list_posts_by_author<TM: TransactionManager + 'static>(
    State(state): State<AppState<TM>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<PostDto>>, AppError> {
    let Path(id) = id?;
    Ok(Json(
        state.post_service.get_posts_by_author(UserId(id)).await?,
    ))
}
