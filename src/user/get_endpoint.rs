//! Defines the endpoints for fetching one or all users.

use axum::{Json, extract::State};

use crate::{
    Error,
    error::ErrorResponse,
    user::{UserId, UserResponse, UserState, get_all_users, get_user_by_id},
    validation::ValidatedPath,
};

/// A route handler that lists every registered user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Every registered user", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_users_endpoint(
    State(state): State<UserState>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let users = get_all_users(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve users: {error}"))?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// A route handler that fetches a single user.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 400, description = "The user ID is not a number", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    ValidatedPath(user_id): ValidatedPath<UserId>,
) -> Result<Json<UserResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;

    Ok(Json(user.into()))
}
