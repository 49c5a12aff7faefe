//! Defines the endpoint for updating a user.

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    Error, PasswordHash,
    error::ErrorResponse,
    user::{User, UserId, UserResponse, UserState, core::map_user_row},
    validation::{ValidatedJson, ValidatedPath},
};

/// The request body for updating a user.
///
/// The username cannot be changed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    /// The user's first name.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub first_name: String,
    /// The user's last name.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub last_name: String,
    /// The user's new password in plain text.
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    #[schema(min_length = 8)]
    pub password: String,
}

/// A route handler that overwrites a user's names and password.
///
/// The new password is hashed before it is stored.
#[utoipa::path(
    put,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    request_body = EditUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Malformed body or invalid fields", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn edit_user_endpoint(
    State(state): State<UserState>,
    ValidatedPath(user_id): ValidatedPath<UserId>,
    ValidatedJson(request): ValidatedJson<EditUserRequest>,
) -> Result<Json<UserResponse>, Error> {
    let password_hash = PasswordHash::from_raw_password(&request.password, state.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = update_user(
        user_id,
        &request.first_name,
        &request.last_name,
        &password_hash,
        &connection,
    )?;

    Ok(Json(user.into()))
}

/// Overwrite the names and password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not belong to a registered user.
fn update_user(
    user_id: UserId,
    first_name: &str,
    last_name: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(
            "UPDATE user
            SET first_name = ?1, last_name = ?2, password = ?3
            WHERE id = ?4
            RETURNING id, username, first_name, last_name, password",
        )?
        .query_row(
            (
                first_name,
                last_name,
                password_hash.as_ref(),
                user_id.as_i64(),
            ),
            map_user_row,
        )
        .map_err(Error::from)
}
