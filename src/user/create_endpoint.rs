//! Defines the endpoint for registering a new user.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    Error, PasswordHash, endpoints,
    error::ErrorResponse,
    user::{NewUser, UserResponse, UserState, create_user},
    validation::ValidatedJson,
};

/// The request body for registering a user.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "username": "alice",
    "firstName": "Alice",
    "lastName": "Smith",
    "password": "password123"
}))]
pub struct CreateUserRequest {
    /// The unique name the user logs in with.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub username: String,
    /// The user's first name.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub first_name: String,
    /// The user's last name.
    #[validate(length(min = 1, max = 64, message = "must be between 1 and 64 characters long"))]
    pub last_name: String,
    /// The user's password in plain text.
    #[validate(length(min = 8, message = "must be at least 8 characters long"))]
    #[schema(min_length = 8)]
    pub password: String,
}

/// A route handler for registering a new user.
///
/// Responds with 201 Created, the location of the new user and the user
/// without their password hash.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse,
            headers(("Location" = String, description = "The URI of the new user"))),
        (status = 400, description = "Malformed body or invalid fields", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, Error> {
    let password_hash = PasswordHash::from_raw_password(&request.password, state.password_cost)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = create_user(
        NewUser {
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
        },
        &connection,
    )?;

    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    let location = endpoints::format_endpoint(endpoints::USER, user.id.as_i64());

    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(UserResponse::from(user)),
    ))
}
