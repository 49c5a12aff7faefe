//! This file defines the route for exchanging a username and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    AppState, Error, auth::TokenConfig, error::ErrorResponse, password::dummy_verify,
    user::get_user_by_username, validation::ValidatedJson,
};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config for signing tokens.
    pub token_config: TokenConfig,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_config: state.token_config.clone(),
        }
    }
}

/// The request body for logging in.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogInRequest {
    /// The name the user registered with. Case is ignored.
    #[schema(example = "alice")]
    #[validate(length(min = 1, message = "must not be empty"))]
    pub username: String,
    /// The user's password.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

/// The response body for a successful log in.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogInResponse {
    /// The bearer token to send with requests to protected routes.
    pub token: String,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// Responds with [Error::InvalidCredentials] for both an unknown username and
/// a wrong password. Both cases take roughly the same time.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LogInRequest,
    responses(
        (status = 200, description = "Logged in", body = LogInResponse),
        (status = 400, description = "Malformed body or empty fields", body = ErrorResponse),
        (status = 401, description = "Unknown username or wrong password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn log_in_endpoint(
    State(state): State<LogInState>,
    ValidatedJson(request): ValidatedJson<LogInRequest>,
) -> Result<Json<LogInResponse>, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&request.username, &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => return Err(error),
        }
    };

    let Some(user) = user else {
        dummy_verify(&request.password);
        tracing::info!("Log in attempt for unknown user {}", request.username);
        return Err(Error::InvalidCredentials);
    };

    if !user.password_hash.verify(&request.password) {
        tracing::info!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = state.token_config.issue(&user)?;
    tracing::debug!("Issued token for user {}", user.id);

    Ok(Json(LogInResponse { token }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash,
        auth::{Identity, LogInRequest, LogInState, TokenConfig, log_in_endpoint},
        initialize_db,
        user::{NewUser, User, create_user},
        validation::ValidatedJson,
    };

    fn get_state() -> (LogInState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user = create_user(
            NewUser {
                username: "alice".to_owned(),
                first_name: "Alice".to_owned(),
                last_name: "Liddell".to_owned(),
                password_hash: PasswordHash::from_raw_password("password123", 4).unwrap(),
            },
            &connection,
        )
        .unwrap();

        let state = LogInState {
            db_connection: Arc::new(Mutex::new(connection)),
            token_config: TokenConfig::new(
                b"a test signing key that is at least 32 bytes",
                "expense-tracker",
                "expense-tracker",
            ),
        };

        (state, user)
    }

    fn request(username: &str, password: &str) -> ValidatedJson<LogInRequest> {
        ValidatedJson(LogInRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    #[tokio::test]
    async fn correct_password_yields_token_for_user() {
        let (state, user) = get_state();

        let response = log_in_endpoint(State(state.clone()), request("alice", "password123"))
            .await
            .unwrap();

        let claims = state.token_config.validate(&response.0.token).unwrap();
        let identity = Identity::try_from(claims).unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.first_name, "Alice");
        assert_eq!(identity.last_name, "Liddell");
    }

    #[tokio::test]
    async fn username_is_case_insensitive() {
        let (state, _) = get_state();

        let result = log_in_endpoint(State(state), request("ALICE", "password123")).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_the_same_way() {
        let (state, _) = get_state();

        let wrong_password =
            log_in_endpoint(State(state.clone()), request("alice", "wrongpassword")).await;
        let unknown_user = log_in_endpoint(State(state), request("bob", "password123")).await;

        assert_eq!(wrong_password.unwrap_err(), Error::InvalidCredentials);
        assert_eq!(unknown_user.unwrap_err(), Error::InvalidCredentials);
    }
}
