//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{category::CategoryId, user::UserId, validation::FieldErrors};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields in the request failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The request body, query string or path could not be parsed.
    #[error("malformed request: {0}")]
    MalformedBody(String),

    /// The request body is longer than the given number of bytes.
    #[error("the request body is larger than {0} bytes")]
    PayloadTooLarge(usize),

    /// The username and password did not match a registered user.
    ///
    /// The same error is used for an unknown username and a wrong password so
    /// that clients cannot find out which usernames are registered.
    #[error("incorrect username or password")]
    InvalidCredentials,

    /// The bearer token is missing, malformed, expired or was signed for
    /// someone else.
    #[error("missing or invalid bearer token")]
    InvalidToken,

    /// The token could not be signed.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The user provided a password that does not meet the length requirement.
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    /// Expenses owned by another user are reported as not found too.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The username is already registered.
    #[error("the username \"{0}\" is already taken")]
    DuplicateUsername(String),

    /// A category with the same name already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category cannot be deleted while expenses still refer to it.
    #[error("the category is still used by one or more expenses")]
    CategoryInUse,

    /// The category ID used for an expense does not refer to a category.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The user ID used for an expense does not refer to a registered user.
    #[error("the user ID {0} does not refer to a valid user")]
    InvalidUser(UserId),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// A description of what went wrong that is safe to show to the client.
    #[schema(example = "One or more fields are invalid.")]
    pub error: String,
    /// Validation messages keyed by field name, for 400 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }

    fn invalid_fields(fields: FieldErrors) -> Self {
        Self {
            error: "One or more fields are invalid.".to_owned(),
            fields: Some(fields),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Validation(fields) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::invalid_fields(fields))
            }
            Error::MalformedBody(description) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("The request could not be parsed: {description}")),
            ),
            Error::PasswordTooShort(_) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(self.to_string()))
            }
            Error::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new(self.to_string()),
            ),
            Error::InvalidCategory(category_id) => {
                let mut fields = FieldErrors::default();
                fields.add(
                    "categoryId",
                    &format!("Could not find a category with the ID {category_id}."),
                );

                (StatusCode::BAD_REQUEST, ErrorResponse::invalid_fields(fields))
            }
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("Incorrect username or password."),
            ),
            Error::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new("A valid bearer token is required."),
            ),
            // Respond with 404 not found so that clients cannot learn whether another user's resource exists.
            Error::NotFound | Error::InvalidUser(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("The requested resource could not be found."),
            ),
            Error::DuplicateUsername(_)
            | Error::DuplicateCategoryName(_)
            | Error::CategoryInUse => (StatusCode::CONFLICT, ErrorResponse::new(self.to_string())),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error."),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, error::ErrorResponse, user::UserId, validation::FieldErrors};

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn status_codes_follow_error_taxonomy() {
        let cases = [
            (
                Error::Validation(FieldErrors::default()),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::MalformedBody("eof".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (Error::InvalidCategory(42), StatusCode::BAD_REQUEST),
            (Error::PayloadTooLarge(1024), StatusCode::PAYLOAD_TOO_LARGE),
            (Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (Error::InvalidToken, StatusCode::UNAUTHORIZED),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (Error::InvalidUser(UserId::new(1)), StatusCode::NOT_FOUND),
            (
                Error::DuplicateUsername("alice".to_owned()),
                StatusCode::CONFLICT,
            ),
            (
                Error::DuplicateCategoryName("Groceries".to_owned()),
                StatusCode::CONFLICT,
            ),
            (Error::CategoryInUse, StatusCode::CONFLICT),
            (Error::DatabaseLockError, StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::HashingError("boom".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, want_status) in cases {
            let description = error.to_string();
            let response = error.into_response();

            assert_eq!(
                response.status(),
                want_status,
                "got status {} for error \"{description}\", want {want_status}",
                response.status()
            );
        }
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let mut fields = FieldErrors::default();
        fields.add("amount", "must be greater than zero");

        let response = Error::Validation(fields).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(body.error, "One or more fields are invalid.");
        assert_eq!(
            body.fields.and_then(|fields| fields.get("amount").map(<[String]>::to_vec)),
            Some(vec!["must be greater than zero".to_owned()])
        );
    }

    #[tokio::test]
    async fn other_errors_have_no_fields() {
        let response = Error::NotFound.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert!(body["error"].is_string());
        assert!(body.get("fields").is_none());
    }
}

