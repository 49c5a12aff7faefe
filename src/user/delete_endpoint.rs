//! Defines the endpoint for deleting a user.

use axum::{extract::State, http::StatusCode};
use rusqlite::Connection;

use crate::{
    Error,
    error::ErrorResponse,
    user::{UserId, UserState},
    validation::ValidatedPath,
};

/// A route handler for deleting a user and, through the foreign key cascade,
/// all of their expenses.
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User and their expenses deleted"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn delete_user_endpoint(
    State(state): State<UserState>,
    ValidatedPath(user_id): ValidatedPath<UserId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match delete_user(user_id, &connection)? {
        0 => Err(Error::NotFound),
        _ => {
            tracing::info!("Deleted user {user_id}");
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

type RowsAffected = usize;

fn delete_user(user_id: UserId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM user WHERE id = :id", &[(":id", &user_id.as_i64())])
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        Error, PasswordHash, initialize_db,
        user::{NewUser, UserId, UserState, create_user, delete_user_endpoint, get_user_by_id},
        validation::ValidatedPath,
    };

    fn get_state() -> UserState {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();

        UserState {
            db_connection: Arc::new(Mutex::new(connection)),
            password_cost: 4,
        }
    }

    #[tokio::test]
    async fn deletes_user() {
        let state = get_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            create_user(
                NewUser {
                    username: "alice".to_owned(),
                    first_name: "Alice".to_owned(),
                    last_name: "Liddell".to_owned(),
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                },
                &connection,
            )
            .unwrap()
        };

        let status = delete_user_endpoint(State(state.clone()), ValidatedPath(user.id))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_user_by_id(user.id, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn deleting_missing_user_is_not_found() {
        let state = get_state();

        let result = delete_user_endpoint(State(state), ValidatedPath(UserId::new(42))).await;

        assert_eq!(result, Err(Error::NotFound));
    }
}
