//! Category deletion endpoint.

use axum::{extract::State, http::StatusCode};

use crate::{
    Error,
    error::ErrorResponse,
    category::{CategoryId, CategoryState, delete_category},
    validation::ValidatedPath,
};

/// Handle a request to delete a category.
///
/// Categories that are still used by an expense are kept and the request
/// fails with [Error::CategoryInUse].
#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category is used by an expense", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    ValidatedPath(category_id): ValidatedPath<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_category(category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error, PasswordHash,
        category::{delete_category_endpoint, get_category, must_create_test_state},
        expense::{Amount, NewExpense, create_expense},
        user::{NewUser, create_user},
        validation::ValidatedPath,
    };

    #[tokio::test]
    async fn deletes_unused_category() {
        let state = must_create_test_state();

        let status = delete_category_endpoint(State(state.clone()), ValidatedPath(1))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NO_CONTENT);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_category(1, &connection), Err(Error::NotFound));
    }

    #[tokio::test]
    async fn refuses_to_delete_category_in_use() {
        let state = must_create_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let user = create_user(
                NewUser {
                    username: "alice".to_owned(),
                    first_name: "Alice".to_owned(),
                    last_name: "Liddell".to_owned(),
                    password_hash: PasswordHash::new_unchecked("hunter2"),
                },
                &connection,
            )
            .unwrap();
            create_expense(
                NewExpense {
                    name: "Coffee".to_owned(),
                    amount: Amount::new_unchecked(rust_decimal::Decimal::new(450, 2)),
                    purchase_date: date!(2024 - 03 - 01),
                    category_id: 1,
                    user_id: user.id,
                },
                &connection,
            )
            .unwrap();
        }

        let result = delete_category_endpoint(State(state.clone()), ValidatedPath(1)).await;

        assert_eq!(result, Err(Error::CategoryInUse));
        let connection = state.db_connection.lock().unwrap();
        assert!(get_category(1, &connection).is_ok());
    }

    #[tokio::test]
    async fn deleting_missing_category_is_not_found() {
        let state = must_create_test_state();

        let result = delete_category_endpoint(State(state), ValidatedPath(999)).await;

        assert_eq!(result, Err(Error::NotFound));
    }
}
