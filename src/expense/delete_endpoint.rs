//! Defines the endpoint for deleting an expense.

use axum::{extract::State, http::StatusCode};

use crate::{
    Error,
    auth::Identity,
    error::ErrorResponse,
    expense::{ExpenseId, ExpenseState, delete_expense},
    validation::ValidatedPath,
};

/// A route handler for deleting an expense owned by the caller.
#[utoipa::path(
    delete,
    path = "/expenses/{expense_id}",
    params(("expense_id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No expense with this ID belongs to the caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    identity: Identity,
    ValidatedPath(expense_id): ValidatedPath<ExpenseId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_expense(expense_id, identity.user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
