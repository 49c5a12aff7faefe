//! Defines the endpoint for replacing an expense.

use axum::{Json, extract::State};

use crate::{
    Error,
    auth::Identity,
    error::ErrorResponse,
    expense::{Expense, ExpenseId, ExpenseRequest, ExpenseState, update_expense},
    validation::{ValidatedJson, ValidatedPath},
};

/// A route handler that overwrites an expense owned by the caller.
///
/// Another user's expense is reported as not found.
#[utoipa::path(
    put,
    path = "/expenses/{expense_id}",
    params(("expense_id" = i64, Path, description = "Expense ID")),
    request_body = ExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = Expense),
        (status = 400, description = "Malformed body, invalid fields or unknown category", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No expense with this ID belongs to the caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    identity: Identity,
    ValidatedPath(expense_id): ValidatedPath<ExpenseId>,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> Result<Json<Expense>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_expense(
        expense_id,
        request.into_new_expense(identity.user_id),
        &connection,
    )
    .map(Json)
}
