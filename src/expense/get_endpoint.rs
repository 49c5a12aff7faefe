//! Defines the endpoints for fetching the caller's expenses.

use axum::{Json, extract::State};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::Identity,
    error::ErrorResponse,
    expense::{
        Expense, ExpenseId, ExpenseQuery, ExpenseState, ListExpensesParams, get_expense,
        query_expenses,
    },
    validation::{ValidatedPath, ValidatedQuery},
};

/// A route handler that returns one page of the caller's expenses.
///
/// Relative filters are computed from today's date in UTC.
#[utoipa::path(
    get,
    path = "/expenses",
    params(ListExpensesParams),
    responses(
        (status = 200, description = "One page of the caller's expenses, ordered by ID", body = Vec<Expense>),
        (status = 400, description = "Invalid query string", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    identity: Identity,
    ValidatedQuery(params): ValidatedQuery<ListExpensesParams>,
) -> Result<Json<Vec<Expense>>, Error> {
    let today = OffsetDateTime::now_utc().date();
    let query = ExpenseQuery::new(identity.user_id, params, &state.pagination_config, today)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = query_expenses(&query, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;

    Ok(Json(expenses))
}

/// A route handler that returns a single expense owned by the caller.
#[utoipa::path(
    get,
    path = "/expenses/{expense_id}",
    params(("expense_id" = i64, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "The expense", body = Expense),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "No expense with this ID belongs to the caller", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    identity: Identity,
    ValidatedPath(expense_id): ValidatedPath<ExpenseId>,
) -> Result<Json<Expense>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_expense(expense_id, identity.user_id, &connection).map(Json)
}
