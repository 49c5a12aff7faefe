//! Defines the endpoint for recording a new expense.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};

use crate::{
    Error,
    auth::Identity,
    endpoints,
    error::ErrorResponse,
    expense::{Expense, ExpenseRequest, ExpenseState, create_expense},
    user::get_user_by_id,
    validation::ValidatedJson,
};

/// A route handler for recording an expense for the caller.
///
/// Responds with 201 Created and the location of the new expense. A token
/// whose user has since been deleted gets 404 Not Found.
#[utoipa::path(
    post,
    path = "/expenses",
    request_body = ExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = Expense,
            headers(("Location" = String, description = "The URI of the new expense"))),
        (status = 400, description = "Malformed body, invalid fields or unknown category", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "The token's user no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "expenses"
)]
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    identity: Identity,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> Result<impl IntoResponse, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(identity.user_id, &connection).inspect_err(|error| {
        tracing::info!(
            "Could not find user {} while creating an expense: {error}",
            identity.user_id
        )
    })?;

    let expense = create_expense(request.into_new_expense(user.id), &connection)?;
    let location = endpoints::format_endpoint(endpoints::EXPENSE, expense.id);

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(expense)))
}
