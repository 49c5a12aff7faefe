//! Category update endpoint.

use axum::{Json, extract::State};

use crate::{
    Error,
    error::ErrorResponse,
    category::{Category, CategoryId, CategoryRequest, CategoryState, update_category},
    validation::{ValidatedJson, ValidatedPath},
};

/// Handle a request to replace a category's name and description.
#[utoipa::path(
    put,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Malformed body or invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 409, description = "Category name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    ValidatedPath(category_id): ValidatedPath<CategoryId>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<Json<Category>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    update_category(
        category_id,
        &request.name,
        request.description.as_deref(),
        &connection,
    )
    .map(Json)
}
