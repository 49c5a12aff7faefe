//! Endpoints for fetching one or all categories.

use axum::{Json, extract::State};

use crate::{
    Error,
    error::ErrorResponse,
    category::{Category, CategoryId, CategoryState, get_all_categories, get_category},
    validation::ValidatedPath,
};

/// Route handler that lists every category.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "Every category, ordered by ID", body = Vec<Category>),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(Json(categories))
}

/// Route handler that fetches a single category.
#[utoipa::path(
    get,
    path = "/categories/{category_id}",
    params(("category_id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "The category", body = Category),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    ValidatedPath(category_id): ValidatedPath<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    get_category(category_id, &connection).map(Json)
}

#[cfg(test)]
mod tests {
    use axum::extract::State;

    use crate::{
        Error,
        category::{
            DEFAULT_CATEGORIES, get_categories_endpoint, get_category_endpoint,
            must_create_test_state,
        },
        validation::ValidatedPath,
    };

    #[tokio::test]
    async fn lists_seeded_categories_in_order() {
        let state = must_create_test_state();

        let categories = get_categories_endpoint(State(state)).await.unwrap();

        let names: Vec<&str> = categories.0.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, DEFAULT_CATEGORIES);
    }

    #[tokio::test]
    async fn fetches_single_category() {
        let state = must_create_test_state();

        let category = get_category_endpoint(State(state), ValidatedPath(1)).await.unwrap();

        assert_eq!(category.0.name, "Groceries");
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let state = must_create_test_state();

        let result = get_category_endpoint(State(state), ValidatedPath(999)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
