//! Category creation endpoint.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};

use crate::{
    Error,
    category::{Category, CategoryRequest, CategoryState, create_category},
    endpoints,
    error::ErrorResponse,
    validation::ValidatedJson,
};

/// Handle a request to create a category.
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category,
            headers(("Location" = String, description = "The URI of the new category"))),
        (status = 400, description = "Malformed body or invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 409, description = "Category name already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<impl IntoResponse, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = create_category(&request.name, request.description.as_deref(), &connection)?;
    let location = endpoints::format_endpoint(endpoints::CATEGORY, category.id.into());

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(category)))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::State,
        http::{StatusCode, header::LOCATION},
        response::IntoResponse,
    };

    use crate::{
        Error,
        category::{
            CategoryRequest, DEFAULT_CATEGORIES, create_category_endpoint, get_category,
            must_create_test_state,
        },
        validation::ValidatedJson,
    };

    #[tokio::test]
    async fn creates_category() {
        let state = must_create_test_state();
        let request = CategoryRequest {
            name: "Rent".to_owned(),
            description: Some("Monthly rent".to_owned()),
        };

        let response = create_category_endpoint(State(state.clone()), ValidatedJson(request))
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        let want_id = DEFAULT_CATEGORIES.len() as i32 + 1;
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            &format!("/categories/{want_id}")
        );
        let connection = state.db_connection.lock().unwrap();
        let category = get_category(want_id, &connection).unwrap();
        assert_eq!(category.name, "Rent");
    }

    #[tokio::test]
    async fn rejects_seeded_name() {
        let state = must_create_test_state();
        let request = CategoryRequest {
            name: "groceries".to_owned(),
            description: None,
        };

        let result = create_category_endpoint(State(state), ValidatedJson(request)).await;

        assert!(matches!(result, Err(Error::DuplicateCategoryName(name)) if name == "groceries"));
    }
}
