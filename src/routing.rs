//! Application router configuration with protected and unprotected route definitions.

use std::any::Any;

use axum::{
    Json, Router,
    body::Body,
    http::{Response, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    ApiDoc, AppState, Error,
    auth::{Identity, log_in_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
        list_expenses_endpoint, update_expense_endpoint,
    },
    user::{
        create_user_endpoint, delete_user_endpoint, edit_user_endpoint, get_user_endpoint,
        get_users_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(
            endpoints::USERS,
            get(get_users_endpoint).post(create_user_endpoint),
        )
        .route(
            endpoints::USER,
            get(get_user_endpoint)
                .put(edit_user_endpoint)
                .delete(delete_user_endpoint),
        );

    let category_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        )
        .route_layer(middleware::from_extractor_with_state::<Identity, AppState>(
            state.clone(),
        ));

    // Expense handlers take the caller's `Identity` themselves to scope every query to the caller.
    let expense_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        );

    unprotected_routes
        .merge(category_routes)
        .merge(expense_routes)
        .merge(SwaggerUi::new(endpoints::DOCS).url(endpoints::OPENAPI, ApiDoc::openapi()))
        .fallback(get_404_not_found)
        .layer(CatchPanicLayer::custom(render_panic))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

/// Render a panic in a route handler as a generic internal server error.
fn render_panic(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let description = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("A route handler panicked: {description}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error." })),
    )
        .into_response()
}
