//! The OpenAPI document for the REST API, served with Swagger UI.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    auth::{LogInRequest, LogInResponse},
    category::{Category, CategoryRequest},
    error::ErrorResponse,
    expense::{Expense, ExpenseFilter, ExpenseRequest},
    user::{UserResponse, create_endpoint::CreateUserRequest, edit_endpoint::EditUserRequest},
    validation::FieldErrors,
};

/// OpenAPI documentation for every route in [crate::build_router].
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::log_in::log_in_endpoint,
        crate::user::get_endpoint::get_users_endpoint,
        crate::user::create_endpoint::create_user_endpoint,
        crate::user::get_endpoint::get_user_endpoint,
        crate::user::edit_endpoint::edit_user_endpoint,
        crate::user::delete_endpoint::delete_user_endpoint,
        crate::category::list::get_categories_endpoint,
        crate::category::create::create_category_endpoint,
        crate::category::list::get_category_endpoint,
        crate::category::edit::update_category_endpoint,
        crate::category::delete::delete_category_endpoint,
        crate::expense::get_endpoint::list_expenses_endpoint,
        crate::expense::create_endpoint::create_expense_endpoint,
        crate::expense::get_endpoint::get_expense_endpoint,
        crate::expense::edit_endpoint::update_expense_endpoint,
        crate::expense::delete_endpoint::delete_expense_endpoint,
    ),
    components(
        schemas(
            LogInRequest,
            LogInResponse,
            UserResponse,
            CreateUserRequest,
            EditUserRequest,
            Category,
            CategoryRequest,
            Expense,
            ExpenseRequest,
            ExpenseFilter,
            ErrorResponse,
            FieldErrors,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Exchanging credentials for a bearer token"),
        (name = "users", description = "Registering and managing users"),
        (name = "categories", description = "The shared categories expenses are filed under"),
        (name = "expenses", description = "The caller's own expenses"),
    ),
    info(
        title = "Expense Tracker API",
        description = "REST API for recording personal expenses",
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme used by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();

        let mut paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        paths.sort_unstable();

        assert_eq!(
            paths,
            [
                "/auth/login",
                "/categories",
                "/categories/{category_id}",
                "/expenses",
                "/expenses/{expense_id}",
                "/users",
                "/users/{user_id}",
            ]
        );
    }

    #[test]
    fn registers_bearer_scheme() {
        let doc = ApiDoc::openapi();

        let schemes = doc
            .components
            .as_ref()
            .map(|components| components.security_schemes.keys().cloned().collect::<Vec<_>>());

        assert_eq!(schemes, Some(vec!["bearer_auth".to_owned()]));
    }
}
