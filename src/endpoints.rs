//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/users/{user_id}', use [format_endpoint].

/// The route for exchanging a username and password for a bearer token.
pub const LOG_IN: &str = "/auth/login";
/// The route to list or register users.
pub const USERS: &str = "/users";
/// The route to access a single user.
pub const USER: &str = "/users/{user_id}";
/// The route to list or create categories.
pub const CATEGORIES: &str = "/categories";
/// The route to access a single category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The route to list or create the caller's expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to access a single expense owned by the caller.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route for the Swagger UI.
pub const DOCS: &str = "/docs";
/// The route for the OpenAPI document shown by the Swagger UI.
pub const OPENAPI: &str = "/docs/openapi.json";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know the paths handed to the router and
// written into Location headers are valid URIs.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::LOG_IN);
        assert_endpoint_is_valid_uri(endpoints::USERS);
        assert_endpoint_is_valid_uri(endpoints::USER);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY);
        assert_endpoint_is_valid_uri(endpoints::EXPENSES);
        assert_endpoint_is_valid_uri(endpoints::EXPENSE);
        assert_endpoint_is_valid_uri(endpoints::DOCS);
        assert_endpoint_is_valid_uri(endpoints::OPENAPI);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
    }

    #[test]
    fn formats_resource_locations() {
        assert_eq!(format_endpoint(endpoints::EXPENSE, 42), "/expenses/42");
        assert_eq!(format_endpoint(endpoints::CATEGORY, 7), "/categories/7");
        assert_eq!(format_endpoint(endpoints::USER, 3), "/users/3");
    }
}
