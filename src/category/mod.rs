//! Categories shared by every user for grouping expenses.

mod core;
pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod edit;
pub(crate) mod list;

pub use core::{
    Category, CategoryId, CategoryRequest, DEFAULT_CATEGORIES, create_category,
    create_category_table, delete_category, get_all_categories, get_category,
    seed_default_categories, update_category,
};
pub use create::create_category_endpoint;
pub use delete::delete_category_endpoint;
pub use edit::update_category_endpoint;
pub use list::{get_categories_endpoint, get_category_endpoint};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[cfg(test)]
fn must_create_test_state() -> CategoryState {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    crate::initialize_db(&connection).expect("could not initialize database");
    seed_default_categories(&connection).expect("could not seed categories");

    CategoryState {
        db_connection: Arc::new(Mutex::new(connection)),
    }
}
