//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error, PasswordHash,
    auth::TokenConfig,
    config::AuthConfig,
    db::{initialize, seed_default_categories},
    pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys and settings for signing and checking bearer tokens.
    pub token_config: TokenConfig,

    /// The config that controls how to page through lists of expenses.
    pub pagination_config: PaginationConfig,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models
    /// and the default categories.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        auth_config: &AuthConfig,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;
        seed_default_categories(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_config: auth_config.token_config(),
            pagination_config,
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Use `password_cost` when hashing new passwords.
    ///
    /// Tests use a low cost to keep them fast.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}

impl FromRef<AppState> for TokenConfig {
    fn from_ref(state: &AppState) -> Self {
        state.token_config.clone()
    }
}
