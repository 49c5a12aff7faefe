//! Registered users: storage, and the public endpoints for managing them.

mod core;
pub(crate) mod create_endpoint;
pub(crate) mod delete_endpoint;
pub(crate) mod edit_endpoint;
pub(crate) mod get_endpoint;

pub use core::{
    NewUser, User, UserId, UserResponse, create_user, create_user_table, get_all_users,
    get_user_by_id, get_user_by_username, update_password,
};
pub use create_endpoint::create_user_endpoint;
pub use delete_endpoint::delete_user_endpoint;
pub use edit_endpoint::edit_user_endpoint;
pub use get_endpoint::{get_user_endpoint, get_users_endpoint};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the user endpoints.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            password_cost: state.password_cost,
        }
    }
}
