//! Expense Tracker is a REST API for recording personal expenses.
//!
//! Users register and log in with a username and password, receive a bearer
//! token, and then manage their own expenses filed under a shared set of
//! categories. All data lives in a single SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod api_docs;
mod app_state;
mod auth;
mod category;
mod config;
mod db;
mod endpoints;
mod error;
mod expense;
mod logging;
mod pagination;
mod password;
mod routing;
mod user;
mod validation;

pub use api_docs::ApiDoc;
pub use app_state::AppState;
pub use config::AuthConfig;
pub use db::{
    TEST_PASSWORD, TEST_USERNAME, initialize as initialize_db, seed_default_categories,
    seed_test_user,
};
pub use error::Error;
pub use expense::{Amount, NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{NewUser, User, UserId, create_user, get_user_by_username, update_password};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
