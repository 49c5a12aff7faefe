//! Bearer token authentication: logging in, issuing tokens and checking them
//! on protected routes.

mod identity;
pub(crate) mod log_in;
mod token;

pub use identity::Identity;
pub use log_in::{LogInRequest, LogInResponse, LogInState, log_in_endpoint};
pub use token::{Claims, TOKEN_LIFETIME, TokenConfig};
