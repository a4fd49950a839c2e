//! API middleware

mod user_auth;

pub use user_auth::{extract_bearer_token, AuthenticatedUser, RequireUser};
