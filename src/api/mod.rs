//! Named request builders over the gateway, grouped by backend domain.

pub mod auth;

pub use auth::{AuthApi, DEFAULT_VERIFICATION, TokenPair};
