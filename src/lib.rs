//! Session and request plumbing for the admin console.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything the console needs between a user action and the backend REST
//! API: the session store (tokens, correlation id, cached profile), the HTTP
//! gateway that injects credentials and unwraps response envelopes, the auth
//! API request builders, and the route guard that keeps anonymous users on
//! the login view. `Console` wires these together and owns the shared state.

pub mod api;
pub mod config;
pub mod console;
pub mod gateway;
pub mod notify;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ConsoleConfig;
pub use console::{Console, ConsoleError};
pub use gateway::{Gateway, GatewayError};
pub use session::{AuthState, Session, SessionStore};
