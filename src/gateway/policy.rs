//! Side effects the gateway triggers on failed calls.
//!
//! DESIGN
//! ======
//! The gateway decides *what* failed; the policy decides what the user sees
//! and whether the session ends. Tests and headless tools swap in
//! [`NoopPolicy`].

use std::sync::Arc;

use super::envelope::{DEFAULT_FAILURE_MESSAGE, Rejection};
use crate::notify::Notifier;
use crate::router::Router;
use crate::session::SessionStore;

pub trait ResponsePolicy: Send + Sync {
    /// Network error, timeout or non-2xx status.
    fn transport_failed(&self, message: &str);

    /// `success: false` envelope. `sent_access_token` is the token the
    /// failing request carried (empty when anonymous).
    fn request_rejected(&self, rejection: &Rejection, sent_access_token: &str);

    /// `success: true` envelope whose `data` did not have the expected shape.
    fn decode_failed(&self, detail: &str);
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPolicy;

impl ResponsePolicy for NoopPolicy {
    fn transport_failed(&self, _message: &str) {}

    fn request_rejected(&self, _rejection: &Rejection, _sent_access_token: &str) {}

    fn decode_failed(&self, _detail: &str) {}
}

/// Notify the user of every failure; on session expiry, clear the session
/// and send the user to the login view.
pub struct InterceptPolicy {
    store: Arc<SessionStore>,
    router: Arc<Router>,
    notifier: Arc<dyn Notifier>,
}

impl InterceptPolicy {
    pub fn new(store: Arc<SessionStore>, router: Arc<Router>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, router, notifier }
    }
}

impl ResponsePolicy for InterceptPolicy {
    fn transport_failed(&self, message: &str) {
        self.notifier.error(message);
    }

    fn request_rejected(&self, rejection: &Rejection, sent_access_token: &str) {
        self.notifier.error(&rejection.message);
        if !rejection.is_session_expiry() {
            return;
        }
        if self.store.expire_session(sent_access_token) {
            tracing::info!(code = ?rejection.code, "session ended by backend");
            self.router.push(self.router.login_path());
        }
    }

    // The decoder's detail is for logs; the user sees the generic failure.
    fn decode_failed(&self, detail: &str) {
        tracing::debug!(detail, "payload decode failed");
        self.notifier.error(DEFAULT_FAILURE_MESSAGE);
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod policy_test;
