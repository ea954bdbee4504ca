//! User-visible failure notifications.
//!
//! The gateway reports every failed call here exactly once, so callers should
//! not show the same message again.

/// Surface that shows short error messages to the user.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Emits notifications as `tracing` errors under the `notify` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "notify", "{message}");
    }
}
