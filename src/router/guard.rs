//! Navigation interceptor run before every view transition.

use std::sync::Arc;

use super::Route;
use crate::session::SessionStore;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Keeps anonymous users on the login view and derives the page title.
pub struct RouteGuard {
    store: Arc<SessionStore>,
    login_path: String,
    brand: String,
}

impl RouteGuard {
    pub fn new(store: Arc<SessionStore>, login_path: impl Into<String>, brand: impl Into<String>) -> Self {
        Self { store, login_path: login_path.into(), brand: brand.into() }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide whether navigation to `to` may proceed.
    #[must_use]
    pub fn before_each(&self, to: &Route) -> GuardDecision {
        if to.path == self.login_path || !to.requires_auth {
            return GuardDecision::Allow;
        }
        if self.store.is_logged_in() {
            GuardDecision::Allow
        } else {
            tracing::debug!(to = %to.path, "anonymous navigation redirected to login");
            GuardDecision::Redirect(self.login_path.clone())
        }
    }

    /// Page title for `to`, with the brand suffix.
    #[must_use]
    pub fn title_for(&self, to: &Route) -> String {
        page_title(to.title.as_deref(), &self.brand)
    }
}

pub(crate) fn page_title(title: Option<&str>, brand: &str) -> String {
    match title {
        Some(title) if !title.is_empty() => format!("{title} - {brand}"),
        _ => brand.to_owned(),
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;
