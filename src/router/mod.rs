//! Client-side navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router owns the active path and document title. Every `push` runs the
//! [`RouteGuard`] first, so anonymous users land on the login view no matter
//! where they tried to go. The gateway also pushes the login view when the
//! backend reports an expired session.

pub mod guard;

use std::sync::{Arc, PoisonError, RwLock};

pub use guard::{GuardDecision, RouteGuard};

use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

/// A navigable destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub requires_auth: bool,
    /// Static redirect target; such routes never render.
    pub redirect: Option<String>,
}

impl Route {
    /// A protected route with no metadata.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), name: None, title: None, requires_auth: true, redirect: None }
    }

    #[must_use]
    pub fn named(mut self, name: &str, title: &str) -> Self {
        self.name = Some(name.to_owned());
        self.title = Some(title.to_owned());
        self
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    #[must_use]
    pub fn redirect_to(mut self, target: &str) -> Self {
        self.redirect = Some(target.to_owned());
        self
    }
}

/// The console's navigation table.
#[must_use]
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new(LOGIN_PATH).named("Login", "Login").public(),
        Route::new(HOME_PATH).named("Dashboard", "Dashboard"),
        Route::new("/").redirect_to(HOME_PATH),
    ]
}

/// Result of a completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Where the user ended up.
    pub path: String,
    /// The guarded path that was refused, if the guard redirected.
    pub redirected_from: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, Default)]
struct Location {
    path: String,
    title: String,
}

pub struct Router {
    routes: Vec<Route>,
    guard: RouteGuard,
    location: RwLock<Location>,
}

/// Static redirects are followed at most this many times.
const MAX_STATIC_REDIRECTS: usize = 8;

impl Router {
    pub fn new(routes: Vec<Route>, store: Arc<SessionStore>, brand: &str) -> Self {
        let guard = RouteGuard::new(store, LOGIN_PATH, brand);
        let location = Location { path: String::new(), title: guard::page_title(None, brand) };
        Self { routes, guard, location: RwLock::new(location) }
    }

    /// Look up `path`, following static redirects. Unknown paths resolve to
    /// an untitled protected route.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Route {
        let mut current = path.to_owned();
        for _ in 0..MAX_STATIC_REDIRECTS {
            match self.routes.iter().find(|r| r.path == current) {
                Some(Route { redirect: Some(target), .. }) => current.clone_from(target),
                Some(route) => return route.clone(),
                None => break,
            }
        }
        Route::new(current)
    }

    /// Navigate to `path` through the guard.
    pub fn push(&self, path: &str) -> Navigation {
        let to = self.resolve(path);
        let mut title = self.guard.title_for(&to);
        let mut redirected_from = None;

        let landed = match self.guard.before_each(&to) {
            GuardDecision::Allow => to,
            GuardDecision::Redirect(target) => {
                redirected_from = Some(to.path);
                let next = self.resolve(&target);
                title = self.guard.title_for(&next);
                // Redirect targets are the login view, which the guard always admits.
                next
            }
        };

        let mut location = self.location.write().unwrap_or_else(PoisonError::into_inner);
        location.path.clone_from(&landed.path);
        location.title.clone_from(&title);
        tracing::debug!(path = %landed.path, redirected = redirected_from.is_some(), "navigated");
        Navigation { path: landed.path, redirected_from, title }
    }

    #[must_use]
    pub fn current_path(&self) -> String {
        self.location.read().unwrap_or_else(PoisonError::into_inner).path.clone()
    }

    /// The document title set by the last navigation.
    #[must_use]
    pub fn title(&self) -> String {
        self.location.read().unwrap_or_else(PoisonError::into_inner).title.clone()
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        self.guard.login_path()
    }
}
