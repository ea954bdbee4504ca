//! Composition root: owns the shared session and exposes the console's
//! user-facing flows.
//!
//! DESIGN
//! ======
//! One `Arc<SessionStore>` is shared by the router's guard, the gateway and
//! the intercept policy. Flows here only sequence API calls with store and
//! router updates; failure reporting already happened in the gateway by the
//! time an error reaches the caller.

use std::sync::Arc;

use serde_json::Value;

use crate::api::{AuthApi, TokenPair};
use crate::config::{ConfigError, ConsoleConfig};
use crate::gateway::{Gateway, GatewayError, InterceptPolicy};
use crate::notify::Notifier;
use crate::router::{HOME_PATH, Navigation, Router, default_routes};
use crate::session::{DurableStorage, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("no refresh token in the current session")]
    NoRefreshToken,
}

pub struct Console {
    config: ConsoleConfig,
    store: Arc<SessionStore>,
    router: Arc<Router>,
    auth: AuthApi,
}

impl Console {
    pub fn new(
        config: ConsoleConfig,
        storage: Arc<dyn DurableStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConsoleError> {
        let config = config.validated()?;
        let store = Arc::new(SessionStore::load(storage));
        let router = Arc::new(Router::new(default_routes(), store.clone(), &config.brand));
        let policy = InterceptPolicy::new(store.clone(), router.clone(), notifier);
        let gateway = Arc::new(Gateway::new(&config, store.clone(), Arc::new(policy))?);
        let auth = AuthApi::new(gateway);
        tracing::debug!(base_url = %config.base_url, "console ready");
        Ok(Self { config, store, router, auth })
    }

    #[must_use]
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Log in, store the issued tokens and land on the home view.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<Navigation, ConsoleError> {
        let tokens = self.auth.login(username, password).await?;
        self.store.set_tokens(&tokens.access_token, &tokens.refresh_token);
        tracing::info!(username, "signed in");
        Ok(self.router.push(HOME_PATH))
    }

    /// Fetch the current user's profile and cache it in the session.
    pub async fn load_profile(&self) -> Result<Value, ConsoleError> {
        let profile = self.auth.get_user_info().await?;
        self.store.set_user_info(profile.clone());
        Ok(profile)
    }

    /// End the session on both sides. The local session is cleared even when
    /// the backend call fails; that failure is still returned.
    pub async fn sign_out(&self) -> Result<Navigation, ConsoleError> {
        let remote = self.auth.logout().await;
        self.store.clear_session();
        let navigation = self.router.push(self.router.login_path());
        tracing::info!(remote_ok = remote.is_ok(), "signed out");
        remote?;
        Ok(navigation)
    }

    /// Exchange the stored refresh token for a new token pair.
    pub async fn refresh(&self) -> Result<TokenPair, ConsoleError> {
        let refresh_token = self.store.refresh_token();
        if refresh_token.is_empty() {
            return Err(ConsoleError::NoRefreshToken);
        }
        let tokens = self.auth.refresh_token(&refresh_token).await?;
        self.store.set_tokens(&tokens.access_token, &tokens.refresh_token);
        Ok(tokens)
    }

    pub async fn slider_image(&self, kind: &str) -> Result<Value, ConsoleError> {
        Ok(self.auth.get_slider_image(kind).await?)
    }

    pub async fn verify_slider(&self, x_pos: i64, kind: &str) -> Result<Value, ConsoleError> {
        Ok(self.auth.verify_slider(x_pos, kind).await?)
    }

    /// Navigate through the route guard.
    pub fn navigate(&self, path: &str) -> Navigation {
        self.router.push(path)
    }

    /// Start over as a new device: fresh correlation id, same tokens.
    pub fn new_device(&self) -> String {
        self.store.regenerate_correlation_id()
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod console_test;
