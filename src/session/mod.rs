//! Session store: the single source of truth for who the console is talking
//! as.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway reads credentials from here before every request and clears
//! the session when the backend signals expiry. The route guard reads the
//! auth state before every navigation. Nothing else writes to it.
//!
//! DESIGN
//! ======
//! Tokens use the empty string as the "absent" value, matching what the
//! backend and durable storage carry. `AuthState` is derived from the access
//! token, never stored, so it cannot drift from the tokens.

pub mod storage;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use time::Duration;
use uuid::Uuid;

pub use storage::{DurableStorage, FileStorage, MemoryStorage};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const CORRELATION_ID_KEY: &str = "uuid";

/// Lifetime of persisted tokens.
pub const TOKEN_TTL: Duration = Duration::days(7);
/// Lifetime of the persisted correlation id.
pub const CORRELATION_ID_TTL: Duration = Duration::days(1);

/// Whether the console currently holds an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

/// Read-only snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub correlation_id: String,
    pub user_info: Option<Value>,
}

impl Session {
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        if self.access_token.is_empty() { AuthState::Anonymous } else { AuthState::Authenticated }
    }
}

/// Request credentials. Empty strings mean "do not send".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub correlation_id: String,
    pub access_token: String,
}

/// Shared session state, persisted through a [`DurableStorage`].
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn DurableStorage>,
}

impl SessionStore {
    /// Initialize from durable storage, generating a correlation id when none
    /// is persisted.
    pub fn load(storage: Arc<dyn DurableStorage>) -> Self {
        let session = Session {
            access_token: storage.get(ACCESS_TOKEN_KEY).unwrap_or_default(),
            refresh_token: storage.get(REFRESH_TOKEN_KEY).unwrap_or_default(),
            correlation_id: storage.get(CORRELATION_ID_KEY).unwrap_or_default(),
            user_info: None,
        };
        let store = Self { state: RwLock::new(session), storage };
        store.ensure_correlation_id();
        tracing::debug!(state = ?store.auth_state(), "session store loaded");
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.read().auth_state()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.auth_state() == AuthState::Authenticated
    }

    #[must_use]
    pub fn access_token(&self) -> String {
        self.read().access_token.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> String {
        self.read().refresh_token.clone()
    }

    #[must_use]
    pub fn correlation_id(&self) -> String {
        self.read().correlation_id.clone()
    }

    #[must_use]
    pub fn user_info(&self) -> Option<Value> {
        self.read().user_info.clone()
    }

    /// The values attached to outgoing requests, read together.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let state = self.read();
        Credentials { correlation_id: state.correlation_id.clone(), access_token: state.access_token.clone() }
    }

    /// Replace both tokens and persist them. Token contents are opaque.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        let mut state = self.write();
        state.access_token = access_token.to_owned();
        state.refresh_token = refresh_token.to_owned();
        self.storage.set(ACCESS_TOKEN_KEY, access_token, TOKEN_TTL);
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token, TOKEN_TTL);
        tracing::info!(state = ?state.auth_state(), "session tokens updated");
    }

    /// Drop tokens and cached profile. Safe to call repeatedly.
    pub fn clear_session(&self) {
        let mut state = self.write();
        Self::clear_locked(&mut state, self.storage.as_ref());
    }

    /// Clear the session only if it still holds `sent_access_token`, the
    /// token carried by the request that observed the expiry. Returns whether
    /// the session was cleared.
    ///
    /// A lagging expiry response from before a fresh login carries the old
    /// token and leaves the new session alone.
    pub fn expire_session(&self, sent_access_token: &str) -> bool {
        let mut state = self.write();
        if state.access_token != sent_access_token {
            tracing::info!("ignoring expiry signal for a superseded session");
            return false;
        }
        Self::clear_locked(&mut state, self.storage.as_ref());
        true
    }

    fn clear_locked(state: &mut Session, storage: &dyn DurableStorage) {
        let was = state.auth_state();
        state.access_token.clear();
        state.refresh_token.clear();
        state.user_info = None;
        storage.remove(ACCESS_TOKEN_KEY);
        storage.remove(REFRESH_TOKEN_KEY);
        if was == AuthState::Authenticated {
            tracing::info!("session cleared");
        }
    }

    /// Return the correlation id, generating and persisting one if absent.
    pub fn ensure_correlation_id(&self) -> String {
        let mut state = self.write();
        if state.correlation_id.is_empty() {
            state.correlation_id = generate_correlation_id();
            self.storage.set(CORRELATION_ID_KEY, &state.correlation_id, CORRELATION_ID_TTL);
            tracing::debug!("generated correlation id");
        }
        state.correlation_id.clone()
    }

    /// Always generate, persist and return a fresh correlation id.
    pub fn regenerate_correlation_id(&self) -> String {
        let mut state = self.write();
        state.correlation_id = generate_correlation_id();
        self.storage.set(CORRELATION_ID_KEY, &state.correlation_id, CORRELATION_ID_TTL);
        state.correlation_id.clone()
    }

    /// Cache the user profile. Memory only.
    pub fn set_user_info(&self, info: Value) {
        self.write().user_info = Some(info);
    }
}

/// Random version-4 UUID in the usual hyphenated form.
#[must_use]
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}
