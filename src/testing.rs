//! Shared test fixtures: an in-process backend and a recording notifier.

use std::sync::{Arc, Mutex};

use crate::config::ConsoleConfig;
use crate::gateway::Gateway;
use crate::gateway::policy::InterceptPolicy;
use crate::notify::Notifier;
use crate::router::{Router, default_routes};
use crate::session::{MemoryStorage, SessionStore};

/// Collects notifications instead of showing them.
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_backend(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Base URL of a port with nothing listening.
pub(crate) fn closed_backend() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn test_config(base_url: &str) -> ConsoleConfig {
    ConsoleConfig { base_url: base_url.to_owned(), brand: "Lilishop Admin".to_owned(), ..ConsoleConfig::default() }
}

/// A gateway wired with the production policy over in-memory state.
pub(crate) struct Harness {
    pub gateway: Arc<Gateway>,
    pub store: Arc<SessionStore>,
    pub router: Arc<Router>,
    pub notifier: Arc<RecordingNotifier>,
}

pub(crate) fn harness_with(config: &ConsoleConfig) -> Harness {
    let store = Arc::new(SessionStore::load(Arc::new(MemoryStorage::new())));
    let router = Arc::new(Router::new(default_routes(), store.clone(), &config.brand));
    let notifier = Arc::new(RecordingNotifier::default());
    let policy = InterceptPolicy::new(store.clone(), router.clone(), notifier.clone());
    let gateway = Arc::new(Gateway::new(config, store.clone(), Arc::new(policy)).unwrap());
    Harness { gateway, store, router, notifier }
}

pub(crate) fn harness(base_url: &str) -> Harness {
    harness_with(&test_config(base_url))
}
