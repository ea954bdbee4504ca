//! HTTP gateway: the only way the console talks to the backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every API call is a declarative [`ApiRequest`] handed to
//! [`Gateway::execute`]. The gateway attaches the session's correlation id
//! and access token, sends the request, and unwraps the response envelope so
//! callers only ever see `data` from a successful response.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures and `success: false` envelopes both reach the
//! [`ResponsePolicy`] before the caller sees the error. The policy shows the
//! message and ends the session on expiry codes, so callers only decide
//! control flow.

pub mod envelope;
pub mod policy;

use std::fmt;
use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use envelope::{Envelope, Outcome, Rejection};
pub use policy::{InterceptPolicy, NoopPolicy, ResponsePolicy};

use crate::config::ConsoleConfig;
use crate::session::SessionStore;
use envelope::DEFAULT_NETWORK_MESSAGE;

pub const CORRELATION_ID_HEADER: &str = "uuid";
pub const ACCESS_TOKEN_HEADER: &str = "accessToken";

const USER_AGENT: &str = concat!("lili-console/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network error, timeout or non-2xx status.
    #[error("{0}")]
    Transport(String),

    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(Rejection),

    /// `data` did not match the type the caller asked for.
    #[error("unexpected response payload: {0}")]
    Decode(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl GatewayError {
    #[must_use]
    pub fn is_session_expiry(&self) -> bool {
        matches!(self, Self::Rejected(rejection) if rejection.is_session_expiry())
    }

    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded`, fields in order.
    Form(Vec<(String, String)>),
    Json(Value),
}

/// Declarative description of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Fixed path, e.g. `/manager/passport/user/info`.
    pub path: String,
    /// Dynamic segments appended after `path`, percent-encoded on send.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), segments: Vec::new(), query: Vec::new(), body: RequestBody::Empty }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    #[must_use]
    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        let fields = fields.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        self.body = RequestBody::Form(fields);
        self
    }

    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    store: Arc<SessionStore>,
    policy: Arc<dyn ResponsePolicy>,
}

impl Gateway {
    pub fn new(
        config: &ConsoleConfig,
        store: Arc<SessionStore>,
        policy: Arc<dyn ResponsePolicy>,
    ) -> Result<Self, GatewayError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| GatewayError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(config.base_url.clone()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, store, policy })
    }

    /// Absolute URL for `request`, without the query string.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(request.path.split('/').filter(|s| !s.is_empty()));
            path.extend(&request.segments);
        }
        Ok(url)
    }

    /// Send `request` and return the envelope's `data` as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, GatewayError> {
        let url = self.url_for(&request)?;

        // Credentials are read just before send.
        let credentials = self.store.credentials();
        let mut builder = self.http.request(request.method.clone(), url);
        if !credentials.correlation_id.is_empty() {
            builder = builder.header(CORRELATION_ID_HEADER, &credentials.correlation_id);
        }
        if !credentials.access_token.is_empty() {
            builder = builder.header(ACCESS_TOKEN_HEADER, &credentials.access_token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            authenticated = !credentials.access_token.is_empty(),
            "sending request"
        );

        let body = match send(builder).await {
            Ok(body) => body,
            Err(message) => {
                tracing::warn!(path = %request.path, error = %message, "request failed in transport");
                self.policy.transport_failed(&message);
                return Err(GatewayError::Transport(message));
            }
        };

        match envelope::unwrap_envelope(&body) {
            Outcome::Success(data) => serde_json::from_value(data).map_err(|e| {
                let detail = e.to_string();
                tracing::warn!(path = %request.path, error = %detail, "response payload did not match");
                self.policy.decode_failed(&detail);
                GatewayError::Decode(detail)
            }),
            Outcome::Rejected(rejection) => {
                tracing::warn!(path = %request.path, code = ?rejection.code, message = %rejection.message, "request rejected");
                self.policy.request_rejected(&rejection, &credentials.access_token);
                Err(GatewayError::Rejected(rejection))
            }
        }
    }
}

async fn send(builder: reqwest::RequestBuilder) -> Result<String, String> {
    let response = builder.send().await.map_err(transport_message)?;
    let response = response.error_for_status().map_err(transport_message)?;
    response.text().await.map_err(transport_message)
}

fn transport_message(error: reqwest::Error) -> String {
    let message = error.to_string();
    if message.is_empty() { DEFAULT_NETWORK_MESSAGE.to_owned() } else { message }
}
