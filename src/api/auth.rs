//! Authentication endpoints: login, profile, logout, token refresh and the
//! slider captcha.
//!
//! Each method only describes the request. Failures are whatever the gateway
//! reports, already shown to the user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::{ApiRequest, Gateway, GatewayError};

pub const LOGIN_ENDPOINT: &str = "/manager/passport/user/login";
pub const USER_INFO_ENDPOINT: &str = "/manager/passport/user/info";
pub const LOGOUT_ENDPOINT: &str = "/manager/passport/user/logout";
pub const REFRESH_ENDPOINT: &str = "/manager/passport/user/refresh";
pub const SLIDER_ENDPOINT: &str = "/common/common/slider";

/// Verification flow used by the login form.
pub const DEFAULT_VERIFICATION: &str = "LOGIN";

/// Tokens issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthApi {
    gateway: Arc<Gateway>,
}

impl AuthApi {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// `POST /manager/passport/user/login` with a form body.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, GatewayError> {
        let request = ApiRequest::post(LOGIN_ENDPOINT).form(&[("username", username), ("password", password)]);
        self.gateway.execute(request).await
    }

    /// `GET /manager/passport/user/info`.
    pub async fn get_user_info(&self) -> Result<Value, GatewayError> {
        self.gateway.execute(ApiRequest::get(USER_INFO_ENDPOINT)).await
    }

    /// `POST /manager/passport/user/logout`. Ends the server-side session
    /// only; the caller clears the local store.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        self.gateway.execute::<Value>(ApiRequest::post(LOGOUT_ENDPOINT)).await?;
        Ok(())
    }

    /// `GET /manager/passport/user/refresh/{refresh_token}`.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenPair, GatewayError> {
        self.gateway
            .execute(ApiRequest::get(REFRESH_ENDPOINT).segment(refresh_token))
            .await
    }

    /// `GET /common/common/slider/{kind}`: challenge image descriptor.
    pub async fn get_slider_image(&self, kind: &str) -> Result<Value, GatewayError> {
        self.gateway.execute(ApiRequest::get(SLIDER_ENDPOINT).segment(kind)).await
    }

    /// `POST /common/common/slider/{kind}?xPos=..`: submit the dragged offset.
    pub async fn verify_slider(&self, x_pos: i64, kind: &str) -> Result<Value, GatewayError> {
        let request = ApiRequest::post(SLIDER_ENDPOINT).segment(kind).query("xPos", x_pos);
        self.gateway.execute(request).await
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
