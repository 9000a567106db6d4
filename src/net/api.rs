//! REST API helpers for the auth backend.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR): every call fails with [`ApiError::Network`] since the
//! bearer token only exists in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses are classified by status so callers can tell a rejected
//! credential (401) apart from other backend failures. FastAPI-style
//! `{"detail": ...}` bodies are surfaced verbatim.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{Credentials, Identity, LoginResponse};

/// Failure talking to the REST API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized { detail: Option<String> },
    #[error("request failed with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the backend answered at all (as opposed to a transport failure).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Status { .. })
    }
}

/// Backend calls the session store depends on.
///
/// Implemented over HTTP by [`HttpAuthApi`]; tests substitute in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;
    /// `POST /auth/register`.
    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError>;
    /// `GET /users/me` with the given bearer token.
    async fn fetch_me(&self, token: &str) -> Result<Identity, ApiError>;
}

#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
#[derive(Clone, Copy, Debug)]
enum Method {
    Get,
    Post,
}

/// Thin JSON-over-HTTP wrapper bound to one API origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_owned() }
    }

    /// Client for the configured API origin.
    pub fn from_config() -> Self {
        Self::new(crate::config::api_base_url())
    }

    /// Absolute URL for an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let body = self.send::<()>(Method::Get, path, token, None).await?;
        decode_json(&body)
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        payload: &B,
    ) -> Result<T, ApiError> {
        let body = self.send(Method::Post, path, token, Some(payload)).await?;
        decode_json(&body)
    }

    /// POST whose successful response body is not needed.
    pub async fn post_unit<B: Serialize>(&self, path: &str, token: Option<&str>, payload: &B) -> Result<(), ApiError> {
        self.send(Method::Post, path, token, Some(payload)).await.map(|_| ())
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        payload: Option<&B>,
    ) -> Result<String, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let url = self.endpoint(path);
            let mut builder = match method {
                Method::Get => gloo_net::http::Request::get(&url),
                Method::Post => gloo_net::http::Request::post(&url),
            };
            builder = builder.header("Accept", "application/json");
            if let Some(token) = token {
                builder = builder.header("Authorization", &bearer_header(token));
            }
            let resp = match payload {
                Some(payload) => {
                    builder
                        .json(payload)
                        .map_err(|e| ApiError::Network(e.to_string()))?
                        .send()
                        .await
                }
                None => builder.send().await,
            }
            .map_err(|e| ApiError::Network(e.to_string()))?;

            let status = resp.status();
            let body = resp.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
            check_status(status, &body)?;
            Ok(body)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (method, path, token, payload);
            Err(ApiError::Network("not available on server".to_owned()))
        }
    }
}

/// Auth backend reached over HTTP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl AuthApi for HttpAuthApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.client.post_json("/auth/login", None, credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.client.post_unit("/auth/register", None, credentials).await
    }

    async fn fetch_me(&self, token: &str) -> Result<Identity, ApiError> {
        self.client.get_json("/users/me", Some(token)).await
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

#[cfg(any(test, feature = "hydrate"))]
/// Map a response status + body to an error when the status is not 2xx.
fn check_status(status: u16, body: &str) -> Result<(), ApiError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let detail = parse_error_detail(body);
    if status == 401 {
        Err(ApiError::Unauthorized { detail })
    } else {
        Err(ApiError::Status { status, detail })
    }
}

#[cfg(any(test, feature = "hydrate"))]
/// Extract the human-readable message from a FastAPI error body.
///
/// `detail` is either a string or a list of validation entries with `msg`.
fn parse_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if msgs.is_empty() { None } else { Some(msgs.join("; ")) }
        }
        _ => None,
    }
}

fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
