//! Bearer-token JSON client for the cbx.life backend.
//!
//! Every module talks to the backend through `ApiClient`. A call resolves the
//! path against the startup-configured base URL, attaches the stored token as
//! a bearer credential, sends one request, and either decodes the JSON body
//! or fails with an `ApiError`.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures, non-success statuses and undecodable bodies all become
//! the same `ApiError` carrying a display-ready message. For non-success
//! statuses the message is the body's `detail` field, falling back to the
//! status text. There is no retry, cache or backoff: callers show the message
//! and move on.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::util::storage::TokenStore;

/// Which stage of a call failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response arrived.
    Transport,
    /// The backend answered with a non-success status.
    Status,
    /// A success response whose body was not the expected JSON.
    Malformed,
}

/// Uniform failure for every backend call.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: Option<u16>,
    message: String,
}

impl ApiError {
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Transport,
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Status,
            status: Some(status),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Malformed,
            status: None,
            message: message.into(),
        }
    }

    /// Build the error for a non-success response body.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self::status(
            status.as_u16(),
            error_message(status.as_u16(), status.canonical_reason(), body),
        )
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for 401 responses: the stored token was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Extract a display message from an error response body.
///
/// `{"detail": "X"}` yields `X`. Validation errors carry a list of objects
/// under `detail`; their `msg` fields are joined. A JSON body without a usable
/// `detail` yields `Request failed: <status>`. An empty or non-JSON body
/// yields the status text.
#[must_use]
pub fn error_message(status: u16, reason: Option<&str>, body: &[u8]) -> String {
    let status_text = || reason.map_or_else(|| format!("Request failed: {status}"), str::to_owned);

    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return status_text();
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                format!("Request failed: {status}")
            } else {
                messages.join("; ")
            }
        }
        _ => format!("Request failed: {status}"),
    }
}

/// HTTP client bound to one backend and one token store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            tokens,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store shared with the session store.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-success status, or
    /// an undecodable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, self.request(Method::GET, path)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, request).await
    }

    /// `POST path` with a form-encoded body (used by `/auth/login`).
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post_form<B, T>(&self, path: &str, form: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).form(form);
        self.send(Method::POST, path, request).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, request).await
    }

    /// `PATCH path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path).json(body);
        self.send(Method::PATCH, path, request).await
    }

    /// `PATCH path` with `query` appended to the URL and a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn patch_query<Q, B, T>(&self, path: &str, query: &Q, body: &B) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path).query(query).json(body);
        self.send(Method::PATCH, path, request).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await
    }

    /// `GET path` with an explicit token instead of the stored one.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(path)).bearer_auth(token);
        self.send(Method::GET, path, request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match self.tokens.load() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        tracing::debug!(%method, path, "api request");

        let response = request.send().await.map_err(|error| {
            tracing::warn!(%method, path, %error, "api transport failure");
            ApiError::transport(format!("Network error: {error}"))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|error| {
            tracing::warn!(%method, path, %error, "api body read failure");
            ApiError::transport(format!("Network error: {error}"))
        })?;

        if !status.is_success() {
            let error = ApiError::from_response(status, &body);
            tracing::warn!(%method, path, status = status.as_u16(), detail = error.message(), "api request failed");
            return Err(error);
        }

        decode_body(&body)
    }
}

/// Decode a success body. An empty body decodes as JSON `null`.
fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|error| ApiError::malformed(format!("Invalid response: {error}")))
}
