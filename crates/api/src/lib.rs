//! Edutage API client utilities.
//!
//! This crate provides a lightweight client for the school-management
//! backend. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Attaching the session's bearer credential to each request
//! - Validating `EDUTAGE_API_BASE` for safety
//! - Surfacing non-2xx responses as typed [`ApiError`]s carrying the
//!   server-provided message
//!
//! The primary entry point is [`SchoolClient`]. Create an instance via
//! [`SchoolClient::from_env`], then issue JSON calls with
//! [`SchoolClient::get`] and [`SchoolClient::send`].

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use edutage_types::CredentialProvider;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url, header};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "EDUTAGE_API_BASE";

/// Public backend consumed when no override is configured.
const DEFAULT_BASE_URL: &str = "https://eduexcel-backend.onrender.com/api/v1";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Error taxonomy for API calls.
///
/// All variants are `Clone` so the query cache can retain the error of a
/// failed revalidation alongside the last good payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never reached the server.
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response with the server's message, verbatim.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// 401-class response. Clearing the session is left to the caller.
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },
    /// The response body was not the JSON the endpoint promises.
    #[error("malformed response payload: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of the failure, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Auth { status, .. } => Some(*status),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }

    fn from_response(status: StatusCode, body: &str) -> Self {
        let message = extract_server_message(status, body);
        if status == StatusCode::UNAUTHORIZED {
            Self::Auth {
                status: status.as_u16(),
                message,
            }
        } else {
            Self::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Pull the human-readable message out of an error body.
///
/// The backend reports errors as `{"message": "..."}`; anything else falls
/// back to the raw body, then to the status reason.
fn extract_server_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        && let Some(Value::String(message)) = map.get("message")
    {
        return message.clone();
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[derive(Clone)]
/// Thin wrapper around a configured `reqwest::Client` for backend access.
///
/// The client builds requests against a validated base URL and reads the
/// bearer credential from the injected [`CredentialProvider`] on every
/// request, so a login taking effect mid-process is picked up immediately.
pub struct SchoolClient {
    pub base_url: String,
    http: Client,
    credentials: Arc<dyn CredentialProvider>,
    user_agent: String,
}

impl std::fmt::Debug for SchoolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchoolClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl SchoolClient {
    /// Construct a client from the environment.
    ///
    /// The base URL is taken from `EDUTAGE_API_BASE` (if set) or falls back
    /// to the public backend. Non-localhost hosts must use HTTPS.
    pub fn from_env(credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(&base_url, credentials)
    }

    /// Construct a client against an explicit base URL.
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            credentials,
            user_agent: format!("edutage-cli/0.1; {}", env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The request carries the configured User-Agent and, when a session is
    /// established, the `Authorization: Bearer` header.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "building request");

        let mut builder = self
            .http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent);
        if let Some(token) = self.credentials.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Perform a GET against an API-relative path, with optional query
    /// parameters taken from a JSON object.
    pub async fn get(&self, path: &str, query: Option<&Value>) -> Result<Value, ApiError> {
        let mut builder = self.request(Method::GET, path);
        if let Some(params) = query {
            let pairs = build_query_pairs(params);
            if !pairs.is_empty() {
                builder = builder.query(&pairs);
            }
        }
        self.dispatch(builder, Method::GET, path).await
    }

    /// Perform a write call with an optional JSON body.
    ///
    /// The body is serialized with a `Content-Type: application/json`
    /// header; for DELETE the body is usually absent.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.dispatch(builder, method, path).await
    }

    async fn dispatch(
        &self,
        builder: RequestBuilder,
        method: Method,
        path: &str,
    ) -> Result<Value, ApiError> {
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|error| ApiError::Network(error.to_string()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|error| ApiError::Network(error.to_string()))?;

        if !status.is_success() {
            warn!(
                method = %method,
                path = %path,
                status = %status,
                duration_ms = start.elapsed().as_millis(),
                "request failed"
            );
            return Err(ApiError::from_response(status, &body_text));
        }

        debug!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "request completed"
        );

        if body_text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|error| ApiError::Decode(error.to_string()))
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed = Url::parse(base).map_err(|e| anyhow!("Invalid {API_BASE_ENV} URL '{base}': {e}"))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("{API_BASE_ENV} must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(anyhow!(
            "{API_BASE_ENV} must use https for non-localhost hosts; got '{}://'",
            parsed.scheme()
        ));
    }

    Ok(())
}

/// Flatten a JSON object into query pairs, repeating array values.
fn build_query_pairs(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let Value::Object(map) = params else {
        return pairs;
    };
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), query_value_to_string(item)));
                }
            }
            other => pairs.push((key.clone(), query_value_to_string(other))),
        }
    }
    pairs
}

fn query_value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edutage_types::AnonymousCredentials;
    use serde_json::json;

    #[test]
    fn base_url_allows_localhost_http() {
        assert!(validate_base_url("http://localhost:3000/api/v1").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
    }

    #[test]
    fn base_url_requires_https_elsewhere() {
        assert!(validate_base_url("http://eduexcel-backend.onrender.com/api/v1").is_err());
        assert!(validate_base_url("https://eduexcel-backend.onrender.com/api/v1").is_ok());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn from_env_honors_the_override() {
        temp_env::with_var(API_BASE_ENV, Some("http://localhost:9999"), || {
            let client = SchoolClient::from_env(Arc::new(AnonymousCredentials))
                .expect("construct client");
            assert_eq!(client.base_url, "http://localhost:9999");
        });
    }

    #[test]
    fn error_message_prefers_the_message_field() {
        let message = extract_server_message(
            StatusCode::BAD_REQUEST,
            r#"{"message":"gradeLevel is required"}"#,
        );
        assert_eq!(message, "gradeLevel is required");
    }

    #[test]
    fn error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            extract_server_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
            "upstream exploded"
        );
        assert_eq!(
            extract_server_message(StatusCode::BAD_GATEWAY, "   "),
            "Bad Gateway"
        );
    }

    #[test]
    fn unauthorized_maps_to_auth_error() {
        let error =
            ApiError::from_response(StatusCode::UNAUTHORIZED, r#"{"message":"token expired"}"#);
        assert_eq!(
            error,
            ApiError::Auth {
                status: 401,
                message: "token expired".into()
            }
        );
        assert_eq!(error.status(), Some(401));

        let error = ApiError::from_response(StatusCode::CONFLICT, r#"{"message":"duplicate"}"#);
        assert!(matches!(error, ApiError::Server { status: 409, .. }));
    }

    #[test]
    fn query_pairs_repeat_array_values() {
        let params = json!({"month": 5, "year": 2026, "tags": ["a", "b"]});
        let pairs = build_query_pairs(&params);
        assert!(pairs.contains(&("month".to_string(), "5".to_string())));
        assert!(pairs.contains(&("tags".to_string(), "a".to_string())));
        assert!(pairs.contains(&("tags".to_string(), "b".to_string())));
    }
}
