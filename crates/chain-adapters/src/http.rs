// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream HTTP plumbing shared by every adapter
//!
//! [`UpstreamClient`] wraps a `reqwest::Client` with an explicit per-call
//! timeout and a single status-matching policy, so each adapter only deals
//! with building its request and interpreting the payload.

use std::time::Duration;

use balance_adapter::BalanceError;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default per-call timeout for upstream requests
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 30;

/// User agent sent to every upstream
pub const USER_AGENT: &str = concat!("balance-gateway/", env!("CARGO_PKG_VERSION"));

/// Errors raised while talking to an upstream API
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum UpstreamError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream returned a non-success status
    #[error("{source_name} returned {status}: {message}")]
    Status {
        source_name: String,
        status: u16,
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited { source_name: String },

    /// Authentication failed
    #[error("Authentication failed for {source_name}")]
    Unauthorized { source_name: String },

    /// JSON-RPC error object in an otherwise successful response
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<UpstreamError> for BalanceError {
    fn from(value: UpstreamError) -> Self {
        match value {
            UpstreamError::Http(error) => BalanceError::Http {
                message: error.to_string(),
            },
            UpstreamError::Json(error) => BalanceError::InvalidResponse {
                message: error.to_string(),
            },
            UpstreamError::Status { .. } | UpstreamError::Rpc { .. } => BalanceError::Upstream {
                message: value.to_string(),
            },
            UpstreamError::RateLimited { source_name } => {
                BalanceError::RateLimitExceeded { source_name }
            }
            UpstreamError::Unauthorized { .. } => BalanceError::Authentication {
                message: value.to_string(),
            },
            UpstreamError::Config(message) => BalanceError::Configuration { message },
            UpstreamError::Timeout { seconds } => BalanceError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// Build the shared `reqwest` client used by all adapters
pub fn build_http_client(timeout_seconds: u64) -> Result<Client, UpstreamError> {
    if timeout_seconds == 0 {
        return Err(UpstreamError::Config(
            "upstream timeout must be greater than 0".to_string(),
        ));
    }

    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(UpstreamError::Http)
}

/// HTTP client bound to one upstream source
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    source_name: String,
    timeout_seconds: u64,
}

impl UpstreamClient {
    /// Create a client with its own connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is zero or the HTTP client cannot be built
    pub fn new(
        source_name: impl Into<String>,
        timeout_seconds: u64,
    ) -> Result<Self, UpstreamError> {
        let client = build_http_client(timeout_seconds)?;
        Ok(Self::with_client(client, source_name, timeout_seconds))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(
        client: Client,
        source_name: impl Into<String>,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            client,
            source_name: source_name.into(),
            timeout_seconds,
        }
    }

    /// Name of the upstream, used in errors and logs
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url).header("accept", "application/json")
    }

    /// Start a POST request
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url).header("accept", "application/json")
    }

    /// Send a request and parse the body as JSON
    pub async fn send_json(&self, request: RequestBuilder) -> Result<Value, UpstreamError> {
        let text = self.send_text(request).await?;
        serde_json::from_str(&text).map_err(UpstreamError::Json)
    }

    /// Send a request and return the raw body
    pub async fn send_text(&self, request: RequestBuilder) -> Result<String, UpstreamError> {
        let response = timeout(
            Duration::from_secs(self.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| UpstreamError::Timeout {
            seconds: self.timeout_seconds,
        })?
        .map_err(UpstreamError::Http)?;

        let status = response.status();
        debug!(
            source = %self.source_name,
            status = status.as_u16(),
            url = %response.url(),
            "upstream responded"
        );

        match status {
            status if status.is_success() => response.text().await.map_err(UpstreamError::Http),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(UpstreamError::Unauthorized {
                source_name: self.source_name.clone(),
            }),
            StatusCode::TOO_MANY_REQUESTS => Err(UpstreamError::RateLimited {
                source_name: self.source_name.clone(),
            }),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(
                    source = %self.source_name,
                    status = status.as_u16(),
                    error = error_text,
                    "upstream API error"
                );
                Err(UpstreamError::Status {
                    source_name: self.source_name.clone(),
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Call a JSON-RPC 2.0 method and return its `result` member
    pub async fn json_rpc(
        &self,
        url: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, UpstreamError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(source = %self.source_name, method, "calling JSON-RPC method");

        let mut envelope = self.send_json(self.post(url).json(&body)).await?;

        if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
            return Err(UpstreamError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        match envelope.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Err(UpstreamError::Rpc {
                code: 0,
                message: format!("{method} response has no result"),
            }),
        }
    }
}

/// Deserialize a typed view of a raw upstream payload
///
/// Adapters keep the raw `Value` for provenance and read fields through this.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, UpstreamError> {
    T::deserialize(value).map_err(UpstreamError::Json)
}

/// Join a base URL and a path without doubling slashes
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
