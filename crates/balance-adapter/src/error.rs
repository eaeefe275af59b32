// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for balance lookups

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::ChainId;
use thiserror::Error;

/// Errors that can occur while fetching, normalizing or persisting balances
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum BalanceError {
    /// No adapter is registered for the chain
    #[error("No adapter found for chain ID: {chain_id}")]
    UnknownChain { chain_id: ChainId },

    /// Requested asset or native balance is absent from the upstream response
    #[error("{message}")]
    NotFound { message: String },

    /// Operation has no meaning for the chain's asset model
    #[error("{message}")]
    Unsupported { message: String },

    /// Upstream returned a non-success status or an API-level error
    #[error("{message}")]
    Upstream { message: String },

    /// Upstream payload could not be interpreted
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// HTTP transport failed
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// Upstream rate limit hit
    #[error("Rate limit exceeded for {source_name}")]
    RateLimitExceeded { source_name: String },

    /// Upstream rejected the credentials
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Upstream call exceeded its time budget
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Adapter or sink configuration is invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Persistence sink rejected the write
    #[error("Failed to persist balances: {message}")]
    Persistence { message: String },

    /// Client independent error
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

/// Coarse classification of [`BalanceError`] used for status mapping and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Chain has no registered adapter
    UnknownChain,
    /// Asset absent from an otherwise successful response
    NotFound,
    /// Operation not meaningful on the chain
    Unsupported,
    /// Any upstream failure: status, payload, transport, timeout
    Upstream,
    /// Sink write failed
    Persistence,
    /// Invalid configuration or unexpected internal failure
    Configuration,
}

impl ErrorKind {
    /// Stable label for logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownChain => "unknown_chain",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
            Self::Upstream => "upstream",
            Self::Persistence => "persistence",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BalanceError {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownChain { .. } => ErrorKind::UnknownChain,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Upstream { .. }
            | Self::InvalidResponse { .. }
            | Self::Http { .. }
            | Self::RateLimitExceeded { .. }
            | Self::Authentication { .. }
            | Self::Timeout { .. } => ErrorKind::Upstream,
            Self::Persistence { .. } => ErrorKind::Persistence,
            Self::Configuration { .. } | Self::Custom(_) => ErrorKind::Configuration,
        }
    }

    /// Shorthand for [`BalanceError::NotFound`]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Shorthand for [`BalanceError::Unsupported`]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Shorthand for [`BalanceError::Upstream`]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Shorthand for [`BalanceError::InvalidResponse`]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
