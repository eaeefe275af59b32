// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! Server errors and their HTTP mapping. Every failure body uses the
//! [`BalanceResponse`] shape so clients parse one envelope for all outcomes.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use balance_adapter::{BalanceError, ErrorKind};
use shared_types::{BalanceResponse, ChainIdParseError};
use thiserror::Error;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Balance lookup failures raised by the service
    #[error(transparent)]
    Balance(#[from] BalanceError),

    /// Chain id path value is not a decimal integer, so no chain can match it
    #[error("No adapter found for chain ID: {}", .0.input())]
    InvalidChainId(#[from] ChainIdParseError),

    /// Input validation errors
    #[error("{0}")]
    ValidationError(String),

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Balance(error) => match error.kind() {
                ErrorKind::UnknownChain => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unsupported => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
                ErrorKind::Persistence | ErrorKind::Configuration => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::InvalidChainId(_) | Self::ValidationError(_) | Self::JsonError { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Label used by the failure counter
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Balance(error) => error.kind().as_str(),
            Self::InvalidChainId(_) => ErrorKind::UnknownChain.as_str(),
            Self::ValidationError(_) | Self::JsonError { .. } => "bad_request",
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. } => "server",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(BalanceResponse::failure(self.to_string()))).into_response()
    }
}
