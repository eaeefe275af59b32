// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Balance Gateway HTTP Server
//!
//! Axum front end for the balance service: it exposes the supported chain
//! list, the four balance lookups and the batch fetch route, and maps every
//! outcome onto the `BalanceResponse` envelope.
//!
//! # Module Structure
//!
//! - [`config`]: Hierarchical configuration (defaults, JSON files, environment)
//! - [`error`]: Server errors and their HTTP status mapping
//! - [`state`]: Shared application state and health reporting
//! - [`server`]: Server lifecycle and coordinated shutdown
//! - [`routes`]: Route table and request handlers
//! - [`extractors`]: JSON body extraction with descriptive rejections
//! - [`middleware`]: Per-IP rate limiting
//! - [`metrics`]: Prometheus counters and histograms
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints

pub mod config;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, RateLimitingConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use state::{HealthCheck, HealthStatus, ServerState};
