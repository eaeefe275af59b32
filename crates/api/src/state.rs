// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! Shared application state: configuration, the balance service and the
//! cancellation token used for coordinated shutdown.

use std::sync::Arc;

use balance_service::{BalanceService, BalanceSink};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Balance lookup service
    service: Arc<BalanceService>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    pub fn new(
        config: ServerConfig,
        service: Arc<BalanceService>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            service,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Balance lookup service
    pub fn service(&self) -> &BalanceService {
        &self.service
    }

    /// Report registry coverage and the active sink
    ///
    /// A chain whose provider key has no adapter degrades the service; an
    /// empty registry takes it down.
    pub fn health_check(&self) -> HealthCheck {
        let registry = self.service.registry();
        let chains = registry.list_supported_chains();
        let unserved: Vec<String> = chains
            .iter()
            .filter(|chain| registry.resolve(chain.chain_id).is_none())
            .map(|chain| chain.name.clone())
            .collect();

        let status = if chains.is_empty() {
            HealthStatus::Down {
                reason: Box::from("no chains registered"),
            }
        } else if unserved.is_empty() {
            HealthStatus::Up
        } else {
            HealthStatus::Degraded {
                reason: format!("no adapter for {}", unserved.join(", ")).into_boxed_str(),
            }
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            supported_chains: chains.len(),
            providers: registry.provider_keys(),
            sink: self.service.sink().name().to_string(),
        }
    }
}

/// Health status of a service or dependency
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is not operational or has critical failures
    Down {
        /// Human-readable explanation of why the service is down
        reason: Box<str>,
    },

    /// Service is operational but experiencing performance issues or partial failures
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

/// Health check status
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Number of registered chains
    pub supported_chains: usize,
    /// Provider keys with a constructed adapter
    pub providers: Vec<String>,
    /// Active persistence sink
    pub sink: String,
}
