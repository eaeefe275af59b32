// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server implementation module
//!
//! This module provides the main server struct for the balance gateway,
//! including service construction from configuration, router and middleware
//! setup, and coordinated graceful shutdown using `CancellationToken`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, http::HeaderName};
use balance_service::{BalanceService, BalanceSink, ConfiguredSink};
use chain_adapters::AdapterRegistry;
use hyper::Request;
use tokio::{net::TcpListener, task::JoinError};
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::{ServerError, ServerResult},
    middleware::RateLimiter,
    routes::create_routes,
    state::ServerState,
};

// Server constants
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS: u64 = 30;

/// Configuration for server shutdown behavior
#[derive(Debug, Clone)]
pub struct ShutdownConfig {
    /// Maximum time to let in-flight requests drain after cancellation
    pub graceful_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS),
        }
    }
}

/// Main server struct
#[derive(Debug)]
pub struct Server {
    /// Server configuration
    config: ServerConfig,
    /// Application router
    router: Router,
    /// Server state
    state: ServerState,
    /// Cancellation token for coordinated shutdown
    cancellation_token: CancellationToken,
    /// Configuration for coordinated shutdown
    graceful_shutdown_config: ShutdownConfig,
}

impl Server {
    /// Create new server instance
    ///
    /// Bootstraps the default chain registry from `config.adapters` and
    /// builds the sink described by `config.sink`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the adapter or sink settings are invalid.
    pub fn new(config: ServerConfig, shutdown_config: ShutdownConfig) -> ServerResult<Self> {
        let registry =
            AdapterRegistry::bootstrap(&config.adapters).map_err(|e| ServerError::Config {
                message: format!("failed to build adapter registry: {e}"),
            })?;
        let sink = ConfiguredSink::from_settings(&config.sink).map_err(|e| ServerError::Config {
            message: format!("failed to build balance sink: {e}"),
        })?;

        let service = BalanceService::new(Arc::new(registry), sink);
        Ok(Self::with_service(config, shutdown_config, Arc::new(service)))
    }

    /// Create server around an existing service for dependency injection
    pub fn with_service(
        config: ServerConfig,
        graceful_shutdown_config: ShutdownConfig,
        service: Arc<BalanceService>,
    ) -> Self {
        let cancellation_token = CancellationToken::new();
        let state = ServerState::new(config.clone(), service, cancellation_token.child_token());
        let router = Self::create_router(state.clone());

        Self {
            config,
            router,
            state,
            cancellation_token,
            graceful_shutdown_config,
        }
    }

    /// Create application router with middleware
    fn create_router(state: ServerState) -> Router {
        let timeout_duration = state.config().timeout_seconds.value();
        let rate_limiter = RateLimiter::new(state.config().rate_limiting.clone());

        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
                    let method = req.method();
                    let uri = req.uri();
                    if let Some(request_id) = req.headers().get(REQUEST_ID_HEADER) {
                        info_span!("http_request", %method, %uri, ?request_id)
                    } else {
                        error!("failed to extract id from request");
                        info_span!("http_request", %method, %uri, request_id = "unknown")
                    }
                }),
            )
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(timeout_duration));

        create_routes(rate_limiter)
            .layer(middleware)
            .with_state(state)
    }

    async fn bind(&self) -> ServerResult<(TcpListener, SocketAddr)> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                address: addr,
                source,
            })?;

        let actual_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Startup { source })?;

        Ok((listener, actual_addr))
    }

    /// Run the server with coordinated graceful shutdown
    ///
    /// After a shutdown signal, in-flight requests get
    /// [`ShutdownConfig::graceful_timeout`] to finish.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address,
    /// `ServerError::Startup` if the server fails to start, or
    /// `ServerError::Shutdown` if serving fails.
    pub async fn run(self) -> ServerResult<()> {
        let (listener, actual_addr) = self.bind().await?;

        info!(
            address = %actual_addr,
            environment = %self.config.environment,
            chains = self.state.service().registry().list_supported_chains().len(),
            sink = self.state.service().sink().name(),
            "balance gateway starting",
        );

        let cancellation_token = self.cancellation_token.clone();
        let shutdown_token = cancellation_token.clone();
        tokio::spawn(async move {
            info!("spawning the graceful shutdown task");
            Self::shutdown_signal_handler(shutdown_token).await;
        });

        let drain_token = cancellation_token.clone();
        let serve = axum::serve(
            listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { drain_token.cancelled().await });
        let mut server = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = &mut server => return Self::finish(result),
            () = cancellation_token.cancelled() => {}
        }

        match tokio::time::timeout(self.graceful_shutdown_config.graceful_timeout, server).await {
            Ok(result) => {
                info!("balance gateway shut down gracefully");
                Self::finish(result)
            }
            Err(_) => {
                warn!(
                    timeout = ?self.graceful_shutdown_config.graceful_timeout,
                    "in-flight requests did not drain in time, exiting"
                );
                Ok(())
            }
        }
    }

    fn finish(result: Result<std::io::Result<()>, JoinError>) -> ServerResult<()> {
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => {
                error!(error = ?source, "server error during shutdown");
                Err(ServerError::Shutdown { source })
            }
            Err(join_error) => {
                error!(error = ?join_error, "server task failed");
                Err(ServerError::Shutdown {
                    source: std::io::Error::other(join_error),
                })
            }
        }
    }

    /// Handle shutdown signals and trigger coordinated cancellation
    ///
    /// This function listens for SIGINT (Ctrl+C) and SIGTERM signals,
    /// and cancels the provided cancellation token when received.
    async fn shutdown_signal_handler(cancellation_token: CancellationToken) {
        let signal_received = async {
            #[cfg(unix)]
            #[allow(clippy::expect_used)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let mut sigterm =
                    signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
                let mut sigint =
                    signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                }
            }

            #[cfg(not(unix))]
            #[allow(clippy::expect_used)]
            {
                tokio::signal::ctrl_c()
                    .await
                    .expect("Failed to install CTRL+C signal handler");
                "CTRL+C"
            }
        };

        tokio::select! {
            signal_name = signal_received => {
                warn!(signal = signal_name, "shutdown signal received, cancelling all operations");
                cancellation_token.cancel();
            },
            () = cancellation_token.cancelled() => {
                warn!("cancellation token already cancelled, shutdown signal handler exiting");
            }
        }
    }

    /// Returns a clone of the cancellation token for coordinated shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Initiates graceful shutdown by cancelling the server's cancellation token
    pub fn shutdown(&self) {
        info!("programmatic shutdown requested");
        self.cancellation_token.cancel();
    }

    /// Run server for testing, returns the bound address
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Bind` if unable to bind to the configured address.
    pub async fn run_for_testing(self) -> ServerResult<(SocketAddr, CancellationToken)> {
        let (listener, actual_addr) = self.bind().await?;

        let token = self.cancellation_token.child_token();
        let task = token.child_token();
        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                self.router
                    .into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { task.cancelled().await })
            .await;
        });

        Ok((actual_addr, token))
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get server state for testing
    pub fn state(&self) -> &ServerState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use balance_service::{SinkKind, SinkSettings};

    use super::*;
    use crate::config::Environment;

    #[tokio::test]
    async fn server_creation() -> ServerResult<()> {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default())?;
        assert_eq!(server.config().environment, Environment::Testing);
        assert!(!server.cancellation_token().is_cancelled());
        assert_eq!(server.state().service().sink().name(), "log");
        Ok(())
    }

    #[tokio::test]
    async fn programmatic_shutdown() -> ServerResult<()> {
        let server = Server::new(ServerConfig::for_testing(), ShutdownConfig::default())?;

        assert!(!server.cancellation_token().is_cancelled());
        assert!(!server.state().cancellation_token.is_cancelled());

        server.shutdown();

        assert!(server.cancellation_token().is_cancelled());
        assert!(server.state().cancellation_token.is_cancelled());
        Ok(())
    }

    #[test]
    fn incomplete_sink_settings_are_rejected() {
        let mut config = ServerConfig::for_testing();
        config.sink = SinkSettings {
            kind: SinkKind::BigQuery,
            ..SinkSettings::default()
        };

        let error = Server::new(config, ShutdownConfig::default()).unwrap_err();
        assert!(matches!(error, ServerError::Config { .. }));
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let server = Server::new(
            ServerConfig::for_testing(),
            ShutdownConfig {
                graceful_timeout: Duration::from_secs(1),
            },
        )
        .unwrap();
        let token = server.cancellation_token();

        let handle = tokio::spawn(server.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[test]
    fn shutdown_config_default() {
        assert_eq!(
            ShutdownConfig::default().graceful_timeout,
            Duration::from_secs(DEFAULT_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS)
        );
    }
}
