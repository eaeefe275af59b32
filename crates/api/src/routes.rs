// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! Route table for the gateway. Health, metrics and documentation stay
//! outside the rate limiter; everything under `/v1` is limited when enabled.

pub mod handlers;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use handlers::{
    balances_handler, chains_handler, erc20_balance_handler, erc20_balances_handler,
    fetch_balances_handler, health_handler, native_balance_handler,
};

use crate::{
    metrics::metrics_handler,
    middleware::{RateLimiter, rate_limiting_middleware},
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes with conditional rate limiting
pub fn create_routes(rate_limiter: RateLimiter) -> Router<ServerState> {
    let operational_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let mut api_routes = Router::new()
        .route("/chains", get(chains_handler))
        .route(
            "/chains/{chain_id}/addresses/{address}/balances",
            get(balances_handler),
        )
        .route(
            "/chains/{chain_id}/addresses/{address}/native-balance",
            get(native_balance_handler),
        )
        .route(
            "/chains/{chain_id}/addresses/{address}/erc20-balances",
            get(erc20_balances_handler),
        )
        .route(
            "/chains/{chain_id}/addresses/{address}/erc20-balances/{token_address}",
            get(erc20_balance_handler),
        )
        .route("/fetch-balances", post(fetch_balances_handler));

    if rate_limiter.is_enabled() {
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limiting_middleware,
        ));
    }

    Router::new()
        .merge(operational_routes)
        .merge(docs_routes)
        .nest("/v1", api_routes)
}
