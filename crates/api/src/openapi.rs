// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` documentation module
//!
//! This module provides `OpenAPI` specification and `Swagger UI` endpoints for API documentation.

use axum::{Json, response::Html};
use shared_types::{BalanceResponse, ChainConfig, NormalizedBalanceRecord, RawMetadata};
use utoipa::OpenApi;

use crate::{
    config::Environment,
    routes::handlers::{self, ChainsResponse, FetchBalancesRequest},
    state::{HealthCheck, HealthStatus},
};

/// `OpenAPI` document for every public route
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Balance Gateway",
        description = "Fetches wallet balances from many blockchains, normalizes them into one record shape and persists every successful lookup."
    ),
    paths(
        handlers::health_handler,
        handlers::chains_handler,
        handlers::balances_handler,
        handlers::native_balance_handler,
        handlers::erc20_balances_handler,
        handlers::erc20_balance_handler,
        handlers::fetch_balances_handler,
    ),
    components(schemas(
        BalanceResponse,
        NormalizedBalanceRecord,
        RawMetadata,
        ChainConfig,
        ChainsResponse,
        FetchBalancesRequest,
        HealthCheck,
        HealthStatus,
        Environment,
    )),
    tags(
        (name = "health", description = "Service status"),
        (name = "chains", description = "Supported chain registry"),
        (name = "balances", description = "Normalized balance lookups")
    )
)]
pub struct ApiDoc;

/// `OpenAPI` specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Swagger UI endpoint
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_UI)
}

const SWAGGER_UI: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Balance Gateway API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({
                url: '/api-doc/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        }
    </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_balance_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/health",
            "/v1/chains",
            "/v1/chains/{chain_id}/addresses/{address}/balances",
            "/v1/chains/{chain_id}/addresses/{address}/native-balance",
            "/v1/chains/{chain_id}/addresses/{address}/erc20-balances",
            "/v1/chains/{chain_id}/addresses/{address}/erc20-balances/{token_address}",
            "/v1/fetch-balances",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
