// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! Every balance route parses the chain id, runs one [`BalanceQuery`] through
//! the service and maps the outcome onto a status code. Bodies are always a
//! [`BalanceResponse`].

use std::time::Instant;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use balance_service::BalanceQuery;
use serde::{Deserialize, Serialize};
use shared_types::{BalanceResponse, ChainConfig, ChainId, NormalizedBalanceRecord};
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    error::ServerError,
    extractors::JsonExtractor,
    metrics::{inc_failures, inc_requests, observe_lookup_duration},
    state::{HealthCheck, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns service status, version, environment, the number of registered chains, the provider keys with a constructed adapter and the active persistence sink.",
    responses(
        (status = 200, description = "Service status", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> Json<HealthCheck> {
    Json(state.health_check())
}

/// Supported chain listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChainsResponse {
    /// Always `true`
    pub success: bool,
    /// Registered chains in registration order
    pub data: Vec<ChainConfig>,
}

/// List every supported chain
#[utoipa::path(
    get,
    path = "/v1/chains",
    tag = "chains",
    summary = "List supported chains",
    responses(
        (status = 200, description = "Registered chains", body = ChainsResponse)
    )
)]
pub async fn chains_handler(State(state): State<ServerState>) -> Json<ChainsResponse> {
    Json(ChainsResponse {
        success: true,
        data: state.service().list_supported_chains(),
    })
}

/// Native plus token balances for an address
#[utoipa::path(
    get,
    path = "/v1/chains/{chain_id}/addresses/{address}/balances",
    tag = "balances",
    summary = "All balances",
    params(
        ("chain_id" = String, Path, description = "Decimal chain identifier", example = "1"),
        ("address" = String, Path, description = "Chain-native account address")
    ),
    responses(
        (status = 200, description = "Balances fetched and persisted", body = BalanceResponse),
        (status = 400, description = "Unknown or malformed chain id", body = BalanceResponse),
        (status = 404, description = "Account or asset not found", body = BalanceResponse),
        (status = 502, description = "Upstream API failure", body = BalanceResponse),
        (status = 500, description = "Persistence failure", body = BalanceResponse)
    )
)]
pub async fn balances_handler(
    State(state): State<ServerState>,
    Path((chain_id, address)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ServerError> {
    lookup(&state, chain_id.parse()?, &address, BalanceQuery::All)
        .await
        .map(|records| Json(BalanceResponse::ok(records)))
}

/// Native balance for an address
#[utoipa::path(
    get,
    path = "/v1/chains/{chain_id}/addresses/{address}/native-balance",
    tag = "balances",
    summary = "Native balance",
    params(
        ("chain_id" = String, Path, description = "Decimal chain identifier", example = "1"),
        ("address" = String, Path, description = "Chain-native account address")
    ),
    responses(
        (status = 200, description = "Native balance fetched and persisted", body = BalanceResponse),
        (status = 400, description = "Unknown or malformed chain id", body = BalanceResponse),
        (status = 404, description = "Native balance missing from the upstream response", body = BalanceResponse),
        (status = 502, description = "Upstream API failure", body = BalanceResponse),
        (status = 500, description = "Persistence failure", body = BalanceResponse)
    )
)]
pub async fn native_balance_handler(
    State(state): State<ServerState>,
    Path((chain_id, address)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ServerError> {
    lookup(&state, chain_id.parse()?, &address, BalanceQuery::Native)
        .await
        .map(|records| Json(BalanceResponse::ok(records)))
}

/// Every enumerable token balance for an address
///
/// Chains without token enumeration answer with an empty list.
#[utoipa::path(
    get,
    path = "/v1/chains/{chain_id}/addresses/{address}/erc20-balances",
    tag = "balances",
    summary = "Token balances",
    params(
        ("chain_id" = String, Path, description = "Decimal chain identifier", example = "1"),
        ("address" = String, Path, description = "Chain-native account address")
    ),
    responses(
        (status = 200, description = "Token balances fetched and persisted", body = BalanceResponse),
        (status = 400, description = "Unknown or malformed chain id", body = BalanceResponse),
        (status = 502, description = "Upstream API failure", body = BalanceResponse),
        (status = 500, description = "Persistence failure", body = BalanceResponse)
    )
)]
pub async fn erc20_balances_handler(
    State(state): State<ServerState>,
    Path((chain_id, address)): Path<(String, String)>,
) -> Result<Json<BalanceResponse>, ServerError> {
    lookup(&state, chain_id.parse()?, &address, BalanceQuery::Tokens)
        .await
        .map(|records| Json(BalanceResponse::ok(records)))
}

/// One token balance for an address
#[utoipa::path(
    get,
    path = "/v1/chains/{chain_id}/addresses/{address}/erc20-balances/{token_address}",
    tag = "balances",
    summary = "Single token balance",
    params(
        ("chain_id" = String, Path, description = "Decimal chain identifier", example = "1"),
        ("address" = String, Path, description = "Chain-native account address"),
        ("token_address" = String, Path, description = "Chain-native token identifier: contract address, denom, coin type, asset code")
    ),
    responses(
        (status = 200, description = "Token balance fetched and persisted", body = BalanceResponse),
        (status = 400, description = "Unknown or malformed chain id", body = BalanceResponse),
        (status = 404, description = "Token not held by the account", body = BalanceResponse),
        (status = 422, description = "Chain has no token model", body = BalanceResponse),
        (status = 502, description = "Upstream API failure", body = BalanceResponse),
        (status = 500, description = "Persistence failure", body = BalanceResponse)
    )
)]
pub async fn erc20_balance_handler(
    State(state): State<ServerState>,
    Path((chain_id, address, token_address)): Path<(String, String, String)>,
) -> Result<Json<BalanceResponse>, ServerError> {
    lookup(
        &state,
        chain_id.parse()?,
        &address,
        BalanceQuery::Token(token_address),
    )
    .await
    .map(|records| Json(BalanceResponse::ok(records)))
}

/// Batch fetch request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FetchBalancesRequest {
    /// Chain identifier, as a string or a number
    #[schema(value_type = Option<String>, example = "8011")]
    pub chain_id: Option<ChainId>,
    /// Chain-native account address
    #[schema(example = "osmo1clpqr4nrk4khgkxj78fcwwh6dl3uw4epasmvnj")]
    pub address: Option<String>,
}

/// Fetch and persist every balance for an address
///
/// Unlike the GET routes, any lookup failure answers `400`.
#[utoipa::path(
    post,
    path = "/v1/fetch-balances",
    tag = "balances",
    summary = "Fetch and persist balances",
    request_body = FetchBalancesRequest,
    responses(
        (status = 200, description = "Balances fetched and persisted", body = BalanceResponse),
        (status = 400, description = "Missing fields or lookup failure", body = BalanceResponse)
    )
)]
pub async fn fetch_balances_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<FetchBalancesRequest>,
) -> Response {
    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty());
    let (Some(chain_id), Some(address)) = (request.chain_id, address) else {
        return ServerError::ValidationError("Chain ID and address are required".to_string())
            .into_response();
    };

    match lookup(&state, chain_id, address, BalanceQuery::All).await {
        Ok(records) => Json(BalanceResponse::ok(records)).into_response(),
        Err(error) => (
            StatusCode::BAD_REQUEST,
            Json(BalanceResponse::failure(error.to_string())),
        )
            .into_response(),
    }
}

async fn lookup(
    state: &ServerState,
    chain_id: ChainId,
    address: &str,
    query: BalanceQuery,
) -> Result<Vec<NormalizedBalanceRecord>, ServerError> {
    let operation = query.operation();
    inc_requests(chain_id, operation);

    let started = Instant::now();
    let result = state.service().execute(chain_id, address, &query).await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(records) => {
            observe_lookup_duration(operation, "success", elapsed);
            Ok(records)
        }
        Err(error) => {
            observe_lookup_duration(operation, "failure", elapsed);
            let error = ServerError::from(error);
            inc_failures(chain_id, error.kind_label());
            warn!(
                %chain_id,
                address,
                operation,
                status = error.status_code().as_u16(),
                error = %error,
                "balance lookup failed"
            );
            Err(error)
        }
    }
}
