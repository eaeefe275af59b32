// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Balance lookup orchestrator
//!
//! Every operation follows the same path: resolve the chain's adapter, run the
//! adapter call, persist the records, report. Any failure along the way
//! (unknown chain, adapter error, sink rejection) fails the whole operation;
//! there are no retries and no partial results.

use std::sync::Arc;

use balance_adapter::{BalanceAdapter, BalanceError};
use chain_adapters::{AdapterRegistry, ChainAdapter};
use shared_types::{BalanceResponse, ChainConfig, ChainId, NormalizedBalanceRecord};
use tracing::{info, instrument, warn};

use crate::sink::{BalanceSink, ConfiguredSink};

/// Which balances to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceQuery {
    /// Native plus every enumerable token
    All,
    /// Native asset only
    Native,
    /// Every enumerable token
    Tokens,
    /// One token by its chain-native identifier
    Token(String),
}

impl BalanceQuery {
    /// Operation label used in logs and metrics
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::All => "balances",
            Self::Native => "native_balance",
            Self::Tokens => "erc20_balances",
            Self::Token(_) => "erc20_balance",
        }
    }
}

/// Routes balance lookups to adapters and persists the results
#[derive(Debug)]
pub struct BalanceService<S = ConfiguredSink, A = ChainAdapter> {
    registry: Arc<AdapterRegistry<A>>,
    sink: S,
}

impl<S, A> BalanceService<S, A>
where
    S: BalanceSink,
    A: BalanceAdapter,
{
    /// Create a service over a registry and a sink
    pub fn new(registry: Arc<AdapterRegistry<A>>, sink: S) -> Self {
        Self { registry, sink }
    }

    /// Underlying registry
    pub fn registry(&self) -> &AdapterRegistry<A> {
        &self.registry
    }

    /// Active sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Every supported chain
    pub fn list_supported_chains(&self) -> Vec<ChainConfig> {
        self.registry.list_supported_chains()
    }

    /// Run one lookup and persist its records
    ///
    /// # Errors
    ///
    /// [`BalanceError::UnknownChain`] when no adapter serves `chain_id`, the
    /// adapter's error when the lookup fails, and
    /// [`BalanceError::Persistence`] when the sink rejects the records.
    #[instrument(skip(self, query), fields(%chain_id, operation = query.operation()))]
    pub async fn execute(
        &self,
        chain_id: ChainId,
        address: &str,
        query: &BalanceQuery,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        let adapter = self
            .registry
            .resolve(chain_id)
            .ok_or(BalanceError::UnknownChain { chain_id })?;

        let records = match query {
            BalanceQuery::All => adapter.get_balances(chain_id, address).await?,
            BalanceQuery::Native => vec![adapter.get_native_balance(chain_id, address).await?],
            BalanceQuery::Tokens => adapter.get_erc20_balances(chain_id, address).await?,
            BalanceQuery::Token(asset_id) => {
                vec![adapter.get_erc20_balance(chain_id, address, asset_id).await?]
            }
        };

        self.sink.insert(&records).await?;

        info!(
            adapter = adapter.name(),
            sink = self.sink.name(),
            records = records.len(),
            "balance lookup complete"
        );
        Ok(records)
    }

    /// Run a lookup and fold the outcome into a [`BalanceResponse`]
    pub async fn respond(
        &self,
        chain_id: ChainId,
        address: &str,
        query: BalanceQuery,
    ) -> BalanceResponse {
        let result = self.execute(chain_id, address, &query).await;
        if let Err(error) = &result {
            warn!(
                %chain_id,
                address,
                operation = query.operation(),
                kind = %error.kind(),
                error = %error,
                "balance lookup failed"
            );
        }
        result.into()
    }

    /// Native and token balances
    pub async fn get_balances(&self, chain_id: ChainId, address: &str) -> BalanceResponse {
        self.respond(chain_id, address, BalanceQuery::All).await
    }

    /// Native balance
    pub async fn get_native_balance(&self, chain_id: ChainId, address: &str) -> BalanceResponse {
        self.respond(chain_id, address, BalanceQuery::Native).await
    }

    /// Enumerable token balances
    pub async fn get_erc20_balances(&self, chain_id: ChainId, address: &str) -> BalanceResponse {
        self.respond(chain_id, address, BalanceQuery::Tokens).await
    }

    /// One token balance
    pub async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> BalanceResponse {
        self.respond(chain_id, address, BalanceQuery::Token(asset_id.to_string()))
            .await
    }

    /// Same as [`Self::get_balances`]; backs the batch fetch endpoint
    pub async fn fetch_balances(&self, chain_id: ChainId, address: &str) -> BalanceResponse {
        self.get_balances(chain_id, address).await
    }
}
