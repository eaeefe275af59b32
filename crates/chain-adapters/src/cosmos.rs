// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Cosmos SDK bank-module adapter
//!
//! Balances come from `/cosmos/bank/v1beta1/balances/{address}` on a chain's
//! REST (LCD) endpoint, a flat list of `{denom, amount}` pairs. The native
//! denom is chain specific and resolved through [`native_denom`].

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    normalize::{placeholder_ticker, scale_amount},
};
use serde::Deserialize;
use serde_json::json;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// Decimals of `u`-prefixed micro denoms
const MICRO_DECIMALS: u8 = 6;

/// Decimals of bridged Ethereum assets missing from [`GRAVITY_ASSETS`]
const GRAVITY_DEFAULT_DECIMALS: u8 = 18;

/// Gravity Bridge assets keyed by their Ethereum contract: ticker and decimals
const GRAVITY_ASSETS: &[(&str, &str, u8)] = &[
    ("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6),
    ("0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6),
    ("0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18),
];

fn gravity_asset(contract: &str) -> Option<(&'static str, u8)> {
    GRAVITY_ASSETS
        .iter()
        .find(|(address, _, _)| address.eq_ignore_ascii_case(contract))
        .map(|(_, ticker, decimals)| (*ticker, *decimals))
}

/// Native denoms of the supported Cosmos chains
const NATIVE_DENOMS: &[(&str, &str)] = &[
    ("Evmos", "aevmos"),
    ("Umee", "uumee"),
    ("Kyve", "ukyve"),
    ("Persistence", "uxprt"),
    ("Axelar", "uaxl"),
    ("Celestia", "utia"),
    ("Kava", "ukava"),
    ("Agoric", "ubld"),
    ("Akash", "uakt"),
    ("Regen", "uregen"),
    ("Provenance", "nhash"),
    ("Osmosis", "uosmo"),
];

/// Resolve a chain's native denom, deriving `u{ticker}` for unknown chains
pub fn native_denom(chain_name: &str, native_ticker: &str) -> String {
    NATIVE_DENOMS
        .iter()
        .find(|(name, _)| *name == chain_name)
        .map_or_else(
            || format!("u{}", native_ticker.to_lowercase()),
            |(_, denom)| (*denom).to_string(),
        )
}

/// Decimals of a native denom, read from its unit prefix
pub fn native_decimals(denom: &str) -> u8 {
    match denom {
        "nhash" => 9,
        d if d.starts_with('a') => 18,
        _ => MICRO_DECIMALS,
    }
}

/// Configuration for one Cosmos chain
#[derive(Debug, Clone)]
pub struct CosmosConfig {
    /// Chain display name
    pub chain_name: NonEmptyString,
    /// LCD endpoint, e.g. `https://rest.cosmos.directory/osmosis`
    pub base_url: NonEmptyString,
    /// Native asset ticker
    pub native_ticker: String,
    /// Native denom, e.g. `uosmo`
    pub native_denom: String,
    /// Extra denom to ticker mappings for chain-issued assets
    pub known_denoms: Vec<(String, String)>,
}

impl CosmosConfig {
    /// Configuration with the native denom resolved from the built-in table
    pub fn new(chain_name: NonEmptyString, base_url: NonEmptyString, native_ticker: &str) -> Self {
        let native_denom = native_denom(chain_name.as_str(), native_ticker);
        Self {
            chain_name,
            base_url,
            native_ticker: native_ticker.to_string(),
            native_denom,
            known_denoms: Vec::new(),
        }
    }

    /// Map a chain-issued denom to its ticker
    #[must_use]
    pub fn with_denom(mut self, denom: &str, ticker: &str) -> Self {
        self.known_denoms.push((denom.to_string(), ticker.to_string()));
        self
    }

    /// Ticker for any denom the account may hold
    pub fn ticker_for(&self, denom: &str) -> String {
        if denom == self.native_denom {
            return self.native_ticker.clone();
        }
        if let Some((_, ticker)) = self.known_denoms.iter().find(|(d, _)| d == denom) {
            return ticker.clone();
        }
        if let Some(hash) = denom.strip_prefix("ibc/") {
            return placeholder_ticker("IBC", hash, 6);
        }
        if let Some(contract) = denom.strip_prefix("gravity") {
            return gravity_asset(contract).map_or_else(
                || placeholder_ticker("ETH", contract, 6),
                |(ticker, _)| ticker.to_string(),
            );
        }
        denom.to_uppercase()
    }

    /// Decimals used to scale `denom` amounts
    ///
    /// Gravity Bridge denoms keep the decimals of the Ethereum token they
    /// wrap; unlisted contracts assume 18.
    pub fn decimals_for(&self, denom: &str) -> u8 {
        if denom == self.native_denom {
            return native_decimals(denom);
        }
        match denom.strip_prefix("gravity") {
            Some(contract) => {
                gravity_asset(contract).map_or(GRAVITY_DEFAULT_DECIMALS, |(_, decimals)| decimals)
            }
            None => MICRO_DECIMALS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BankBalances {
    balances: Vec<Coin>,
}

#[derive(Debug, Deserialize)]
struct Coin {
    denom: String,
    amount: String,
}

/// Adapter for Cosmos SDK chains
#[derive(Debug, Clone)]
pub struct CosmosAdapter {
    http: UpstreamClient,
    config: CosmosConfig,
    context: RecordContext,
}

impl CosmosAdapter {
    /// Create an adapter from its configuration and a bound HTTP client
    pub fn new(http: UpstreamClient, config: CosmosConfig) -> Self {
        let context = RecordContext::new(http.source_name(), config.chain_name.as_str());
        Self {
            http,
            config,
            context,
        }
    }

    async fn balances(&self, address: &str) -> Result<Vec<Coin>, BalanceError> {
        let url = join_url(
            self.config.base_url.as_str(),
            &format!("cosmos/bank/v1beta1/balances/{address}"),
        );
        debug!(chain = self.context.chain(), url, "querying bank balances");

        let raw = self.http.send_json(self.http.get(&url)).await?;
        let parsed: BankBalances = decode(&raw)?;
        Ok(parsed.balances)
    }

    fn record(&self, address: &str, coin: &Coin) -> Result<NormalizedBalanceRecord, BalanceError> {
        let amount = scale_amount(&coin.amount, self.config.decimals_for(&coin.denom))?;
        Ok(self
            .context
            .record(address, self.config.ticker_for(&coin.denom), amount)
            .raw_response(json!({"denom": coin.denom, "amount": coin.amount}))
            .build())
    }
}

impl BalanceAdapter for CosmosAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(chain = self.context.chain(), %chain_id, address, "fetching all balances");
        let coins = self.balances(address).await?;

        coins.iter().map(|coin| self.record(address, coin)).collect()
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(chain = self.context.chain(), %chain_id, address, "fetching native balance");
        let coins = self.balances(address).await?;

        let coin = coins
            .iter()
            .find(|coin| coin.denom == self.config.native_denom)
            .ok_or_else(|| {
                BalanceError::not_found(format!(
                    "Native {} balance not found",
                    self.config.native_ticker
                ))
            })?;

        self.record(address, coin)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(chain = self.context.chain(), %chain_id, address, "fetching token balances");
        let coins = self.balances(address).await?;

        coins
            .iter()
            .filter(|coin| coin.denom != self.config.native_denom)
            .map(|coin| self.record(address, coin))
            .collect()
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(
            chain = self.context.chain(),
            %chain_id,
            address,
            denom = asset_id,
            "fetching token balance"
        );
        let coins = self.balances(address).await?;

        let coin = coins
            .iter()
            .find(|coin| coin.denom == asset_id)
            .ok_or_else(|| {
                BalanceError::not_found(format!("Token {asset_id} not found for account {address}"))
            })?;

        self.record(address, coin)
    }

    fn name(&self) -> &'static str {
        "cosmos"
    }
}
