// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! SUI adapter over `suix_getAllBalances`
//!
//! Every coin an address owns is keyed by its Move coin type
//! (`package::module::Struct`). The native coin is `0x2::sui::SUI`.

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode},
};

/// Coin type of native SUI
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

const SUI_DECIMALS: u8 = 9;
const USDC_DECIMALS: u8 = 6;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinBalance {
    coin_type: String,
    total_balance: String,
}

/// Ticker and decimals for a Move coin type
fn coin_metadata(coin_type: &str) -> (String, u8) {
    if coin_type == SUI_COIN_TYPE {
        return ("SUI".to_string(), SUI_DECIMALS);
    }
    if coin_type.to_ascii_uppercase().ends_with("::USDC") {
        return ("USDC".to_string(), USDC_DECIMALS);
    }

    let ticker = coin_type
        .split("::")
        .nth(2)
        .filter(|name| !name.is_empty())
        .map_or_else(
            || coin_type.chars().take(10).collect(),
            ToString::to_string,
        );
    (ticker, SUI_DECIMALS)
}

/// Adapter for SUI addresses
#[derive(Debug, Clone)]
pub struct SuiAdapter {
    http: UpstreamClient,
    rpc_url: NonEmptyString,
    context: RecordContext,
}

impl SuiAdapter {
    /// Create an adapter against a SUI full node
    pub fn new(http: UpstreamClient, rpc_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "SUI");
        Self {
            http,
            rpc_url,
            context,
        }
    }

    async fn all_balances(&self, address: &str) -> Result<Vec<(CoinBalance, Value)>, BalanceError> {
        let result = self
            .http
            .json_rpc(self.rpc_url.as_str(), "suix_getAllBalances", json!([address]))
            .await?;

        let entries: Vec<Value> = decode(&result)?;
        entries
            .into_iter()
            .map(|raw| -> Result<_, BalanceError> { Ok((decode(&raw)?, raw)) })
            .collect()
    }

    fn record(
        &self,
        address: &str,
        coin: &CoinBalance,
        raw: Value,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let (ticker, decimals) = coin_metadata(&coin.coin_type);
        let amount = scale_amount(&coin.total_balance, decimals)?;
        Ok(self.context.record(address, ticker, amount).raw_response(raw).build())
    }
}

impl BalanceAdapter for SuiAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching all SUI balances");
        self.all_balances(address)
            .await?
            .into_iter()
            .map(|(coin, raw)| self.record(address, &coin, raw))
            .collect()
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching native SUI balance");
        let (coin, raw) = self
            .all_balances(address)
            .await?
            .into_iter()
            .find(|(coin, _)| coin.coin_type == SUI_COIN_TYPE)
            .ok_or_else(|| BalanceError::not_found("Native SUI balance not found"))?;

        self.record(address, &coin, raw)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching SUI coin balances");
        self.all_balances(address)
            .await?
            .into_iter()
            .filter(|(coin, _)| coin.coin_type != SUI_COIN_TYPE)
            .map(|(coin, raw)| self.record(address, &coin, raw))
            .collect()
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, coin_type = asset_id, "fetching SUI coin balance");
        let (coin, raw) = self
            .all_balances(address)
            .await?
            .into_iter()
            .find(|(coin, _)| coin.coin_type == asset_id)
            .ok_or_else(|| {
                BalanceError::not_found(format!("Token {asset_id} not found for address {address}"))
            })?;

        self.record(address, &coin, raw)
    }

    fn name(&self) -> &'static str {
        "sui"
    }
}
