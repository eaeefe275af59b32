// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Stacks adapter over the Hiro API balances endpoint

use std::collections::BTreeMap;

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::{debug, warn};

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// microSTX per STX
const STX_DECIMALS: u8 = 6;

#[derive(Debug, Deserialize)]
struct Balances {
    stx: StxBalance,
    #[serde(default)]
    fungible_tokens: BTreeMap<String, FungibleBalance>,
}

#[derive(Debug, Deserialize)]
struct StxBalance {
    balance: String,
}

#[derive(Debug, Deserialize)]
struct FungibleBalance {
    balance: String,
}

#[derive(Debug, Deserialize)]
struct TokenMetadata {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    decimals: Option<u8>,
}

/// Ticker for a `contract::asset` token identifier
fn token_ticker(token_id: &str) -> String {
    token_id
        .split_once("::")
        .map_or(token_id, |(_, name)| name)
        .to_uppercase()
}

/// Adapter for Stacks addresses
#[derive(Debug, Clone)]
pub struct StacksAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    api_key: Option<String>,
    context: RecordContext,
}

impl StacksAdapter {
    /// Create an adapter against a Hiro API deployment
    pub fn new(http: UpstreamClient, base_url: NonEmptyString, api_key: Option<String>) -> Self {
        let context = RecordContext::new(http.source_name(), "Stacks");
        Self {
            http,
            base_url,
            api_key,
            context,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(url);
        match &self.api_key {
            Some(api_key) => request.header("x-api-key", api_key),
            None => request,
        }
    }

    async fn balances(&self, address: &str) -> Result<(Value, Balances), BalanceError> {
        let url = join_url(
            self.base_url.as_str(),
            &format!("extended/v1/address/{address}/balances"),
        );
        debug!(url, "fetching Stacks balances");

        let raw = self.http.send_json(self.get(&url)).await?;
        let balances = decode(&raw)?;
        Ok((raw, balances))
    }

    /// Symbol and decimals of a SIP-010 token from the Hiro metadata API
    ///
    /// Falls back to the asset name and base units when the lookup fails.
    async fn token_info(&self, token_id: &str) -> (String, u8) {
        let contract = token_id.split_once("::").map_or(token_id, |(contract, _)| contract);
        let url = join_url(self.base_url.as_str(), &format!("metadata/v1/ft/{contract}"));

        let metadata = match self.http.send_json(self.get(&url)).await {
            Ok(raw) => decode::<TokenMetadata>(&raw).ok(),
            Err(e) => {
                warn!(token_id, error = %e, "token metadata lookup failed");
                None
            }
        };

        let symbol = metadata
            .as_ref()
            .and_then(|m| m.symbol.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| token_ticker(token_id));
        let decimals = metadata.and_then(|m| m.decimals).unwrap_or_else(|| {
            warn!(token_id, "token decimals unknown, reporting base units");
            0
        });

        (symbol, decimals)
    }

    async fn token_record(
        &self,
        address: &str,
        token_id: &str,
        token: &FungibleBalance,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let (symbol, decimals) = self.token_info(token_id).await;

        Ok(self
            .context
            .record(address, symbol, scale_amount(&token.balance, decimals)?)
            .raw_response(json!({
                "token_id": token_id,
                "balance": token.balance,
                "decimals": decimals,
            }))
            .build())
    }

    async fn token_records(
        &self,
        address: &str,
        balances: &Balances,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        let mut records = Vec::with_capacity(balances.fungible_tokens.len());
        for (token_id, token) in &balances.fungible_tokens {
            records.push(self.token_record(address, token_id, token).await?);
        }
        Ok(records)
    }

    fn native_record(
        &self,
        address: &str,
        raw: &Value,
        balances: &Balances,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        Ok(self
            .context
            .record(address, "STX", scale_amount(&balances.stx.balance, STX_DECIMALS)?)
            .raw_response(raw.get("stx").cloned().unwrap_or(Value::Null))
            .build())
    }
}

impl BalanceAdapter for StacksAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching all Stacks balances");
        let (raw, balances) = self.balances(address).await?;

        let mut records = vec![self.native_record(address, &raw, &balances)?];
        records.extend(self.token_records(address, &balances).await?);
        Ok(records)
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching STX balance");
        let (raw, balances) = self.balances(address).await?;
        self.native_record(address, &raw, &balances)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching Stacks fungible tokens");
        let (_, balances) = self.balances(address).await?;
        self.token_records(address, &balances).await
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, token_id = asset_id, "fetching Stacks fungible token");
        let (_, balances) = self.balances(address).await?;

        let token = balances.fungible_tokens.get(asset_id).ok_or_else(|| {
            BalanceError::not_found(format!("Token {asset_id} not found for address {address}"))
        })?;

        self.token_record(address, asset_id, token).await
    }

    fn name(&self) -> &'static str {
        "stacks"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    const ADDRESS: &str = "SP3FBR2AGK5H9QBDH3EEN6DF8EK8JY7RX8QJ5SVTE";
    const ALEX: &str = "SP102V8P0F7JX67ARQ77WEA3D3CFB5XW39REDT0AM.token-alex::alex";
    const USDA: &str = "SP2C2YFP12AJZB4MABJBAJ55XECVS7E4PMMZ89YZR.usda-token::usda";

    async fn adapter(api_key: Option<&str>) -> (MockServer, StacksAdapter) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/extended/v1/address/{ADDRESS}/balances")))
            .and(header("x-api-key", "hiro-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stx": {"balance": "1500000", "total_sent": "0", "total_received": "1500000"},
                "fungible_tokens": {
                    ALEX: {"balance": "420", "total_sent": "0", "total_received": "420"},
                    USDA: {"balance": "1000000", "total_sent": "0", "total_received": "1000000"}
                },
                "non_fungible_tokens": {}
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(
                "/metadata/v1/ft/SP2C2YFP12AJZB4MABJBAJ55XECVS7E4PMMZ89YZR.usda-token",
            ))
            .and(header("x-api-key", "hiro-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "USDA",
                "symbol": "USDA",
                "decimals": 6,
                "total_supply": "1000000000000"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let adapter = StacksAdapter::new(
            UpstreamClient::new("Stacks API", 5).unwrap(),
            NonEmptyString::new(mock_server.uri()).unwrap(),
            api_key.map(ToString::to_string),
        );
        (mock_server, adapter)
    }

    #[test]
    fn ticker_from_token_id() {
        assert_eq!(token_ticker(ALEX), "ALEX");
        assert_eq!(token_ticker("plain"), "PLAIN");
    }

    #[tokio::test]
    async fn stx_and_tokens() {
        let (_server, adapter) = adapter(Some("hiro-key")).await;
        let chain = ChainId::new(5757);

        let native = adapter.get_native_balance(chain, ADDRESS).await.unwrap();
        assert_eq!(native.ticker, "STX");
        assert_eq!(native.amount, "1.5");

        assert_eq!(adapter.get_balances(chain, ADDRESS).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn token_decimals_come_from_metadata() {
        let (_server, adapter) = adapter(Some("hiro-key")).await;

        let token = adapter
            .get_erc20_balance(ChainId::new(5757), ADDRESS, USDA)
            .await
            .unwrap();
        assert_eq!(token.ticker, "USDA");
        assert_eq!(token.amount, "1");
        assert_eq!(token.raw_metadata.raw_response["decimals"], 6);
    }

    #[tokio::test]
    async fn failed_metadata_lookup_keeps_base_units() {
        let (_server, adapter) = adapter(Some("hiro-key")).await;

        let token = adapter
            .get_erc20_balance(ChainId::new(5757), ADDRESS, ALEX)
            .await
            .unwrap();
        assert_eq!(token.ticker, "ALEX");
        assert_eq!(token.amount, "420");
    }

    #[tokio::test]
    async fn missing_key_is_authentication_failure() {
        let (_server, adapter) = adapter(None).await;

        let result = adapter.get_native_balance(ChainId::new(5757), ADDRESS).await;
        assert!(matches!(result, Err(BalanceError::Authentication { .. })));
    }
}
