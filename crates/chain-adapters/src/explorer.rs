// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan-compatible block explorer adapter
//!
//! Covers Etherscan and its per-chain siblings (Arbiscan, Polygonscan, ...)
//! as well as Blockscout instances, which speak the same `module`/`action`
//! query API. The two flavors differ only in how tokens are discovered:
//! Etherscan cannot list holdings, Blockscout can via `action=tokenlist`.

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    abi::{DECIMALS_SELECTOR, SYMBOL_SELECTOR, decode_abi_string, decode_abi_u8},
    normalize::{placeholder_ticker, scale_amount},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::{debug, warn};

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode},
};

/// Decimals assumed for tokens whose metadata cannot be resolved
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Explorer API dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerFlavor {
    /// Etherscan family: no token enumeration, metadata via `module=proxy` calls
    Etherscan,
    /// Blockscout: `tokenlist` enumeration, metadata via `module=token`
    Blockscout,
}

/// Configuration for one explorer-backed chain
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Chain display name
    pub chain_name: NonEmptyString,
    /// Explorer API endpoint, e.g. `https://api.etherscan.io/api`
    pub base_url: NonEmptyString,
    /// Optional API key appended as `apikey`
    pub api_key: Option<String>,
    /// Native asset ticker
    pub native_ticker: String,
    /// Native asset decimals
    pub native_decimals: u8,
    /// API dialect
    pub flavor: ExplorerFlavor,
}

impl ExplorerConfig {
    /// Etherscan-family chain with an 18-decimal native asset
    pub fn etherscan(
        chain_name: NonEmptyString,
        base_url: NonEmptyString,
        native_ticker: &str,
    ) -> Self {
        Self {
            chain_name,
            base_url,
            api_key: None,
            native_ticker: native_ticker.to_string(),
            native_decimals: 18,
            flavor: ExplorerFlavor::Etherscan,
        }
    }

    /// Blockscout chain with an 18-decimal native asset
    pub fn blockscout(
        chain_name: NonEmptyString,
        base_url: NonEmptyString,
        native_ticker: &str,
    ) -> Self {
        Self {
            flavor: ExplorerFlavor::Blockscout,
            ..Self::etherscan(chain_name, base_url, native_ticker)
        }
    }

    /// Attach an API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// Standard explorer response envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: Value,
}

/// Entry of a Blockscout `tokenlist` result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenListEntry {
    balance: String,
    contract_address: String,
    #[serde(default)]
    decimals: String,
    #[serde(default)]
    symbol: String,
    #[serde(default, rename = "type")]
    token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TokenMetadata {
    symbol: String,
    decimals: u8,
}

/// Adapter for Etherscan-compatible explorers
#[derive(Debug, Clone)]
pub struct ExplorerAdapter {
    http: UpstreamClient,
    config: ExplorerConfig,
    context: RecordContext,
}

impl ExplorerAdapter {
    /// Create an adapter from its configuration and a bound HTTP client
    pub fn new(http: UpstreamClient, config: ExplorerConfig) -> Self {
        let context = RecordContext::new(http.source_name(), config.chain_name.as_str());
        Self {
            http,
            config,
            context,
        }
    }

    /// Explorer configuration
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Run a query and require `status == "1"`
    async fn query(&self, params: &[(&str, &str)]) -> Result<(Value, Envelope), BalanceError> {
        let raw = self.send(params).await?;
        let envelope: Envelope = decode(&raw)?;

        if envelope.status != "1" {
            return Err(BalanceError::upstream(format!(
                "API Error: {}",
                if envelope.message.is_empty() {
                    "Unknown error"
                } else {
                    &envelope.message
                }
            )));
        }

        Ok((raw, envelope))
    }

    async fn send(&self, params: &[(&str, &str)]) -> Result<Value, BalanceError> {
        let mut request = self.http.get(self.config.base_url.as_str()).query(params);
        if let Some(api_key) = &self.config.api_key {
            request = request.query(&[("apikey", api_key.as_str())]);
        }

        Ok(self.http.send_json(request).await?)
    }

    fn result_amount(envelope: &Envelope) -> Result<&str, BalanceError> {
        envelope
            .result
            .as_str()
            .ok_or_else(|| BalanceError::invalid_response("explorer result is not a string amount"))
    }

    async fn token_list(
        &self,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        let raw = self
            .send(&[("module", "account"), ("action", "tokenlist"), ("address", address)])
            .await?;
        let envelope: Envelope = decode(&raw)?;

        if envelope.status != "1" {
            // Blockscout reports an empty holding set as status 0 "No tokens found"
            if envelope.message.starts_with("No ") {
                return Ok(Vec::new());
            }
            return Err(BalanceError::upstream(format!("API Error: {}", envelope.message)));
        }

        let entries: Vec<TokenListEntry> = decode(&envelope.result)?;

        entries
            .into_iter()
            .filter(|entry| entry.token_type.is_empty() || entry.token_type == "ERC-20")
            .map(|entry| {
                let decimals = entry.decimals.parse().unwrap_or(DEFAULT_TOKEN_DECIMALS);
                let ticker = if entry.symbol.is_empty() {
                    placeholder_ticker("TOKEN", &entry.contract_address, 6)
                } else {
                    entry.symbol.clone()
                };
                let amount = scale_amount(&entry.balance, decimals)?;

                Ok(self
                    .context
                    .record(address, ticker, amount)
                    .raw_response(json!({
                        "contractAddress": entry.contract_address,
                        "balance": entry.balance,
                        "decimals": entry.decimals,
                        "symbol": entry.symbol,
                    }))
                    .build())
            })
            .collect()
    }

    async fn token_metadata(&self, token: &str) -> TokenMetadata {
        let resolved = match self.config.flavor {
            ExplorerFlavor::Etherscan => {
                let (symbol, decimals) = tokio::join!(
                    self.proxy_call(token, SYMBOL_SELECTOR),
                    self.proxy_call(token, DECIMALS_SELECTOR)
                );
                (
                    symbol.as_deref().and_then(decode_abi_string),
                    decimals.as_deref().and_then(decode_abi_u8),
                )
            }
            ExplorerFlavor::Blockscout => self.get_token(token).await.unwrap_or((None, None)),
        };

        TokenMetadata {
            symbol: resolved
                .0
                .unwrap_or_else(|| placeholder_ticker("TOKEN", token, 6)),
            decimals: resolved.1.unwrap_or(DEFAULT_TOKEN_DECIMALS),
        }
    }

    async fn proxy_call(&self, to: &str, data: &str) -> Option<String> {
        let params = [
            ("module", "proxy"),
            ("action", "eth_call"),
            ("to", to),
            ("data", data),
            ("tag", "latest"),
        ];

        match self.send(&params).await {
            Ok(raw) => raw
                .get("result")
                .and_then(Value::as_str)
                .filter(|result| result.starts_with("0x"))
                .map(ToString::to_string),
            Err(e) => {
                debug!(token = to, selector = data, error = %e, "token metadata call failed");
                None
            }
        }
    }

    async fn get_token(&self, token: &str) -> Option<(Option<String>, Option<u8>)> {
        let (_, envelope) = self
            .query(&[("module", "token"), ("action", "getToken"), ("contractaddress", token)])
            .await
            .map_err(|e| debug!(token, error = %e, "getToken lookup failed"))
            .ok()?;

        let symbol = envelope
            .result
            .get("symbol")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string);
        let decimals = envelope
            .result
            .get("decimals")
            .and_then(Value::as_str)
            .and_then(|d| d.parse().ok());

        Some((symbol, decimals))
    }
}

impl BalanceAdapter for ExplorerAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        let native = self.get_native_balance(chain_id, address).await?;

        match self.config.flavor {
            ExplorerFlavor::Etherscan => {
                warn!(
                    chain = self.context.chain(),
                    %chain_id,
                    "token enumeration unavailable, returning native balance only"
                );
                Ok(vec![native])
            }
            ExplorerFlavor::Blockscout => {
                let mut records = vec![native];
                records.extend(self.token_list(address).await?);
                Ok(records)
            }
        }
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(chain = self.context.chain(), %chain_id, address, "fetching native balance");

        let (raw, envelope) = self
            .query(&[
                ("module", "account"),
                ("action", "balance"),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;

        let amount = scale_amount(Self::result_amount(&envelope)?, self.config.native_decimals)?;

        Ok(self
            .context
            .record(address, self.config.native_ticker.as_str(), amount)
            .raw_response(raw)
            .build())
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        match self.config.flavor {
            ExplorerFlavor::Etherscan => {
                debug!(chain = self.context.chain(), %chain_id, "explorer cannot enumerate tokens");
                Ok(Vec::new())
            }
            ExplorerFlavor::Blockscout => self.token_list(address).await,
        }
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
            token = asset_id,
            "fetching token balance"
        );

        let (raw, envelope) = self
            .query(&[
                ("module", "account"),
                ("action", "tokenbalance"),
                ("contractaddress", asset_id),
                ("address", address),
                ("tag", "latest"),
            ])
            .await?;
        let metadata = self.token_metadata(asset_id).await;
        let amount = scale_amount(Self::result_amount(&envelope)?, metadata.decimals)?;

        Ok(self
            .context
            .record(address, metadata.symbol.as_str(), amount)
            .raw_response(json!({
                "tokenAddress": asset_id,
                "decimals": metadata.decimals,
                "response": raw,
            }))
            .build())
    }

    fn name(&self) -> &'static str {
        match self.config.flavor {
            ExplorerFlavor::Etherscan => "etherscan",
            ExplorerFlavor::Blockscout => "blockscout",
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, query_param},
    };

    use super::*;

    const ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
    const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";

    fn adapter(base_url: &str, flavor: ExplorerFlavor) -> ExplorerAdapter {
        let chain = NonEmptyString::new("Ethereum").unwrap();
        let base_url = NonEmptyString::new(base_url).unwrap();
        let config = match flavor {
            ExplorerFlavor::Etherscan => ExplorerConfig::etherscan(chain, base_url, "ETH"),
            ExplorerFlavor::Blockscout => ExplorerConfig::blockscout(chain, base_url, "ETH"),
        }
        .with_api_key(Some("test-key".to_string()));

        ExplorerAdapter::new(UpstreamClient::new("Ethereum API", 5).unwrap(), config)
    }

    #[tokio::test]
    async fn native_balance_scaled() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "balance"))
            .and(query_param("address", ADDRESS))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "1000000000000000000"
            })))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri(), ExplorerFlavor::Etherscan)
            .get_native_balance(ChainId::new(1), ADDRESS)
            .await
            .unwrap();

        assert_eq!(record.ticker, "ETH");
        assert_eq!(record.amount, "1");
        assert_eq!(record.block_id, "0");
        assert_eq!(record.wallet_id, "bitwave-wallet-id-0x742d35");
        assert_eq!(record.raw_metadata.source, "Ethereum API");
        assert_eq!(record.raw_metadata.raw_response["result"], "1000000000000000000");
    }

    #[tokio::test]
    async fn api_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Invalid API Key"
            })))
            .mount(&mock_server)
            .await;

        let error = adapter(&mock_server.uri(), ExplorerFlavor::Etherscan)
            .get_native_balance(ChainId::new(1), ADDRESS)
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "API Error: NOTOK");
    }

    #[tokio::test]
    async fn etherscan_token_with_resolved_metadata() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "tokenbalance"))
            .and(query_param("contractaddress", USDC))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "2500000"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("action", "eth_call"))
            .and(query_param("data", SYMBOL_SELECTOR))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": format!(
                    "0x{:0>64}{:0>64}{:0<64}",
                    "20",
                    "4",
                    alloy_primitives::hex::encode("USDC")
                )
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("action", "eth_call"))
            .and(query_param("data", DECIMALS_SELECTOR))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": format!("0x{:0>64}", "6")
            })))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri(), ExplorerFlavor::Etherscan)
            .get_erc20_balance(ChainId::new(1), ADDRESS, USDC)
            .await
            .unwrap();

        assert_eq!(record.ticker, "USDC");
        assert_eq!(record.amount, "2.5");
    }

    #[tokio::test]
    async fn etherscan_token_metadata_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "tokenbalance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "1000000000000000000"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("action", "eth_call"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri(), ExplorerFlavor::Etherscan)
            .get_erc20_balance(ChainId::new(1), ADDRESS, USDC)
            .await
            .unwrap();

        assert_eq!(record.ticker, "TOKEN-0xA0b8");
        assert_eq!(record.amount, "1");
    }

    #[tokio::test]
    async fn etherscan_does_not_enumerate() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "0"
            })))
            .mount(&mock_server)
            .await;

        let adapter = adapter(&mock_server.uri(), ExplorerFlavor::Etherscan);
        let tokens = adapter
            .get_erc20_balances(ChainId::new(1), ADDRESS)
            .await
            .unwrap();
        assert!(tokens.is_empty());

        let all = adapter.get_balances(ChainId::new(1), ADDRESS).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].amount, "0");
    }

    #[tokio::test]
    async fn blockscout_token_list() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "tokenlist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": [
                    {
                        "balance": "1500000",
                        "contractAddress": USDC,
                        "decimals": "6",
                        "name": "USD Coin",
                        "symbol": "USDC",
                        "type": "ERC-20"
                    },
                    {
                        "balance": "3",
                        "contractAddress": "0x22c1f6050e56d2876009903609a2cc3fef83b415",
                        "decimals": "",
                        "name": "POAP",
                        "symbol": "POAP",
                        "type": "ERC-721"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let tokens = adapter(&mock_server.uri(), ExplorerFlavor::Blockscout)
            .get_erc20_balances(ChainId::new(100), ADDRESS)
            .await
            .unwrap();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].ticker, "USDC");
        assert_eq!(tokens[0].amount, "1.5");
    }

    #[tokio::test]
    async fn blockscout_empty_token_list() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "tokenlist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "0",
                "message": "No tokens found",
                "result": []
            })))
            .mount(&mock_server)
            .await;

        let tokens = adapter(&mock_server.uri(), ExplorerFlavor::Blockscout)
            .get_erc20_balances(ChainId::new(100), ADDRESS)
            .await
            .unwrap();
        assert!(tokens.is_empty());
    }

    #[tokio::test]
    async fn blockscout_token_metadata_from_get_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "tokenbalance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": "42000000"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("module", "token"))
            .and(query_param("action", "getToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "1",
                "message": "OK",
                "result": {"symbol": "WXDAI", "decimals": "6", "name": "Wrapped XDAI"}
            })))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri(), ExplorerFlavor::Blockscout)
            .get_erc20_balance(ChainId::new(100), ADDRESS, USDC)
            .await
            .unwrap();

        assert_eq!(record.ticker, "WXDAI");
        assert_eq!(record.amount, "42");
    }
}
