// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Subscan adapter for Substrate relay chains (Polkadot, Kusama)

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    normalize::{integer_string, scale_amount},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// Configuration for one Subscan network
#[derive(Debug, Clone)]
pub struct SubscanConfig {
    /// Chain display name
    pub chain_name: NonEmptyString,
    /// Network API host, e.g. `https://polkadot.api.subscan.io`
    pub base_url: NonEmptyString,
    /// Optional `X-API-Key`
    pub api_key: Option<String>,
    /// Native asset ticker
    pub native_ticker: String,
    /// Planck decimals of the native asset
    pub native_decimals: u8,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<HistoryData>,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(default)]
    list: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    block_num: u64,
    block_timestamp: i64,
    balance: Value,
}

/// Adapter for Subscan-indexed networks
#[derive(Debug, Clone)]
pub struct SubscanAdapter {
    http: UpstreamClient,
    config: SubscanConfig,
    context: RecordContext,
}

impl SubscanAdapter {
    /// Create an adapter from its configuration and a bound HTTP client
    pub fn new(http: UpstreamClient, config: SubscanConfig) -> Self {
        let context = RecordContext::new(http.source_name(), config.chain_name.as_str());
        Self {
            http,
            config,
            context,
        }
    }
}

impl BalanceAdapter for SubscanAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let url = join_url(self.config.base_url.as_str(), "api/scan/account/balance_history");
        debug!(chain = self.context.chain(), %chain_id, address, url, "fetching balance history");

        let mut request = self
            .http
            .post(&url)
            .json(&json!({"address": address, "recent_block": 1}));
        if let Some(api_key) = &self.config.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let raw = self.http.send_json(request).await?;
        let envelope: Envelope = decode(&raw)?;
        if envelope.code != 0 {
            return Err(BalanceError::upstream(format!(
                "Subscan API error: {}",
                envelope.message
            )));
        }

        let latest = envelope
            .data
            .and_then(|data| data.list)
            .and_then(|list| list.into_iter().next())
            .ok_or_else(|| {
                BalanceError::not_found(format!(
                    "Native {} balance not found",
                    self.config.native_ticker
                ))
            })?;
        let entry: HistoryEntry = decode(&latest)?;
        let planck = integer_string(&entry.balance).ok_or_else(|| {
            BalanceError::invalid_response(format!("balance is not an integer: {}", entry.balance))
        })?;

        Ok(self
            .context
            .record(
                address,
                self.config.native_ticker.as_str(),
                scale_amount(&planck, self.config.native_decimals)?,
            )
            .block_id(entry.block_num)
            .timestamp(entry.block_timestamp)
            .raw_response(latest)
            .build())
    }

    async fn get_erc20_balances(
        &self,
        _chain_id: ChainId,
        _address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        Ok(Vec::new())
    }

    async fn get_erc20_balance(
        &self,
        _chain_id: ChainId,
        _address: &str,
        _asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        Err(BalanceError::unsupported(format!(
            "ERC20 tokens are not supported on {}",
            self.config.chain_name
        )))
    }

    fn name(&self) -> &'static str {
        "subscan"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;

    const ADDRESS: &str = "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5";

    fn polkadot(base_url: &str) -> SubscanAdapter {
        SubscanAdapter::new(
            UpstreamClient::new("Polkadot Subscan API", 5).unwrap(),
            SubscanConfig {
                chain_name: NonEmptyString::new("Polkadot").unwrap(),
                base_url: NonEmptyString::new(base_url).unwrap(),
                api_key: None,
                native_ticker: "DOT".to_string(),
                native_decimals: 10,
            },
        )
    }

    #[tokio::test]
    async fn latest_history_entry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/scan/account/balance_history"))
            .and(body_partial_json(json!({"address": ADDRESS})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "Success",
                "generated_at": 1_700_000_100,
                "data": {"list": [
                    {
                        "block_num": 18_000_000,
                        "block_timestamp": 1_700_000_000,
                        "balance": "420000000000"
                    }
                ]}
            })))
            .mount(&mock_server)
            .await;

        let record = polkadot(&mock_server.uri())
            .get_native_balance(ChainId::new(354), ADDRESS)
            .await
            .unwrap();

        assert_eq!(record.ticker, "DOT");
        assert_eq!(record.amount, "42");
        assert_eq!(record.block_id, "18000000");
        assert_eq!(record.timestamp_sec, 1_700_000_000);
    }

    #[tokio::test]
    async fn empty_history_is_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "Success",
                "data": {"list": null}
            })))
            .mount(&mock_server)
            .await;

        let result = polkadot(&mock_server.uri())
            .get_native_balance(ChainId::new(354), ADDRESS)
            .await;
        assert!(matches!(result, Err(BalanceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn api_error_code() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 10004,
                "message": "Record Not Found"
            })))
            .mount(&mock_server)
            .await;

        let error = polkadot(&mock_server.uri())
            .get_native_balance(ChainId::new(354), ADDRESS)
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Subscan API error: Record Not Found");
    }

    #[tokio::test]
    async fn tokens_are_unsupported() {
        let adapter = polkadot("http://127.0.0.1:9");

        let result = adapter
            .get_erc20_balance(ChainId::new(354), ADDRESS, "USDT")
            .await;
        assert!(matches!(result, Err(BalanceError::Unsupported { .. })));
        assert!(
            adapter
                .get_erc20_balances(ChainId::new(354), ADDRESS)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
