// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Hedera mirror node adapter
//!
//! The account endpoint returns the HBAR balance in tinybars together with
//! every associated HTS token balance. Token symbols and decimals are not part
//! of that snapshot and are looked up per token.

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    normalize::{current_timestamp, integer_string, scale_amount},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::{debug, warn};

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// Tinybars per HBAR
const HBAR_DECIMALS: u8 = 8;

#[derive(Debug, Deserialize)]
struct AccountSnapshot {
    balance: BalanceSnapshot,
}

#[derive(Debug, Deserialize)]
struct BalanceSnapshot {
    balance: Value,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    tokens: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenBalance {
    token_id: String,
    balance: Value,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    decimals: Value,
}

/// Seconds part of a mirror node `seconds.nanos` consensus timestamp
fn consensus_seconds(timestamp: Option<&str>) -> i64 {
    timestamp
        .and_then(|t| t.split('.').next())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(current_timestamp)
}

fn raw_integer(value: &Value, what: &str) -> Result<String, BalanceError> {
    integer_string(value)
        .ok_or_else(|| BalanceError::invalid_response(format!("{what} is not an integer: {value}")))
}

/// Adapter for Hedera accounts
#[derive(Debug, Clone)]
pub struct HederaAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    context: RecordContext,
}

impl HederaAdapter {
    /// Create an adapter against a mirror node
    pub fn new(http: UpstreamClient, base_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "Hedera");
        Self {
            http,
            base_url,
            context,
        }
    }

    async fn account(&self, address: &str) -> Result<(Value, AccountSnapshot), BalanceError> {
        let url = join_url(self.base_url.as_str(), &format!("api/v1/accounts/{address}"));
        debug!(url, "fetching Hedera account");

        let raw = self.http.send_json(self.http.get(&url)).await?;
        let snapshot = decode(&raw)?;
        Ok((raw, snapshot))
    }

    /// Symbol and decimals of an HTS token, `HTS-{id}` with 0 decimals when unknown
    async fn token_info(&self, token_id: &str) -> (String, u8) {
        let url = join_url(self.base_url.as_str(), &format!("api/v1/tokens/{token_id}"));

        let info = match self.http.send_json(self.http.get(&url)).await {
            Ok(raw) => decode::<TokenInfo>(&raw).ok(),
            Err(e) => {
                warn!(token_id, error = %e, "token metadata lookup failed");
                None
            }
        };

        let symbol = info
            .as_ref()
            .map(|i| i.symbol.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("HTS-{token_id}"));
        let decimals = info
            .as_ref()
            .and_then(|i| integer_string(&i.decimals))
            .and_then(|d| d.parse().ok())
            .unwrap_or(0);

        (symbol, decimals)
    }

    async fn token_record(
        &self,
        address: &str,
        snapshot: &AccountSnapshot,
        token: &TokenBalance,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let (symbol, decimals) = self.token_info(&token.token_id).await;
        let amount = scale_amount(&raw_integer(&token.balance, "token balance")?, decimals)?;

        Ok(self
            .context
            .record(address, symbol, amount)
            .timestamp(consensus_seconds(snapshot.balance.timestamp.as_deref()))
            .raw_response(json!({
                "token_id": token.token_id,
                "balance": token.balance,
                "decimals": decimals,
            }))
            .build())
    }

    async fn token_records(
        &self,
        address: &str,
        snapshot: &AccountSnapshot,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        let mut records = Vec::with_capacity(snapshot.balance.tokens.len());
        for token in &snapshot.balance.tokens {
            records.push(self.token_record(address, snapshot, token).await?);
        }
        Ok(records)
    }

    fn native_record(
        &self,
        address: &str,
        raw: Value,
        snapshot: &AccountSnapshot,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let tinybars = raw_integer(&snapshot.balance.balance, "HBAR balance")?;

        Ok(self
            .context
            .record(address, "HBAR", scale_amount(&tinybars, HBAR_DECIMALS)?)
            .timestamp(consensus_seconds(snapshot.balance.timestamp.as_deref()))
            .raw_response(raw)
            .build())
    }
}

impl BalanceAdapter for HederaAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching all Hedera balances");
        let (raw, snapshot) = self.account(address).await?;

        let mut records = vec![self.native_record(address, raw, &snapshot)?];
        records.extend(self.token_records(address, &snapshot).await?);
        Ok(records)
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching HBAR balance");
        let (raw, snapshot) = self.account(address).await?;
        self.native_record(address, raw, &snapshot)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching HTS token balances");
        let (_, snapshot) = self.account(address).await?;
        self.token_records(address, &snapshot).await
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, token_id = asset_id, "fetching HTS token balance");
        let (_, snapshot) = self.account(address).await?;

        let token = snapshot
            .balance
            .tokens
            .iter()
            .find(|t| t.token_id == asset_id)
            .ok_or_else(|| {
                BalanceError::not_found(format!("Token {asset_id} not found for account {address}"))
            })?;

        self.token_record(address, &snapshot, token).await
    }

    fn name(&self) -> &'static str {
        "hedera"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    const ACCOUNT: &str = "0.0.1234";

    async fn adapter() -> (MockServer, HederaAdapter) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/accounts/{ACCOUNT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "account": ACCOUNT,
                "balance": {
                    "balance": 250_000_000,
                    "timestamp": "1700000000.123456789",
                    "tokens": [
                        {"token_id": "0.0.456858", "balance": 1_500_000},
                        {"token_id": "0.0.999", "balance": 7}
                    ]
                }
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tokens/0.0.456858"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_id": "0.0.456858",
                "symbol": "USDC",
                "decimals": "6",
                "name": "USD Coin"
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/tokens/0.0.999"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let adapter = HederaAdapter::new(
            UpstreamClient::new("Hedera Mirror Node API", 5).unwrap(),
            NonEmptyString::new(mock_server.uri()).unwrap(),
        );
        (mock_server, adapter)
    }

    #[test]
    fn consensus_timestamp_seconds() {
        assert_eq!(consensus_seconds(Some("1700000000.123456789")), 1_700_000_000);
        assert!(consensus_seconds(None) > 1_700_000_000);
    }

    #[tokio::test]
    async fn hbar_balance() {
        let (_server, adapter) = adapter().await;

        let record = adapter
            .get_native_balance(ChainId::new(295), ACCOUNT)
            .await
            .unwrap();

        assert_eq!(record.ticker, "HBAR");
        assert_eq!(record.amount, "2.5");
        assert_eq!(record.timestamp_sec, 1_700_000_000);
        assert_eq!(record.remote_wallet_id, ACCOUNT);
    }

    #[tokio::test]
    async fn token_metadata_and_fallback() {
        let (_server, adapter) = adapter().await;

        let tokens = adapter
            .get_erc20_balances(ChainId::new(295), ACCOUNT)
            .await
            .unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].ticker, "USDC");
        assert_eq!(tokens[0].amount, "1.5");
        assert_eq!(tokens[1].ticker, "HTS-0.0.999");
        assert_eq!(tokens[1].amount, "7");

        let all = adapter.get_balances(ChainId::new(295), ACCOUNT).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn unassociated_token() {
        let (_server, adapter) = adapter().await;

        let result = adapter
            .get_erc20_balance(ChainId::new(295), ACCOUNT, "0.0.1")
            .await;
        assert!(matches!(result, Err(BalanceError::NotFound { .. })));
    }
}
