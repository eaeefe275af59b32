// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Stellar Horizon adapter
//!
//! Horizon reports balances already scaled to seven decimal places.
//! Credit assets are identified as `CODE:ISSUER`.

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    normalize::{current_timestamp, normalize_decimal},
};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

#[derive(Debug, Deserialize)]
struct Account {
    last_modified_ledger: u64,
    #[serde(default)]
    last_modified_time: Option<String>,
    balances: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Balance {
    balance: String,
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
}

impl Balance {
    fn asset_id(&self) -> Option<String> {
        Some(format!("{}:{}", self.asset_code.as_ref()?, self.asset_issuer.as_ref()?))
    }
}

/// Adapter for Stellar accounts
#[derive(Debug, Clone)]
pub struct StellarAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    context: RecordContext,
}

impl StellarAdapter {
    /// Create an adapter against a Horizon server
    pub fn new(http: UpstreamClient, base_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "Stellar");
        Self {
            http,
            base_url,
            context,
        }
    }

    async fn account(
        &self,
        address: &str,
    ) -> Result<(Account, Vec<(Balance, Value)>), BalanceError> {
        let url = join_url(self.base_url.as_str(), &format!("accounts/{address}"));
        debug!(url, "fetching Horizon account");

        let raw = self.http.send_json(self.http.get(&url)).await?;
        let account: Account = decode(&raw)?;
        let balances = account
            .balances
            .iter()
            .map(|entry| -> Result<_, BalanceError> { Ok((decode(entry)?, entry.clone())) })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((account, balances))
    }

    fn record(
        &self,
        address: &str,
        account: &Account,
        balance: &Balance,
        raw: Value,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let ticker = if balance.asset_type == "native" {
            "XLM".to_string()
        } else {
            balance.asset_code.clone().unwrap_or_else(|| balance.asset_type.to_uppercase())
        };
        let timestamp = account
            .last_modified_time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map_or_else(current_timestamp, |t| t.timestamp());

        Ok(self
            .context
            .record(address, ticker, normalize_decimal(&balance.balance)?)
            .block_id(account.last_modified_ledger)
            .timestamp(timestamp)
            .raw_response(raw)
            .build())
    }

    fn is_credit(balance: &Balance) -> bool {
        balance.asset_type != "native" && balance.asset_type != "liquidity_pool_shares"
    }
}

impl BalanceAdapter for StellarAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching all Stellar balances");
        let (account, balances) = self.account(address).await?;

        balances
            .into_iter()
            .filter(|(balance, _)| balance.asset_type != "liquidity_pool_shares")
            .map(|(balance, raw)| self.record(address, &account, &balance, raw))
            .collect()
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching native XLM balance");
        let (account, balances) = self.account(address).await?;

        let (balance, raw) = balances
            .into_iter()
            .find(|(balance, _)| balance.asset_type == "native")
            .ok_or_else(|| BalanceError::not_found("Native XLM balance not found"))?;

        self.record(address, &account, &balance, raw)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching Stellar credit assets");
        let (account, balances) = self.account(address).await?;

        balances
            .into_iter()
            .filter(|(balance, _)| Self::is_credit(balance))
            .map(|(balance, raw)| self.record(address, &account, &balance, raw))
            .collect()
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let Some((code, issuer)) = asset_id
            .split_once(':')
            .filter(|(code, issuer)| !code.is_empty() && !issuer.is_empty())
        else {
            return Err(BalanceError::not_found(format!(
                "Invalid Stellar asset id {asset_id}, expected CODE:ISSUER"
            )));
        };
        debug!(%chain_id, address, code, issuer, "fetching Stellar credit asset");

        let (account, balances) = self.account(address).await?;
        let (balance, raw) = balances
            .into_iter()
            .find(|(balance, _)| balance.asset_id().as_deref() == Some(asset_id))
            .ok_or_else(|| {
                BalanceError::not_found(format!("Asset {asset_id} not found for account {address}"))
            })?;

        self.record(address, &account, &balance, raw)
    }

    fn name(&self) -> &'static str {
        "stellar"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    const ACCOUNT: &str = "GAAZI4TCR3TY5OJHCTJC2A4QSY6CJWJH5IAJTGKIN2ER7LBNVKOCCWN7";
    const USDC_ISSUER: &str = "GA5ZSEJYB37JRC5AVCIA5MOP4RHTM335X2KGX3IHOJAPP5RE34K4KZVN";

    async fn adapter() -> (MockServer, StellarAdapter) {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/accounts/{ACCOUNT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": ACCOUNT,
                "account_id": ACCOUNT,
                "sequence": "1",
                "last_modified_ledger": 50_123_456,
                "last_modified_time": "2024-03-01T12:00:00Z",
                "balances": [
                    {
                        "balance": "12.5000000",
                        "limit": "922337203685.4775807",
                        "asset_type": "credit_alphanum4",
                        "asset_code": "USDC",
                        "asset_issuer": USDC_ISSUER
                    },
                    {"balance": "100.0000000", "asset_type": "native"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let adapter = StellarAdapter::new(
            UpstreamClient::new("Stellar Horizon API", 5).unwrap(),
            NonEmptyString::new(mock_server.uri()).unwrap(),
        );
        (mock_server, adapter)
    }

    #[tokio::test]
    async fn native_balance_uses_ledger_and_time() {
        let (_server, adapter) = adapter().await;

        let record = adapter
            .get_native_balance(ChainId::new(148), ACCOUNT)
            .await
            .unwrap();

        assert_eq!(record.ticker, "XLM");
        assert_eq!(record.amount, "100");
        assert_eq!(record.block_id, "50123456");
        assert_eq!(record.timestamp_sec, 1_709_294_400);
    }

    #[tokio::test]
    async fn credit_asset_by_code_and_issuer() {
        let (_server, adapter) = adapter().await;
        let asset_id = format!("USDC:{USDC_ISSUER}");

        let record = adapter
            .get_erc20_balance(ChainId::new(148), ACCOUNT, &asset_id)
            .await
            .unwrap();
        assert_eq!(record.ticker, "USDC");
        assert_eq!(record.amount, "12.5");

        let tokens = adapter
            .get_erc20_balances(ChainId::new(148), ACCOUNT)
            .await
            .unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[tokio::test]
    async fn malformed_and_missing_assets() {
        let (_server, adapter) = adapter().await;

        let result = adapter
            .get_erc20_balance(ChainId::new(148), ACCOUNT, "USDC")
            .await;
        assert!(matches!(result, Err(BalanceError::NotFound { .. })));

        let result = adapter
            .get_erc20_balance(
                ChainId::new(148),
                ACCOUNT,
                "EURC:GDHU6WRG4IEQXM5NZ4BMPKOXHW76MZM4Y2IEMFDVXBSDP6SJY4ITNPP2",
            )
            .await;
        assert!(matches!(result, Err(BalanceError::NotFound { .. })));
    }
}
