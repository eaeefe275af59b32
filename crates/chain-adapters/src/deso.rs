// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! DeSo adapter over `get-users-stateless`

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// nanos per DESO
const DESO_DECIMALS: u8 = 9;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UsersResponse {
    #[serde(default)]
    user_list: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct User {
    balance_nanos: u64,
}

/// Adapter for DeSo public keys
#[derive(Debug, Clone)]
pub struct DesoAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    context: RecordContext,
}

impl DesoAdapter {
    /// Create an adapter against a DeSo node API
    pub fn new(http: UpstreamClient, base_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "Deso");
        Self {
            http,
            base_url,
            context,
        }
    }
}

impl BalanceAdapter for DesoAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let url = join_url(self.base_url.as_str(), "get-users-stateless");
        debug!(%chain_id, address, url, "fetching DeSo user");

        let request = self.http.post(&url).json(&json!({
            "PublicKeysBase58Check": [address],
            "SkipForLeaderboard": true,
        }));
        let raw = self.http.send_json(request).await?;
        let response: UsersResponse = decode(&raw)?;

        let user = response
            .user_list
            .and_then(|users| users.into_iter().next())
            .ok_or_else(|| BalanceError::not_found(format!("DeSo user {address} not found")))?;
        let nanos = decode::<User>(&user)?.balance_nanos;

        Ok(self
            .context
            .record(address, "DESO", scale_amount(&nanos.to_string(), DESO_DECIMALS)?)
            .raw_response(json!({"BalanceNanos": nanos, "PublicKeyBase58Check": address}))
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
        Err(BalanceError::unsupported("ERC20 tokens are not supported on Deso"))
    }

    fn name(&self) -> &'static str {
        "deso"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, method, path},
    };

    use super::*;

    const KEY: &str = "BC1YLhBLE1834FBJbQ9JU23JbPanNYMkUsdpJZrFVqNGsCe7YadYiUg";

    fn adapter(base_url: &str) -> DesoAdapter {
        DesoAdapter::new(
            UpstreamClient::new("Deso API", 5).unwrap(),
            NonEmptyString::new(base_url).unwrap(),
        )
    }

    #[tokio::test]
    async fn balance_nanos() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/get-users-stateless"))
            .and(body_partial_json(json!({"PublicKeysBase58Check": [KEY]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "UserList": [{
                    "PublicKeyBase58Check": KEY,
                    "ProfileEntryResponse": null,
                    "BalanceNanos": 2_500_000_000_u64
                }]
            })))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri())
            .get_native_balance(ChainId::new(555), KEY)
            .await
            .unwrap();

        assert_eq!(record.ticker, "DESO");
        assert_eq!(record.amount, "2.5");
    }

    #[tokio::test]
    async fn unknown_user() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"UserList": null})))
            .mount(&mock_server)
            .await;

        let result = adapter(&mock_server.uri())
            .get_native_balance(ChainId::new(555), KEY)
            .await;
        assert!(matches!(result, Err(BalanceError::NotFound { .. })));
    }
}
