// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Arweave gateway adapter
//!
//! `/wallet/{address}/balance` answers with a bare winston amount as text.

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde_json::json;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, join_url},
};

/// winston per AR
const AR_DECIMALS: u8 = 12;

/// Adapter for Arweave wallets
#[derive(Debug, Clone)]
pub struct ArweaveAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    context: RecordContext,
}

impl ArweaveAdapter {
    /// Create an adapter against an Arweave gateway
    pub fn new(http: UpstreamClient, base_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "Arweave");
        Self {
            http,
            base_url,
            context,
        }
    }
}

impl BalanceAdapter for ArweaveAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let url = join_url(self.base_url.as_str(), &format!("wallet/{address}/balance"));
        debug!(%chain_id, address, url, "fetching Arweave balance");

        let winston = self.http.send_text(self.http.get(&url)).await?;
        let winston = winston.trim();

        Ok(self
            .context
            .record(address, "AR", scale_amount(winston, AR_DECIMALS)?)
            .raw_response(json!({"balance": winston}))
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
        Err(BalanceError::unsupported(
            "ERC20 tokens are not supported on Arweave",
        ))
    }

    fn name(&self) -> &'static str {
        "arweave"
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    const WALLET: &str = "vh-NTHVvlKZqRxc8LyyTNok65yQ55a_PJ1zWLb9G2JI";

    #[tokio::test]
    async fn plain_text_balance() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/wallet/{WALLET}/balance")))
            .respond_with(ResponseTemplate::new(200).set_body_string("3500000000000\n"))
            .mount(&mock_server)
            .await;

        let adapter = ArweaveAdapter::new(
            UpstreamClient::new("Arweave API", 5).unwrap(),
            NonEmptyString::new(mock_server.uri()).unwrap(),
        );
        let record = adapter
            .get_native_balance(ChainId::new(900), WALLET)
            .await
            .unwrap();

        assert_eq!(record.ticker, "AR");
        assert_eq!(record.amount, "3.5");
        assert_eq!(record.raw_metadata.raw_response, json!({"balance": "3500000000000"}));
    }

    #[tokio::test]
    async fn non_numeric_body_is_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Invalid address."))
            .mount(&mock_server)
            .await;

        let adapter = ArweaveAdapter::new(
            UpstreamClient::new("Arweave API", 5).unwrap(),
            NonEmptyString::new(mock_server.uri()).unwrap(),
        );
        let result = adapter.get_native_balance(ChainId::new(900), "bad").await;
        assert!(matches!(result, Err(BalanceError::InvalidResponse { .. })));
    }
}
