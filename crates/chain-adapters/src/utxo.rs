// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! UTXO chain adapter for address-indexing explorers
//!
//! BlockCypher and Blockchain.info both return a `final_balance` in satoshis
//! and a newest-first transaction list; they differ in path and list name.

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use serde_json::Value;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// Satoshis per coin
const SATOSHI_DECIMALS: u8 = 8;

/// Explorer API dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtxoExplorer {
    /// `GET /addrs/{address}` with `txrefs`
    BlockCypher,
    /// `GET /rawaddr/{address}` with `txs`
    BlockchainInfo,
}

impl UtxoExplorer {
    fn path(self, address: &str) -> String {
        match self {
            Self::BlockCypher => format!("addrs/{address}"),
            Self::BlockchainInfo => format!("rawaddr/{address}"),
        }
    }

    fn tx_list(self) -> &'static str {
        match self {
            Self::BlockCypher => "txrefs",
            Self::BlockchainInfo => "txs",
        }
    }
}

/// Configuration for one UTXO chain
#[derive(Debug, Clone)]
pub struct UtxoConfig {
    /// Chain display name
    pub chain_name: NonEmptyString,
    /// Explorer base URL
    pub base_url: NonEmptyString,
    /// Native asset ticker
    pub ticker: String,
    /// Explorer dialect
    pub explorer: UtxoExplorer,
}

#[derive(Debug, Deserialize)]
struct AddressSummary {
    final_balance: u64,
}

/// Adapter for UTXO chains
#[derive(Debug, Clone)]
pub struct UtxoAdapter {
    http: UpstreamClient,
    config: UtxoConfig,
    context: RecordContext,
}

impl UtxoAdapter {
    /// Create an adapter from its configuration and a bound HTTP client
    pub fn new(http: UpstreamClient, config: UtxoConfig) -> Self {
        let context = RecordContext::new(http.source_name(), config.chain_name.as_str());
        Self {
            http,
            config,
            context,
        }
    }

    /// Height of the newest confirmed transaction touching the address
    fn newest_block(&self, raw: &Value) -> Option<u64> {
        raw.get(self.config.explorer.tx_list())?
            .as_array()?
            .iter()
            .find_map(|tx| tx.get("block_height")?.as_u64())
    }
}

impl BalanceAdapter for UtxoAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let url = join_url(self.config.base_url.as_str(), &self.config.explorer.path(address));
        debug!(chain = self.context.chain(), %chain_id, address, url, "fetching address summary");

        let raw = self
            .http
            .send_json(self.http.get(&url).query(&[("limit", "1")]))
            .await?;
        let summary: AddressSummary = decode(&raw)?;

        let mut record = self.context.record(
            address,
            self.config.ticker.as_str(),
            scale_amount(&summary.final_balance.to_string(), SATOSHI_DECIMALS)?,
        );
        if let Some(height) = self.newest_block(&raw) {
            record = record.block_id(height);
        }

        Ok(record.raw_response(raw).build())
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
        match self.config.explorer {
            UtxoExplorer::BlockCypher => "blockcypher",
            UtxoExplorer::BlockchainInfo => "blockchain-info",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    fn adapter(base_url: &str, explorer: UtxoExplorer, ticker: &str) -> UtxoAdapter {
        UtxoAdapter::new(
            UpstreamClient::new("Explorer API", 5).unwrap(),
            UtxoConfig {
                chain_name: NonEmptyString::new("Test").unwrap(),
                base_url: NonEmptyString::new(base_url).unwrap(),
                ticker: ticker.to_string(),
                explorer,
            },
        )
    }

    #[tokio::test]
    async fn blockcypher_litecoin() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/addrs/LcHKx2Lc9kD2dYzs1cWJbTnWXJtRwGcDg2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": "LcHKx2Lc9kD2dYzs1cWJbTnWXJtRwGcDg2",
                "final_balance": 150_000_000,
                "txrefs": [
                    {"tx_hash": "a", "block_height": 2_600_000},
                    {"tx_hash": "b", "block_height": 2_500_000}
                ]
            })))
            .mount(&mock_server)
            .await;

        let record = adapter(&mock_server.uri(), UtxoExplorer::BlockCypher, "LTC")
            .get_native_balance(ChainId::new(2), "LcHKx2Lc9kD2dYzs1cWJbTnWXJtRwGcDg2")
            .await
            .unwrap();

        assert_eq!(record.ticker, "LTC");
        assert_eq!(record.amount, "1.5");
        assert_eq!(record.block_id, "2600000");
    }

    #[tokio::test]
    async fn blockchain_info_without_transactions() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rawaddr/1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
                "final_balance": 0,
                "txs": []
            })))
            .mount(&mock_server)
            .await;

        let adapter = adapter(&mock_server.uri(), UtxoExplorer::BlockchainInfo, "BTC");
        let record = adapter
            .get_native_balance(ChainId::new(0), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
            .await
            .unwrap();

        assert_eq!(record.amount, "0");
        assert_eq!(record.block_id, "0");

        let result = adapter
            .get_erc20_balance(ChainId::new(0), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "x")
            .await;
        assert!(matches!(result, Err(BalanceError::Unsupported { .. })));
    }
}
