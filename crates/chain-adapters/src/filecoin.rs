// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Filecoin adapter over the Filfox explorer API

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

/// attoFIL per FIL
const FIL_DECIMALS: u8 = 18;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressInfo {
    balance: String,
    #[serde(default, alias = "height")]
    last_seen_height: Option<u64>,
    #[serde(default, alias = "timestamp")]
    last_seen_timestamp: Option<i64>,
}

/// Adapter for Filecoin addresses
#[derive(Debug, Clone)]
pub struct FilecoinAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    context: RecordContext,
}

impl FilecoinAdapter {
    /// Create an adapter against a Filfox deployment
    pub fn new(http: UpstreamClient, base_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "Filecoin");
        Self {
            http,
            base_url,
            context,
        }
    }
}

impl BalanceAdapter for FilecoinAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        let url = join_url(self.base_url.as_str(), &format!("address/{address}"));
        debug!(%chain_id, address, url, "fetching Filecoin address");

        let raw = self.http.send_json(self.http.get(&url)).await?;
        let info: AddressInfo = decode(&raw)?;

        let mut record = self
            .context
            .record(address, "FIL", scale_amount(&info.balance, FIL_DECIMALS)?);
        if let Some(height) = info.last_seen_height {
            record = record.block_id(height);
        }
        if let Some(timestamp) = info.last_seen_timestamp {
            record = record.timestamp(timestamp);
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
        Err(BalanceError::unsupported(
            "ERC20 tokens are not supported on Filecoin",
        ))
    }

    fn name(&self) -> &'static str {
        "filecoin"
    }
}
