// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! NEAR Protocol adapter over the `query`/`view_account` RPC

use balance_adapter::{BalanceAdapter, BalanceError, RecordContext, normalize::scale_amount};
use serde::Deserialize;
use serde_json::json;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode},
};

/// yoctoNEAR per NEAR
const NEAR_DECIMALS: u8 = 24;

#[derive(Debug, Deserialize)]
struct ViewAccount {
    amount: String,
    block_height: u64,
}

/// Adapter for NEAR accounts
#[derive(Debug, Clone)]
pub struct NearAdapter {
    http: UpstreamClient,
    rpc_url: NonEmptyString,
    context: RecordContext,
}

impl NearAdapter {
    /// Create an adapter against a NEAR RPC endpoint
    pub fn new(http: UpstreamClient, rpc_url: NonEmptyString) -> Self {
        let context = RecordContext::new(http.source_name(), "NEAR");
        Self {
            http,
            rpc_url,
            context,
        }
    }
}

impl BalanceAdapter for NearAdapter {
    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching NEAR account");

        let result = self
            .http
            .json_rpc(
                self.rpc_url.as_str(),
                "query",
                json!({
                    "request_type": "view_account",
                    "finality": "final",
                    "account_id": address,
                }),
            )
            .await?;

        // older nodes report unknown accounts inside an otherwise successful result
        if let Some(error) = result.get("error").and_then(|e| e.as_str()) {
            return Err(BalanceError::upstream(format!("NEAR RPC error: {error}")));
        }

        let account: ViewAccount = decode(&result)?;
        let amount = scale_amount(&account.amount, NEAR_DECIMALS)?;

        Ok(self
            .context
            .record(address, "NEAR", amount)
            .block_id(account.block_height)
            .raw_response(result)
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
            "ERC20 tokens are not supported on NEAR",
        ))
    }

    fn name(&self) -> &'static str {
        "near"
    }
}
