// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Cardano adapter over Blockfrost
//!
//! `/addresses/{address}` lists every unit held by the address. `lovelace` is
//! ADA; native assets are `policy_id || hex(asset_name)` where the policy id is
//! 56 hex characters.

use alloy_primitives::hex;
use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    normalize::{placeholder_ticker, scale_amount},
};
use serde::Deserialize;
use serde_json::json;
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::debug;

use crate::{
    NonEmptyString,
    http::{UpstreamClient, decode, join_url},
};

const LOVELACE: &str = "lovelace";
const ADA_DECIMALS: u8 = 6;
const TOKEN_DECIMALS: u8 = 6;
const POLICY_ID_LEN: usize = 56;

#[derive(Debug, Deserialize)]
struct AddressInfo {
    amount: Vec<Unit>,
}

#[derive(Debug, Deserialize)]
struct Unit {
    unit: String,
    quantity: String,
}

impl Unit {
    fn policy_id(&self) -> &str {
        self.unit.get(..POLICY_ID_LEN).unwrap_or(&self.unit)
    }

    /// Ticker from the asset name when it is printable UTF-8
    fn ticker(&self) -> String {
        self.unit
            .get(POLICY_ID_LEN..)
            .and_then(|name| hex::decode(name).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .filter(|name| !name.is_empty() && name.chars().all(|c| !c.is_control()))
            .unwrap_or_else(|| placeholder_ticker("TOKEN", self.policy_id(), 6))
    }
}

/// Adapter for Cardano addresses
#[derive(Debug, Clone)]
pub struct CardanoAdapter {
    http: UpstreamClient,
    base_url: NonEmptyString,
    project_id: Option<String>,
    context: RecordContext,
}

impl CardanoAdapter {
    /// Create an adapter against a Blockfrost deployment
    pub fn new(http: UpstreamClient, base_url: NonEmptyString, project_id: Option<String>) -> Self {
        let context = RecordContext::new(http.source_name(), "Cardano");
        Self {
            http,
            base_url,
            project_id,
            context,
        }
    }

    async fn units(&self, address: &str) -> Result<Vec<Unit>, BalanceError> {
        let url = join_url(self.base_url.as_str(), &format!("addresses/{address}"));
        debug!(url, "fetching Cardano address");

        let mut request = self.http.get(&url);
        if let Some(project_id) = &self.project_id {
            request = request.header("project_id", project_id);
        }

        let raw = self.http.send_json(request).await?;
        Ok(decode::<AddressInfo>(&raw)?.amount)
    }

    fn record(&self, address: &str, unit: &Unit) -> Result<NormalizedBalanceRecord, BalanceError> {
        let (ticker, decimals) = if unit.unit == LOVELACE {
            ("ADA".to_string(), ADA_DECIMALS)
        } else {
            (unit.ticker(), TOKEN_DECIMALS)
        };

        Ok(self
            .context
            .record(address, ticker, scale_amount(&unit.quantity, decimals)?)
            .raw_response(json!({"unit": unit.unit, "quantity": unit.quantity}))
            .build())
    }
}

impl BalanceAdapter for CardanoAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching all Cardano balances");
        self.units(address)
            .await?
            .iter()
            .map(|unit| self.record(address, unit))
            .collect()
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, "fetching ADA balance");
        let units = self.units(address).await?;

        let lovelace = units
            .iter()
            .find(|unit| unit.unit == LOVELACE)
            .ok_or_else(|| BalanceError::not_found("Native ADA balance not found"))?;

        self.record(address, lovelace)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(%chain_id, address, "fetching Cardano native assets");
        self.units(address)
            .await?
            .iter()
            .filter(|unit| unit.unit != LOVELACE)
            .map(|unit| self.record(address, unit))
            .collect()
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(%chain_id, address, policy_id = asset_id, "fetching Cardano native asset");
        let units = self.units(address).await?;

        let unit = units
            .iter()
            .filter(|unit| unit.unit != LOVELACE)
            .find(|unit| unit.unit == asset_id || unit.policy_id() == asset_id)
            .ok_or_else(|| {
                BalanceError::not_found(format!(
                    "Token with policy ID {asset_id} not found for address {address}"
                ))
            })?;

        self.record(address, unit)
    }

    fn name(&self) -> &'static str {
        "cardano"
    }
}
