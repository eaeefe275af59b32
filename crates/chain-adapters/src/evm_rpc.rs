// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! EVM JSON-RPC adapter
//!
//! Talks to a plain Ethereum JSON-RPC node. Native balances come from
//! `eth_getBalance`, token balances and metadata from raw `eth_call`s.

use balance_adapter::{
    BalanceAdapter, BalanceError, RecordContext,
    abi::{
        DECIMALS_SELECTOR, NAME_SELECTOR, SYMBOL_SELECTOR, balance_of_call_data,
        decode_abi_string, decode_abi_u8,
    },
    normalize::{UNKNOWN_BLOCK_ID, parse_hex_quantity, placeholder_ticker, scale_hex_quantity},
};
use serde_json::{Value, json};
use shared_types::{ChainId, NormalizedBalanceRecord};
use tracing::{debug, warn};

use crate::{NonEmptyString, explorer::DEFAULT_TOKEN_DECIMALS, http::UpstreamClient};

/// Configuration for one JSON-RPC backed chain
#[derive(Debug, Clone)]
pub struct EvmRpcConfig {
    /// Chain display name
    pub chain_name: NonEmptyString,
    /// JSON-RPC endpoint
    pub rpc_url: NonEmptyString,
    /// Native asset ticker
    pub native_ticker: String,
}

/// Adapter for EVM chains reached over JSON-RPC
#[derive(Debug, Clone)]
pub struct EvmRpcAdapter {
    http: UpstreamClient,
    config: EvmRpcConfig,
    context: RecordContext,
}

impl EvmRpcAdapter {
    /// Create an adapter from its configuration and a bound HTTP client
    pub fn new(http: UpstreamClient, config: EvmRpcConfig) -> Self {
        let context = RecordContext::new(http.source_name(), config.chain_name.as_str());
        Self {
            http,
            config,
            context,
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, BalanceError> {
        Ok(self
            .http
            .json_rpc(self.config.rpc_url.as_str(), method, params)
            .await?)
    }

    fn quantity(value: &Value, method: &str) -> Result<String, BalanceError> {
        value
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| {
                BalanceError::invalid_response(format!("{method} returned a non-string result"))
            })
    }

    /// Current block number, or `"0"` when the node cannot tell
    async fn block_number(&self) -> String {
        let block = match self.call("eth_blockNumber", json!([])).await {
            Ok(result) => Self::quantity(&result, "eth_blockNumber")
                .and_then(|hex| parse_hex_quantity(&hex)),
            Err(e) => Err(e),
        };

        match block {
            Ok(block) => block.to_string(),
            Err(e) => {
                warn!(chain = self.context.chain(), error = %e, "failed to read block number");
                UNKNOWN_BLOCK_ID.to_string()
            }
        }
    }

    async fn eth_call(&self, to: &str, data: &str) -> Option<String> {
        match self
            .call("eth_call", json!([{"to": to, "data": data}, "latest"]))
            .await
        {
            Ok(Value::String(result)) => Some(result),
            Ok(_) => None,
            Err(e) => {
                debug!(token = to, selector = data, error = %e, "metadata call failed");
                None
            }
        }
    }
}

impl BalanceAdapter for EvmRpcAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        warn!(
            chain = self.context.chain(),
            %chain_id,
            "JSON-RPC nodes cannot enumerate tokens, returning native balance only"
        );
        Ok(vec![self.get_native_balance(chain_id, address).await?])
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        debug!(chain = self.context.chain(), %chain_id, address, "fetching native balance");

        let (balance, block_id) = tokio::join!(
            self.call("eth_getBalance", json!([address, "latest"])),
            self.block_number()
        );
        let balance = balance?;
        let amount = scale_hex_quantity(&Self::quantity(&balance, "eth_getBalance")?, 18)?;

        Ok(self
            .context
            .record(address, self.config.native_ticker.as_str(), amount)
            .block_id(block_id)
            .raw_response(json!({"result": balance}))
            .build())
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        _address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        debug!(
            chain = self.context.chain(),
            %chain_id,
            "token enumeration unsupported over JSON-RPC"
        );
        Ok(Vec::new())
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

        let call_data = balance_of_call_data(address)?;
        let balance = self
            .call("eth_call", json!([{"to": asset_id, "data": call_data}, "latest"]))
            .await?;
        let raw_balance = Self::quantity(&balance, "eth_call")?;

        let (symbol, name, decimals, block_id) = tokio::join!(
            self.eth_call(asset_id, SYMBOL_SELECTOR),
            self.eth_call(asset_id, NAME_SELECTOR),
            self.eth_call(asset_id, DECIMALS_SELECTOR),
            self.block_number()
        );

        let ticker = symbol
            .as_deref()
            .and_then(decode_abi_string)
            .unwrap_or_else(|| placeholder_ticker("TOKEN", asset_id, 6));
        let decimals = decimals
            .as_deref()
            .and_then(decode_abi_u8)
            .unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let amount = scale_hex_quantity(&raw_balance, decimals)?;

        Ok(self
            .context
            .record(address, ticker, amount)
            .block_id(block_id)
            .raw_response(json!({
                "tokenAddress": asset_id,
                "tokenName": name.as_deref().and_then(decode_abi_string),
                "decimals": decimals,
                "result": raw_balance,
            }))
            .build())
    }

    fn name(&self) -> &'static str {
        "evm-rpc"
    }
}
