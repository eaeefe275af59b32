// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Tagged dispatcher over every adapter family
//!
//! [`BalanceAdapter`] returns `impl Future`, so it is not object safe. The
//! registry stores [`ChainAdapter`] values instead and forwards each call to
//! the concrete variant.

use balance_adapter::{BalanceAdapter, BalanceError};
use shared_types::{ChainId, NormalizedBalanceRecord};

use crate::{
    arweave::ArweaveAdapter, cardano::CardanoAdapter, cosmos::CosmosAdapter, deso::DesoAdapter,
    evm_rpc::EvmRpcAdapter, explorer::ExplorerAdapter, filecoin::FilecoinAdapter,
    hedera::HederaAdapter, near::NearAdapter, stacks::StacksAdapter, stellar::StellarAdapter,
    subscan::SubscanAdapter, sui::SuiAdapter, utxo::UtxoAdapter,
};

/// Any concrete adapter
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum ChainAdapter {
    Explorer(ExplorerAdapter),
    EvmRpc(EvmRpcAdapter),
    Cosmos(CosmosAdapter),
    Near(NearAdapter),
    Sui(SuiAdapter),
    Stellar(StellarAdapter),
    Hedera(HederaAdapter),
    Stacks(StacksAdapter),
    Subscan(SubscanAdapter),
    Cardano(CardanoAdapter),
    Filecoin(FilecoinAdapter),
    Arweave(ArweaveAdapter),
    Deso(DesoAdapter),
    Utxo(UtxoAdapter),
}

macro_rules! dispatch {
    ($self:ident, $adapter:ident => $call:expr) => {
        match $self {
            ChainAdapter::Explorer($adapter) => $call,
            ChainAdapter::EvmRpc($adapter) => $call,
            ChainAdapter::Cosmos($adapter) => $call,
            ChainAdapter::Near($adapter) => $call,
            ChainAdapter::Sui($adapter) => $call,
            ChainAdapter::Stellar($adapter) => $call,
            ChainAdapter::Hedera($adapter) => $call,
            ChainAdapter::Stacks($adapter) => $call,
            ChainAdapter::Subscan($adapter) => $call,
            ChainAdapter::Cardano($adapter) => $call,
            ChainAdapter::Filecoin($adapter) => $call,
            ChainAdapter::Arweave($adapter) => $call,
            ChainAdapter::Deso($adapter) => $call,
            ChainAdapter::Utxo($adapter) => $call,
        }
    };
}

macro_rules! impl_from {
    ($($variant:ident($adapter:ty)),* $(,)?) => {
        $(
            impl From<$adapter> for ChainAdapter {
                fn from(adapter: $adapter) -> Self {
                    Self::$variant(adapter)
                }
            }
        )*
    };
}

impl_from!(
    Explorer(ExplorerAdapter),
    EvmRpc(EvmRpcAdapter),
    Cosmos(CosmosAdapter),
    Near(NearAdapter),
    Sui(SuiAdapter),
    Stellar(StellarAdapter),
    Hedera(HederaAdapter),
    Stacks(StacksAdapter),
    Subscan(SubscanAdapter),
    Cardano(CardanoAdapter),
    Filecoin(FilecoinAdapter),
    Arweave(ArweaveAdapter),
    Deso(DesoAdapter),
    Utxo(UtxoAdapter),
);

impl BalanceAdapter for ChainAdapter {
    async fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        dispatch!(self, adapter => adapter.get_balances(chain_id, address).await)
    }

    async fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        dispatch!(self, adapter => adapter.get_native_balance(chain_id, address).await)
    }

    async fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> Result<Vec<NormalizedBalanceRecord>, BalanceError> {
        dispatch!(self, adapter => adapter.get_erc20_balances(chain_id, address).await)
    }

    async fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> Result<NormalizedBalanceRecord, BalanceError> {
        dispatch!(self, adapter => adapter.get_erc20_balance(chain_id, address, asset_id).await)
    }

    fn name(&self) -> &'static str {
        dispatch!(self, adapter => adapter.name())
    }
}
