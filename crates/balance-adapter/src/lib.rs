// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Balance adapter contract and normalization helpers
//!
//! This crate defines the capability contract every chain integration
//! satisfies, the error taxonomy shared by adapters and the service layer,
//! and the stateless helpers that turn heterogeneous upstream values into
//! [`NormalizedBalanceRecord`]s.
//!
//! # Core Abstractions
//!
//! - **`BalanceAdapter` Trait**: four balance operations, all async and fallible
//! - **Error Taxonomy**: [`BalanceError`] with a coarse [`ErrorKind`] classification
//! - **Normalization**: decimal scaling, wallet id derivation, record building
//! - **ABI helpers**: `balanceOf` call data and string/uint8 return decoding

use shared_types::{ChainId, NormalizedBalanceRecord};

pub mod abi;
pub mod error;
pub mod normalize;

pub use error::{BalanceError, ErrorKind};
pub use normalize::{RecordBuilder, RecordContext};

/// Uniform balance capability implemented by every chain adapter
///
/// Adapters are constructed once with their per-chain configuration and hold
/// no per-request state.
pub trait BalanceAdapter: Send + Sync {
    /// Every holding the adapter can enumerate: native plus fungible tokens
    ///
    /// Adapters whose upstream cannot enumerate tokens override this to return
    /// the native balance only.
    fn get_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> impl Future<Output = Result<Vec<NormalizedBalanceRecord>, BalanceError>> + Send {
        async move {
            let native = self.get_native_balance(chain_id, address).await?;
            let tokens = self.get_erc20_balances(chain_id, address).await?;

            let mut records = Vec::with_capacity(tokens.len() + 1);
            records.push(native);
            records.extend(tokens);
            Ok(records)
        }
    }

    /// Balance of the chain's base asset
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::NotFound`] when the upstream omits the native
    /// entry, or an upstream-class error when the call fails.
    fn get_native_balance(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> impl Future<Output = Result<NormalizedBalanceRecord, BalanceError>> + Send;

    /// All non-native fungible holdings
    ///
    /// Returns an empty list, never an error, when the chain cannot enumerate
    /// holdings without explicit asset identifiers.
    fn get_erc20_balances(
        &self,
        chain_id: ChainId,
        address: &str,
    ) -> impl Future<Output = Result<Vec<NormalizedBalanceRecord>, BalanceError>> + Send;

    /// Balance of one fungible asset identified by its chain-native id
    ///
    /// # Errors
    ///
    /// Returns [`BalanceError::NotFound`] when the address does not hold the
    /// asset and [`BalanceError::Unsupported`] on chains without a fungible
    /// asset model.
    fn get_erc20_balance(
        &self,
        chain_id: ChainId,
        address: &str,
        asset_id: &str,
    ) -> impl Future<Output = Result<NormalizedBalanceRecord, BalanceError>> + Send;

    /// Name of the adapter family
    fn name(&self) -> &'static str;
}
