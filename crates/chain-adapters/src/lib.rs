// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chain adapters for the balance gateway
//!
//! Every supported chain is served by one of a handful of adapter families,
//! each implementing [`balance_adapter::BalanceAdapter`] against one kind of
//! upstream API (block explorers, JSON-RPC nodes, Cosmos LCD endpoints, and
//! chain-specific indexers). All upstream traffic goes through
//! [`http::UpstreamClient`], which applies the shared timeout and status
//! classification.
//!
//! # Architecture
//!
//! - **Adapter families**: [`explorer`], [`evm_rpc`], [`cosmos`], [`near`],
//!   [`sui`], [`stellar`], [`hedera`], [`stacks`], [`subscan`], [`cardano`],
//!   [`filecoin`], [`arweave`], [`deso`], [`utxo`]
//! - **Dispatch**: [`ChainAdapter`] forwards to the concrete family
//! - **Routing**: [`AdapterRegistry`] maps chain ids to shared adapter instances
//! - **Bootstrap**: [`AdapterRegistry::bootstrap`] builds the default chain table
//!   from [`AdapterSettings`]

pub mod adapter;
pub mod arweave;
pub mod bootstrap;
pub mod cardano;
pub mod cosmos;
pub mod deso;
pub mod evm_rpc;
pub mod explorer;
pub mod filecoin;
pub mod hedera;
pub mod http;
pub mod near;
pub mod non_empty_string;
pub mod registry;
pub mod settings;
pub mod stacks;
pub mod stellar;
pub mod subscan;
pub mod sui;
pub mod utxo;

pub use adapter::ChainAdapter;
pub use bootstrap::DEFAULT_CHAINS;
pub use http::{UpstreamClient, UpstreamError};
pub use non_empty_string::NonEmptyString;
pub use registry::AdapterRegistry;
pub use settings::{AdapterSettings, ApiKeys};
