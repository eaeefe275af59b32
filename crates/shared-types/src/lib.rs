// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the balance gateway
//!
//! This crate provides the chain routing metadata and the normalized balance
//! record shape shared by the adapter, service and HTTP crates.

pub mod balance;
pub mod chains;

pub use balance::{BalanceResponse, NormalizedBalanceRecord, RawMetadata};
pub use chains::{ChainConfig, ChainId, ChainIdParseError};
