// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Balance lookup orchestration
//!
//! [`BalanceService`] resolves the adapter for a chain, runs one of the four
//! balance operations, hands the resulting records to a [`BalanceSink`] and
//! folds every outcome into a [`shared_types::BalanceResponse`].
//!
//! # Architecture
//!
//! - [`service`]: request orchestration and failure folding
//! - [`sink`]: the persistence contract, the logging sink and the runtime
//!   sink selection
//! - [`bigquery`]: streaming inserts into a BigQuery table

pub mod bigquery;
pub mod service;
pub mod sink;

pub use bigquery::BigQuerySink;
pub use service::{BalanceQuery, BalanceService};
pub use sink::{BalanceSink, ConfiguredSink, LogSink, SinkError, SinkKind, SinkSettings};
