// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Persistence sinks for fetched balance records

use balance_adapter::BalanceError;
use serde::{Deserialize, Serialize};
use shared_types::NormalizedBalanceRecord;
use thiserror::Error;
use tracing::info;

use crate::bigquery::{BigQuerySink, DEFAULT_DATASET, DEFAULT_TABLE};

/// Default sink request timeout in seconds
pub const DEFAULT_SINK_TIMEOUT_SECONDS: u64 = 30;

/// Errors raised while persisting records
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum SinkError {
    /// HTTP transport failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Destination answered with a non-success status
    #[error("{destination} returned status {status}: {message}")]
    Status {
        destination: String,
        status: u16,
        message: String,
    },

    /// Destination accepted the request but rejected rows
    #[error("{failed} of {total} rows rejected: {message}")]
    RowsRejected {
        failed: usize,
        total: usize,
        message: String,
    },

    /// Write exceeded its time budget
    #[error("Insert timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Sink settings are incomplete or invalid
    #[error("Sink configuration error: {0}")]
    Config(String),
}

impl From<SinkError> for BalanceError {
    fn from(error: SinkError) -> Self {
        match error {
            SinkError::Config(message) => BalanceError::Configuration { message },
            other => BalanceError::Persistence {
                message: other.to_string(),
            },
        }
    }
}

/// Destination for records produced by successful lookups
pub trait BalanceSink: Send + Sync {
    /// Persist a batch of records
    ///
    /// An empty batch is a no-op.
    fn insert(
        &self,
        records: &[NormalizedBalanceRecord],
    ) -> impl Future<Output = Result<(), SinkError>> + Send;

    /// Sink name for logs and health output
    fn name(&self) -> &'static str;
}

/// Sink that emits one structured log event per record
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl BalanceSink for LogSink {
    async fn insert(&self, records: &[NormalizedBalanceRecord]) -> Result<(), SinkError> {
        for record in records {
            info!(
                ticker = record.ticker,
                amount = record.amount,
                wallet_id = record.wallet_id,
                remote_wallet_id = record.remote_wallet_id,
                block_id = record.block_id,
                timestamp_sec = record.timestamp_sec,
                source = record.raw_metadata.source,
                chain = record.raw_metadata.chain,
                "balance record"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Sink selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// [`LogSink`]
    #[default]
    Log,
    /// [`BigQuerySink`]
    BigQuery,
}

/// Sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    /// Which sink to build
    pub kind: SinkKind,
    /// BigQuery project
    pub project_id: Option<String>,
    /// BigQuery dataset
    pub dataset: String,
    /// BigQuery table
    pub table: String,
    /// OAuth2 bearer token for the BigQuery API
    pub access_token: Option<String>,
    /// BigQuery REST base URL override
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            kind: SinkKind::Log,
            project_id: None,
            dataset: DEFAULT_DATASET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            access_token: None,
            base_url: None,
            timeout_seconds: DEFAULT_SINK_TIMEOUT_SECONDS,
        }
    }
}

/// Runtime choice between the available sinks
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum ConfiguredSink {
    Log(LogSink),
    BigQuery(BigQuerySink),
}

impl ConfiguredSink {
    /// Build the sink described by `settings`
    pub fn from_settings(settings: &SinkSettings) -> Result<Self, SinkError> {
        match settings.kind {
            SinkKind::Log => Ok(Self::Log(LogSink)),
            SinkKind::BigQuery => BigQuerySink::new(settings).map(Self::BigQuery),
        }
    }
}

impl Default for ConfiguredSink {
    fn default() -> Self {
        Self::Log(LogSink)
    }
}

impl BalanceSink for ConfiguredSink {
    async fn insert(&self, records: &[NormalizedBalanceRecord]) -> Result<(), SinkError> {
        match self {
            Self::Log(sink) => sink.insert(records).await,
            Self::BigQuery(sink) => sink.insert(records).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Log(sink) => sink.name(),
            Self::BigQuery(sink) => sink.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_from_json() {
        let settings: SinkSettings = serde_json::from_str(
            r#"{"kind": "bigquery", "project_id": "analytics", "access_token": "ya29.token"}"#,
        )
        .unwrap();

        assert_eq!(settings.kind, SinkKind::BigQuery);
        assert_eq!(settings.dataset, "blockchain_data");
        assert_eq!(settings.table, "wallet_balances");
        assert_eq!(settings.timeout_seconds, DEFAULT_SINK_TIMEOUT_SECONDS);
    }

    #[test]
    fn default_sink_is_log() {
        let sink = ConfiguredSink::from_settings(&SinkSettings::default()).unwrap();
        assert_eq!(sink.name(), "log");
    }

    #[test]
    fn incomplete_bigquery_settings() {
        let settings = SinkSettings {
            kind: SinkKind::BigQuery,
            ..SinkSettings::default()
        };
        let error = ConfiguredSink::from_settings(&settings).unwrap_err();
        assert!(matches!(error, SinkError::Config(_)));
        assert!(matches!(
            BalanceError::from(error),
            BalanceError::Configuration { .. }
        ));
    }

    #[test]
    fn rejected_rows_are_persistence_failures() {
        let error = BalanceError::from(SinkError::RowsRejected {
            failed: 1,
            total: 2,
            message: "invalid: no such field".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Failed to persist balances: 1 of 2 rows rejected: invalid: no such field"
        );
    }

    #[tokio::test]
    async fn log_sink_accepts_everything() {
        assert!(LogSink.insert(&[]).await.is_ok());
    }
}
