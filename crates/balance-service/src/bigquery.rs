// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! BigQuery streaming-insert sink
//!
//! Rows go through `tabledata.insertAll`. Every row carries a random
//! `insertId` so BigQuery can de-duplicate retried batches. The table stores
//! all fields as strings with the raw metadata serialized to JSON.

use std::time::Duration;

use reqwest::{
    Client, ClientBuilder,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use shared_types::NormalizedBalanceRecord;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::sink::{BalanceSink, SinkError, SinkSettings};

/// Public BigQuery REST endpoint
pub const DEFAULT_BIGQUERY_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/";

/// Dataset used when none is configured
pub const DEFAULT_DATASET: &str = "blockchain_data";

/// Table used when none is configured
pub const DEFAULT_TABLE: &str = "wallet_balances";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRequest<'a> {
    kind: &'static str,
    skip_invalid_rows: bool,
    rows: Vec<InsertRow<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRow<'a> {
    insert_id: String,
    json: BalanceRow<'a>,
}

/// Table row; column names follow the `wallet_balances` schema
#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    ticker: &'a str,
    amount: &'a str,
    wallet_id: &'a str,
    remote_wallet_id: &'a str,
    block_id: &'a str,
    timestamp_sec: String,
    raw_metadata: String,
}

impl<'a> BalanceRow<'a> {
    fn new(record: &'a NormalizedBalanceRecord) -> Result<Self, SinkError> {
        let raw_metadata = serde_json::to_string(&record.raw_metadata)
            .map_err(|e| SinkError::Config(format!("unserializable raw metadata: {e}")))?;

        Ok(Self {
            ticker: &record.ticker,
            amount: &record.amount,
            wallet_id: &record.wallet_id,
            remote_wallet_id: &record.remote_wallet_id,
            block_id: &record.block_id,
            timestamp_sec: record.timestamp_sec.to_string(),
            raw_metadata,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<InsertErrors>,
}

#[derive(Debug, Deserialize)]
struct InsertErrors {
    #[serde(default)]
    index: u64,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

/// Sink streaming records into a BigQuery table
#[derive(Debug, Clone)]
pub struct BigQuerySink {
    client: Client,
    insert_url: Url,
    table_ref: String,
    timeout_seconds: u64,
}

impl BigQuerySink {
    /// Create a sink from settings
    ///
    /// Requires a project id and an access token.
    pub fn new(settings: &SinkSettings) -> Result<Self, SinkError> {
        let project_id = settings
            .project_id
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SinkError::Config("BigQuery sink requires a project_id".to_string()))?;
        let access_token = settings
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                SinkError::Config("BigQuery sink requires an access_token".to_string())
            })?;
        if settings.timeout_seconds == 0 {
            return Err(SinkError::Config(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        let mut base_url = Url::parse(settings.base_url.as_deref().unwrap_or(DEFAULT_BIGQUERY_URL))
            .map_err(|e| SinkError::Config(format!("Invalid BigQuery base URL: {e}")))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let insert_url = base_url
            .join(&format!(
                "projects/{project_id}/datasets/{}/tables/{}/insertAll",
                settings.dataset, settings.table
            ))
            .map_err(|e| SinkError::Config(format!("Invalid BigQuery table path: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {access_token}"))
                .map_err(|e| SinkError::Config(format!("Invalid access token format: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .default_headers(headers)
            .user_agent(concat!("balance-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let table_ref = format!("{project_id}.{}.{}", settings.dataset, settings.table);
        info!(table = table_ref, "created BigQuery sink");

        Ok(Self {
            client,
            insert_url,
            table_ref,
            timeout_seconds: settings.timeout_seconds,
        })
    }

    /// Fully qualified `project.dataset.table`
    pub fn table_ref(&self) -> &str {
        &self.table_ref
    }
}

impl BalanceSink for BigQuerySink {
    #[instrument(skip(self, records), fields(table = self.table_ref, rows = records.len()))]
    async fn insert(&self, records: &[NormalizedBalanceRecord]) -> Result<(), SinkError> {
        if records.is_empty() {
            return Ok(());
        }

        let rows = records
            .iter()
            .map(|record| {
                Ok(InsertRow {
                    insert_id: Uuid::new_v4().to_string(),
                    json: BalanceRow::new(record)?,
                })
            })
            .collect::<Result<Vec<_>, SinkError>>()?;
        let request = InsertAllRequest {
            kind: "bigquery#tableDataInsertAllRequest",
            skip_invalid_rows: false,
            rows,
        };

        let response = self
            .client
            .post(self.insert_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SinkError::Timeout {
                        seconds: self.timeout_seconds,
                    }
                } else {
                    SinkError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), body, "BigQuery insert failed");
            return Err(SinkError::Status {
                destination: "BigQuery".to_string(),
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: InsertAllResponse = serde_json::from_str(&body).unwrap_or_default();
        if let Some(first) = parsed.insert_errors.first() {
            let detail = first
                .errors
                .first()
                .map(|e| format!("row {}: {}: {}", first.index, e.reason, e.message))
                .unwrap_or_else(|| format!("row {}", first.index));
            warn!(failed = parsed.insert_errors.len(), detail, "BigQuery rejected rows");
            return Err(SinkError::RowsRejected {
                failed: parsed.insert_errors.len(),
                total: records.len(),
                message: detail,
            });
        }

        debug!("BigQuery insert accepted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bigquery"
    }
}
