// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Normalized balance records
//!
//! [`NormalizedBalanceRecord`] is the one shape every chain adapter produces.
//! Field names on the wire follow the import format read by the downstream
//! analytics consumer.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// Provenance of a record plus the untouched upstream payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RawMetadata {
    /// Name of the upstream API that produced the data
    #[schema(example = "Ethereum API")]
    pub source: String,
    /// Chain display name
    #[schema(example = "Ethereum")]
    pub chain: String,
    /// Upstream response kept for audit and debugging
    #[schema(value_type = Object)]
    pub raw_response: serde_json::Value,
}

/// Canonical balance observation for one asset held by one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedBalanceRecord {
    /// Asset display symbol
    #[serde(rename = "Ticker")]
    #[schema(example = "ETH")]
    pub ticker: String,
    /// Human-scaled decimal amount
    #[serde(rename = "Amount")]
    #[schema(example = "1.5")]
    pub amount: String,
    /// Derived grouping identifier, not guaranteed unique
    #[serde(rename = "WalletId")]
    pub wallet_id: String,
    /// Address exactly as supplied by the caller
    #[serde(rename = "RemoteWalletId")]
    pub remote_wallet_id: String,
    /// Block height or ledger sequence, `"0"` when unknown
    #[serde(rename = "BlockId")]
    pub block_id: String,
    /// Unix seconds of the observation
    #[serde(rename = "TimestampSEC")]
    pub timestamp_sec: i64,
    /// Provenance and raw upstream payload
    #[serde(rename = "RawMetadata")]
    pub raw_metadata: RawMetadata,
}

/// Uniform result shape for every balance lookup
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    /// Whether the lookup succeeded
    pub success: bool,
    /// Records produced by the lookup, empty on failure
    pub data: Vec<NormalizedBalanceRecord>,
    /// Failure messages
    pub errors: Option<Vec<String>>,
}

impl BalanceResponse {
    /// Successful response carrying records
    pub fn ok(data: Vec<NormalizedBalanceRecord>) -> Self {
        Self {
            success: true,
            data,
            errors: None,
        }
    }

    /// Failed response with a single message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            errors: Some(vec![message.into()]),
        }
    }
}

impl<E: std::fmt::Display> From<Result<Vec<NormalizedBalanceRecord>, E>> for BalanceResponse {
    fn from(result: Result<Vec<NormalizedBalanceRecord>, E>) -> Self {
        match result {
            Ok(records) => Self::ok(records),
            Err(error) => Self::failure(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record() -> NormalizedBalanceRecord {
        NormalizedBalanceRecord {
            ticker: "OSMO".to_string(),
            amount: "5".to_string(),
            wallet_id: "bitwave-wallet-id-osmo1abc".to_string(),
            remote_wallet_id: "osmo1abcdef".to_string(),
            block_id: "0".to_string(),
            timestamp_sec: 1_700_000_000,
            raw_metadata: RawMetadata {
                source: "Osmosis Cosmos API".to_string(),
                chain: "Osmosis".to_string(),
                raw_response: json!({"denom": "uosmo", "amount": "5000000"}),
            },
        }
    }

    #[test]
    fn record_wire_field_names() {
        let value = serde_json::to_value(record()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "Ticker",
            "Amount",
            "WalletId",
            "RemoteWalletId",
            "BlockId",
            "TimestampSEC",
            "RawMetadata",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(value["TimestampSEC"], json!(1_700_000_000));
        assert_eq!(value["RawMetadata"]["raw_response"]["denom"], "uosmo");
    }

    #[test]
    fn success_response_omits_errors() {
        let value = serde_json::to_value(BalanceResponse::ok(vec![record()])).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn failure_response_from_result() {
        let result: Result<Vec<NormalizedBalanceRecord>, String> =
            Err("No adapter found for chain ID: 999".to_string());
        let response = BalanceResponse::from(result);

        assert!(!response.success);
        assert!(response.data.is_empty());
        assert_eq!(
            response.errors,
            Some(vec!["No adapter found for chain ID: 999".to_string()])
        );
    }
}
