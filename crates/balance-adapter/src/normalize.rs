// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Stateless normalization helpers shared by every adapter
//!
//! Amounts are scaled with integer arithmetic only: upstream values are parsed
//! as unsigned integers of up to 256 bits and the decimal point is inserted
//! textually, so results never go through floating point or scientific
//! notation.

use alloy_primitives::U256;
use chrono::Utc;
use shared_types::{NormalizedBalanceRecord, RawMetadata};

use crate::BalanceError;

/// Literal prefix of every derived wallet identifier
pub const WALLET_ID_PREFIX: &str = "bitwave-wallet-id-";

/// Number of address characters kept in a wallet identifier
pub const WALLET_ID_ADDRESS_CHARS: usize = 8;

/// Block identifier used when the upstream does not expose one
pub const UNKNOWN_BLOCK_ID: &str = "0";

/// Derive the wallet identifier for an address
///
/// Takes the first eight characters of the address as supplied. Shorter
/// addresses are used whole.
pub fn wallet_id(address: &str) -> String {
    let prefix: String = address.chars().take(WALLET_ID_ADDRESS_CHARS).collect();
    format!("{WALLET_ID_PREFIX}{prefix}")
}

/// Current wall-clock time in unix seconds
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

/// Render `value / 10^decimals` as a plain decimal string
pub fn scale_integer(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let (whole, fraction) = if digits.len() > decimals {
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        (whole.to_string(), fraction.to_string())
    } else {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parse an unsigned decimal integer string
pub fn parse_integer(raw: &str) -> Result<U256, BalanceError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BalanceError::invalid_response(format!(
            "expected an unsigned integer amount, got '{raw}'"
        )));
    }

    U256::from_str_radix(raw, 10).map_err(|e| {
        BalanceError::invalid_response(format!("amount '{raw}' out of range: {e}"))
    })
}

/// Scale an upstream integer amount string by the asset's decimals
pub fn scale_amount(raw: &str, decimals: u8) -> Result<String, BalanceError> {
    parse_integer(raw).map(|value| scale_integer(value, decimals))
}

/// Normalize an upstream decimal string such as `"100.5000000"`
///
/// Used for sources that already scale amounts. Trailing fractional zeros are
/// dropped so the result matches [`scale_amount`] output.
pub fn normalize_decimal(raw: &str) -> Result<String, BalanceError> {
    let (whole, fraction) = raw.trim().split_once('.').unwrap_or((raw.trim(), ""));
    let decimals = u8::try_from(fraction.len()).map_err(|_| {
        BalanceError::invalid_response(format!("too many fractional digits in '{raw}'"))
    })?;

    scale_amount(&format!("{whole}{fraction}"), decimals)
}

/// Parse a `0x`-prefixed JSON-RPC quantity
///
/// An empty quantity (`"0x"`) is zero.
pub fn parse_hex_quantity(hex: &str) -> Result<U256, BalanceError> {
    let trimmed = hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| {
            BalanceError::invalid_response(format!("expected 0x-prefixed quantity, got '{hex}'"))
        })?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| BalanceError::invalid_response(format!("invalid hex quantity '{hex}': {e}")))
}

/// Parse a hex quantity and scale it by the asset's decimals
pub fn scale_hex_quantity(hex: &str, decimals: u8) -> Result<String, BalanceError> {
    parse_hex_quantity(hex).map(|value| scale_integer(value, decimals))
}

/// Render an integer JSON value (number or numeric string) as a digit string
pub fn integer_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(number) => number
            .as_u64()
            .map(|n| n.to_string())
            .or_else(|| number.as_i64().map(|n| n.to_string())),
        serde_json::Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Some(s.clone())
        }
        _ => None,
    }
}

/// Derived ticker built from a prefix and a truncated identifier
///
/// `placeholder_ticker("TOKEN", "0xA0b86991c6", 6)` yields `TOKEN-0xA0b8`.
pub fn placeholder_ticker(prefix: &str, id: &str, len: usize) -> String {
    let head: String = id.chars().take(len).collect();
    format!("{prefix}-{head}")
}

/// Per-adapter provenance used to stamp every record it emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    source: String,
    chain: String,
}

impl RecordContext {
    /// Create a context from the upstream source name and chain display name
    pub fn new(source: impl Into<String>, chain: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chain: chain.into(),
        }
    }

    /// Upstream source name
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Chain display name
    pub fn chain(&self) -> &str {
        &self.chain
    }

    /// Start a record for `address` holding `amount` of `ticker`
    pub fn record(
        &self,
        address: &str,
        ticker: impl Into<String>,
        amount: impl Into<String>,
    ) -> RecordBuilder {
        RecordBuilder {
            record: NormalizedBalanceRecord {
                ticker: ticker.into(),
                amount: amount.into(),
                wallet_id: wallet_id(address),
                remote_wallet_id: address.to_string(),
                block_id: UNKNOWN_BLOCK_ID.to_string(),
                timestamp_sec: current_timestamp(),
                raw_metadata: RawMetadata {
                    source: self.source.clone(),
                    chain: self.chain.clone(),
                    raw_response: serde_json::Value::Null,
                },
            },
        }
    }
}

/// Builder that always yields a complete record
///
/// Block id defaults to `"0"` and the timestamp to the local request time.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: NormalizedBalanceRecord,
}

impl RecordBuilder {
    /// Set the block height or ledger sequence
    #[must_use]
    pub fn block_id(mut self, block_id: impl ToString) -> Self {
        self.record.block_id = block_id.to_string();
        self
    }

    /// Use an upstream-provided timestamp
    #[must_use]
    pub fn timestamp(mut self, timestamp_sec: i64) -> Self {
        self.record.timestamp_sec = timestamp_sec;
        self
    }

    /// Attach the raw upstream payload
    #[must_use]
    pub fn raw_response(mut self, raw: serde_json::Value) -> Self {
        self.record.raw_metadata.raw_response = raw;
        self
    }

    /// Finish the record
    pub fn build(self) -> NormalizedBalanceRecord {
        self.record
    }
}
