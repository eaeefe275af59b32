// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chain identifiers and routing metadata
//!
//! Chains are addressed by a numeric identifier that callers usually pass as a
//! string (path segments, JSON bodies). [`ChainConfig`] binds that identifier
//! to a display name and the provider key of the adapter that serves it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use utoipa::ToSchema;

/// Numeric blockchain identifier
///
/// Accepts both `137` and `"137"` when deserializing and always serializes as
/// a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String, example = "137")]
pub struct ChainId(u64);

impl ChainId {
    /// Create a chain identifier from its numeric value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric chain ID
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Errors raised while parsing a chain identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainIdParseError {
    /// Input was empty or whitespace
    #[error("chain ID cannot be empty")]
    Empty,
    /// Input was not an unsigned decimal integer
    #[error("invalid chain ID: {0}")]
    Invalid(String),
}

impl ChainIdParseError {
    /// The rejected input, empty for [`ChainIdParseError::Empty`]
    pub fn input(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Invalid(input) => input,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChainIdParseError::Empty);
        }

        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ChainIdParseError::Invalid(s.to_string()))
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChainIdVisitor;

        impl serde::de::Visitor<'_> for ChainIdVisitor {
            type Value = ChainId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "a numeric chain ID (137) or chain ID string (\"137\")"
                )
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ChainId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(value).map(ChainId).map_err(|_| {
                    E::invalid_value(
                        serde::de::Unexpected::Signed(value),
                        &"a non-negative chain ID",
                    )
                })
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                ChainId::from_str(value).map_err(|_| {
                    E::invalid_value(serde::de::Unexpected::Str(value), &"a decimal chain ID")
                })
            }
        }

        deserializer.deserialize_any(ChainIdVisitor)
    }
}

/// Static routing metadata for one supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Human-readable chain name
    #[schema(example = "Ethereum")]
    pub name: String,
    /// Chain identifier used for lookups
    pub chain_id: ChainId,
    /// Key of the adapter instance serving this chain
    #[serde(rename = "provider")]
    #[schema(example = "ethereum")]
    pub provider_key: String,
}

impl ChainConfig {
    /// Create a new chain configuration
    pub fn new(
        name: impl Into<String>,
        chain_id: impl Into<ChainId>,
        provider_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            chain_id: chain_id.into(),
            provider_key: provider_key.into(),
        }
    }
}
