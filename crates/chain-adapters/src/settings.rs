// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Adapter configuration supplied by the hosting process

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{NonEmptyString, http::DEFAULT_UPSTREAM_TIMEOUT_SECONDS};

/// Settings shared by every adapter the registry constructs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterSettings {
    /// Per-call upstream timeout in seconds
    pub timeout_seconds: u64,
    /// Upstream API keys
    pub api_keys: ApiKeys,
    /// Base URL overrides keyed by provider key
    pub endpoints: HashMap<String, NonEmptyString>,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
            api_keys: ApiKeys::default(),
            endpoints: HashMap::new(),
        }
    }
}

impl AdapterSettings {
    /// Base URL for a provider, falling back to its public default
    pub fn endpoint(&self, provider_key: &str, default: &str) -> String {
        self.endpoints
            .get(provider_key)
            .map_or_else(|| default.to_string(), ToString::to_string)
    }

    /// Point a provider at a different base URL
    #[must_use]
    pub fn with_endpoint(
        mut self,
        provider_key: impl Into<String>,
        base_url: NonEmptyString,
    ) -> Self {
        self.endpoints.insert(provider_key.into(), base_url);
        self
    }
}

/// Upstream API keys
///
/// Every key is optional; explorers accept keyless calls on their public tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ApiKeys {
    pub etherscan: Option<String>,
    pub arbiscan: Option<String>,
    pub polygonscan: Option<String>,
    pub bscscan: Option<String>,
    pub ftmscan: Option<String>,
    pub optimism: Option<String>,
    pub basescan: Option<String>,
    pub hiro: Option<String>,
    pub blockfrost: Option<String>,
    pub subscan: Option<String>,
}

/// Treat blank keys as absent
pub(crate) fn present(key: Option<&String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
