// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Non-empty string validation for adapter configuration
//!
//! Base URLs and display names are wrapped in [`NonEmptyString`] so an adapter
//! can never be constructed against a blank endpoint.
//!
//! ```rust
//! use chain_adapters::NonEmptyString;
//!
//! let base_url = NonEmptyString::new("https://api.etherscan.io/api").unwrap();
//! assert_eq!(base_url.as_str(), "https://api.etherscan.io/api");
//!
//! assert!(NonEmptyString::new("   ").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A string with at least one non-whitespace character
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(Box<str>);

impl NonEmptyString {
    /// Validate and wrap a string
    ///
    /// Surrounding whitespace is kept; only blank input is rejected.
    pub fn new(s: impl Into<String>) -> Result<Self, String> {
        let s = s.into();
        if s.trim().is_empty() {
            Err("String cannot be empty or whitespace-only".to_string())
        } else {
            Ok(NonEmptyString(s.into_boxed_str()))
        }
    }

    /// Borrow the contained value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NonEmptyString {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0.into_string()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
