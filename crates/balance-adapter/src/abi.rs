// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Minimal ERC-20 call encoding and return-data decoding
//!
//! Only what token metadata and balance lookups over raw `eth_call` need:
//! the four selectors, address word padding and dynamic `string` decoding.

use std::str::FromStr;

use alloy_primitives::{Address, U256, hex};

use crate::BalanceError;

/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: &str = "0x70a08231";
/// `symbol()`
pub const SYMBOL_SELECTOR: &str = "0x95d89b41";
/// `name()`
pub const NAME_SELECTOR: &str = "0x06fdde03";
/// `decimals()`
pub const DECIMALS_SELECTOR: &str = "0x313ce567";

const WORD: usize = 32;

/// Left-pad a 20-byte address into a 32-byte hex call-data word
pub fn pad_address_word(address: &str) -> Result<String, BalanceError> {
    let address = Address::from_str(address.trim()).map_err(|e| BalanceError::InvalidResponse {
        message: format!("invalid EVM address '{address}': {e}"),
    })?;

    Ok(format!("{:0>64}", hex::encode(address.as_slice())))
}

/// Call data for `balanceOf(address)`
pub fn balance_of_call_data(address: &str) -> Result<String, BalanceError> {
    Ok(format!("{BALANCE_OF_SELECTOR}{}", pad_address_word(address)?))
}

/// Decode an ABI-encoded `string` return value
///
/// Handles the standard dynamic encoding (offset word, length word, payload)
/// and the legacy fixed `bytes32` form. Returns `None` when the data does not
/// hold a non-empty UTF-8 string.
pub fn decode_abi_string(data: &str) -> Option<String> {
    let bytes = hex::decode(data.trim()).ok()?;

    let decoded = if bytes.len() == WORD {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(WORD);
        String::from_utf8(bytes[..end].to_vec()).ok()?
    } else {
        let offset = word_as_usize(&bytes, 0)?;
        let length = word_as_usize(&bytes, offset)?;
        let start = offset.checked_add(WORD)?;
        let end = start.checked_add(length)?;
        String::from_utf8(bytes.get(start..end)?.to_vec()).ok()?
    };

    let decoded = decoded.trim_end_matches('\0').to_string();
    (!decoded.is_empty()).then_some(decoded)
}

/// Decode a `uint8` return value such as `decimals()`
pub fn decode_abi_u8(data: &str) -> Option<u8> {
    let bytes = hex::decode(data.trim()).ok()?;
    let word = bytes.get(..WORD)?;
    u8::try_from(U256::from_be_slice(word)).ok()
}

fn word_as_usize(bytes: &[u8], at: usize) -> Option<usize> {
    let word = bytes.get(at..at.checked_add(WORD)?)?;
    usize::try_from(U256::from_be_slice(word)).ok()
}
