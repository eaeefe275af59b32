// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the bootstrapped `AdapterRegistry`
//!
//! Adapters are built exactly as in production and redirected to wiremock
//! through endpoint overrides.

use std::sync::Arc;

use balance_adapter::{BalanceAdapter, BalanceError};
use chain_adapters::{AdapterRegistry, DEFAULT_CHAINS};
use shared_types::{ChainConfig, ChainId};
use wiremock::MockServer;

mod fixtures;
use fixtures::*;

#[tokio::test]
async fn ethereum_native_balance_is_scaled() {
    let mock_server = MockServer::start().await;
    mount_ethereum_balance(&mock_server).await;

    let registry = AdapterRegistry::bootstrap(&settings_for(&mock_server, &["ethereum"])).unwrap();
    let adapter = registry.resolve(ChainId::new(1)).unwrap();

    let record = adapter
        .get_native_balance(ChainId::new(1), EVM_ADDRESS)
        .await
        .unwrap();

    assert_eq!(record.amount, "1");
    assert_eq!(record.ticker, "ETH");
    assert_eq!(record.raw_metadata.source, "Ethereum API");
    assert_eq!(record.raw_metadata.chain, "Ethereum");
    assert_eq!(record.wallet_id, "bitwave-wallet-id-0xd8dA6B");
    assert_eq!(record.remote_wallet_id, EVM_ADDRESS);
}

#[tokio::test]
async fn osmosis_native_and_tokens() {
    let mock_server = MockServer::start().await;
    mount_osmosis_balances(&mock_server).await;

    let registry =
        AdapterRegistry::bootstrap(&settings_for(&mock_server, &["osmosis-cosmos"])).unwrap();
    let adapter = registry.resolve(ChainId::new(8011)).unwrap();

    let native = adapter
        .get_native_balance(ChainId::new(8011), OSMO_ADDRESS)
        .await
        .unwrap();
    assert_eq!(native.ticker, "OSMO");
    assert_eq!(native.amount, "5");
    assert_eq!(native.raw_metadata.source, "Osmosis REST API");

    let all = adapter
        .get_balances(ChainId::new(8011), OSMO_ADDRESS)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|r| r.ticker == "IBC-27394F" && r.amount == "2.5"));
}

#[tokio::test]
async fn polkadot_tokens_are_unsupported() {
    let registry = AdapterRegistry::bootstrap(&Default::default()).unwrap();
    let adapter = registry.resolve(ChainId::new(354)).unwrap();

    // Rejected before any upstream call
    let result = adapter
        .get_erc20_balance(ChainId::new(354), DOT_ADDRESS, "USDT")
        .await;
    assert!(matches!(result, Err(BalanceError::Unsupported { .. })));

    let tokens = adapter
        .get_erc20_balances(ChainId::new(354), DOT_ADDRESS)
        .await
        .unwrap();
    assert!(tokens.is_empty());
}

#[tokio::test]
async fn non_enumerating_chains_return_no_tokens() {
    let registry = AdapterRegistry::bootstrap(&Default::default()).unwrap();

    for chain_id in [1, 43114, 397, 314, 900, 555, 0, 2] {
        let adapter = registry.resolve(ChainId::new(chain_id)).unwrap();
        let tokens = adapter
            .get_erc20_balances(ChainId::new(chain_id), EVM_ADDRESS)
            .await
            .unwrap();
        assert!(tokens.is_empty(), "chain {chain_id} enumerated tokens");
    }
}

#[test]
fn resolve_is_idempotent_for_every_chain() {
    let registry = AdapterRegistry::bootstrap(&Default::default()).unwrap();

    for (_, chain_id, _) in DEFAULT_CHAINS {
        let first = registry.resolve(ChainId::new(*chain_id)).unwrap();
        let second = registry.resolve(ChainId::new(*chain_id)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
    assert!(registry.resolve(ChainId::new(999_999)).is_none());
}

#[test]
fn re_registering_a_chain_rebinds_it() {
    let mut registry = AdapterRegistry::bootstrap(&Default::default()).unwrap();
    registry.register_chain(ChainConfig::new("Ethereum", 1, "polygon"));

    let chains = registry.list_supported_chains();
    let ethereum: Vec<_> = chains.iter().filter(|c| c.chain_id == ChainId::new(1)).collect();
    assert_eq!(ethereum.len(), 1);
    assert_eq!(ethereum[0].provider_key, "polygon");

    let rebound = registry.resolve(ChainId::new(1)).unwrap();
    let polygon = registry.resolve(ChainId::new(137)).unwrap();
    assert!(Arc::ptr_eq(&rebound, &polygon));
}
