// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Upstream fixtures shared by the registry integration tests
//!
//! Every adapter built by the bootstrap can be redirected to a mock server
//! through its provider key, so these helpers mount canned upstream payloads
//! and return settings pointing at them.

use chain_adapters::{AdapterSettings, NonEmptyString};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

pub const EVM_ADDRESS: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const OSMO_ADDRESS: &str = "osmo1clpqr4nrk4khgkxj78fcwwh6dl3uw4epasmvnj";
pub const DOT_ADDRESS: &str = "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5";

/// Settings routing `provider_keys` to `server`, each under its own path prefix
pub fn settings_for(server: &MockServer, provider_keys: &[&str]) -> AdapterSettings {
    provider_keys
        .iter()
        .fold(AdapterSettings::default(), |settings, key| {
            let url = NonEmptyString::new(format!("{}/{key}", server.uri())).unwrap();
            settings.with_endpoint(*key, url)
        })
}

/// Etherscan `account/balance` answering one ether
pub async fn mount_ethereum_balance(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ethereum"))
        .and(query_param("module", "account"))
        .and(query_param("action", "balance"))
        .and(query_param("address", EVM_ADDRESS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": "1000000000000000000"
        })))
        .mount(server)
        .await;
}

/// Osmosis bank balances holding 5 OSMO and one IBC asset
pub async fn mount_osmosis_balances(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/osmosis-cosmos/cosmos/bank/v1beta1/balances/{OSMO_ADDRESS}"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "balances": [
                {
                    "denom": "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2",
                    "amount": "2500000"
                },
                {"denom": "uosmo", "amount": "5000000"}
            ],
            "pagination": {"next_key": null, "total": "2"}
        })))
        .mount(server)
        .await;
}
