// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Default chain table and adapter construction

use balance_adapter::BalanceError;
use reqwest::Client;
use shared_types::ChainConfig;
use tracing::info;

use crate::{
    AdapterRegistry, ChainAdapter, NonEmptyString,
    arweave::ArweaveAdapter,
    cardano::CardanoAdapter,
    cosmos::{CosmosAdapter, CosmosConfig},
    deso::DesoAdapter,
    evm_rpc::{EvmRpcAdapter, EvmRpcConfig},
    explorer::{ExplorerAdapter, ExplorerConfig},
    filecoin::FilecoinAdapter,
    hedera::HederaAdapter,
    http::{UpstreamClient, build_http_client},
    near::NearAdapter,
    settings::{AdapterSettings, present},
    stacks::StacksAdapter,
    stellar::StellarAdapter,
    subscan::{SubscanAdapter, SubscanConfig},
    sui::SuiAdapter,
    utxo::{UtxoAdapter, UtxoConfig, UtxoExplorer},
};

/// Supported chains as `(name, chain id, provider key)`
pub const DEFAULT_CHAINS: &[(&str, u64, &str)] = &[
    ("Avalanche", 43114, "glacier"),
    ("Gnosis Chain", 100, "blockscout"),
    ("Hedera", 295, "hedera"),
    ("Litecoin", 2, "blockcypher"),
    ("Stellar", 148, "stellar"),
    ("Bitcoin", 0, "blockchain-info"),
    ("Celo", 42220, "celo-explorer"),
    ("Evmos", 9001, "evmos-cosmos"),
    ("Umee", 8001, "umee-cosmos"),
    ("Kyve", 8002, "kyve-cosmos"),
    ("Persistence", 8003, "persistence-cosmos"),
    ("Axelar", 8004, "axelar-cosmos"),
    ("Celestia", 8005, "celestia-cosmos"),
    ("Kava", 8006, "kava-cosmos"),
    ("Agoric", 8007, "agoric"),
    ("Akash", 8008, "akash-cosmos"),
    ("Regen", 8009, "regen-cosmos"),
    ("Provenance", 8010, "provenance-cosmos"),
    ("Osmosis", 8011, "osmosis-cosmos"),
    ("Arbitrum", 42161, "arbitrum"),
    ("Ethereum", 1, "ethereum"),
    ("Polygon", 137, "polygon"),
    ("Binance Smart Chain", 56, "bsc"),
    ("Fantom", 250, "fantom"),
    ("Optimism", 10, "optimism"),
    ("Base", 8453, "base"),
    ("Filecoin", 314, "filecoin"),
    ("Deso", 555, "deso"),
    ("SUI", 784, "sui"),
    ("Arweave", 900, "arweave"),
    ("Aurora", 1_313_161_554, "aurora"),
    ("Cardano", 1815, "cardano"),
    ("Kusama", 434, "kusama"),
    ("NEAR", 397, "near"),
    ("Polkadot", 354, "polkadot"),
    ("Stacks", 5757, "stacks"),
    ("Blast", 81457, "blast"),
];

/// Cosmos chains on `rest.cosmos.directory` as `(provider key, name, path, ticker)`
const COSMOS_CHAINS: &[(&str, &str, &str, &str)] = &[
    ("evmos-cosmos", "Evmos", "evmos", "EVMOS"),
    ("umee-cosmos", "Umee", "umee", "UMEE"),
    ("kyve-cosmos", "Kyve", "kyve", "KYVE"),
    ("persistence-cosmos", "Persistence", "persistence", "XPRT"),
    ("axelar-cosmos", "Axelar", "axelar", "AXL"),
    ("celestia-cosmos", "Celestia", "celestia", "TIA"),
    ("kava-cosmos", "Kava", "kava", "KAVA"),
    ("akash-cosmos", "Akash", "akash", "AKT"),
    ("regen-cosmos", "Regen", "regen", "REGEN"),
    ("provenance-cosmos", "Provenance", "provenance", "HASH"),
    ("osmosis-cosmos", "Osmosis", "osmosis", "OSMO"),
];

const COSMOS_DIRECTORY: &str = "https://rest.cosmos.directory";

fn non_empty(value: impl Into<String>) -> Result<NonEmptyString, BalanceError> {
    NonEmptyString::new(value).map_err(|message| BalanceError::Configuration { message })
}

/// Adapter construction context: settings plus the shared connection pool
struct Builder<'a> {
    settings: &'a AdapterSettings,
    client: Client,
}

impl Builder<'_> {
    fn http(&self, source_name: impl Into<String>) -> UpstreamClient {
        UpstreamClient::with_client(
            self.client.clone(),
            source_name,
            self.settings.timeout_seconds,
        )
    }

    fn url(&self, provider_key: &str, default: &str) -> Result<NonEmptyString, BalanceError> {
        non_empty(self.settings.endpoint(provider_key, default))
    }

    fn etherscan(
        &self,
        provider_key: &str,
        chain_name: &str,
        default_url: &str,
        ticker: &str,
        api_key: Option<&String>,
    ) -> Result<ChainAdapter, BalanceError> {
        let config = ExplorerConfig::etherscan(
            non_empty(chain_name)?,
            self.url(provider_key, default_url)?,
            ticker,
        )
        .with_api_key(present(api_key));
        Ok(ExplorerAdapter::new(self.http(format!("{chain_name} API")), config).into())
    }

    fn blockscout(
        &self,
        provider_key: &str,
        chain_name: &str,
        source_name: &str,
        default_url: &str,
        ticker: &str,
    ) -> Result<ChainAdapter, BalanceError> {
        let config = ExplorerConfig::blockscout(
            non_empty(chain_name)?,
            self.url(provider_key, default_url)?,
            ticker,
        );
        Ok(ExplorerAdapter::new(self.http(source_name), config).into())
    }

    fn evm_rpc(
        &self,
        provider_key: &str,
        chain_name: &str,
        default_url: &str,
        ticker: &str,
    ) -> Result<ChainAdapter, BalanceError> {
        let config = EvmRpcConfig {
            chain_name: non_empty(chain_name)?,
            rpc_url: self.url(provider_key, default_url)?,
            native_ticker: ticker.to_string(),
        };
        Ok(EvmRpcAdapter::new(self.http(format!("{chain_name} API")), config).into())
    }

    fn cosmos(&self, config: CosmosConfig) -> ChainAdapter {
        let source = format!("{} REST API", config.chain_name);
        CosmosAdapter::new(self.http(source), config).into()
    }

    fn cosmos_config(
        &self,
        provider_key: &str,
        chain_name: &str,
        path: &str,
        ticker: &str,
    ) -> Result<CosmosConfig, BalanceError> {
        Ok(CosmosConfig::new(
            non_empty(chain_name)?,
            self.url(provider_key, &format!("{COSMOS_DIRECTORY}/{path}"))?,
            ticker,
        ))
    }

    fn subscan(
        &self,
        provider_key: &str,
        chain_name: &str,
        ticker: &str,
        decimals: u8,
    ) -> Result<ChainAdapter, BalanceError> {
        let config = SubscanConfig {
            chain_name: non_empty(chain_name)?,
            base_url: self.url(provider_key, &format!("https://{provider_key}.api.subscan.io"))?,
            api_key: present(self.settings.api_keys.subscan.as_ref()),
            native_ticker: ticker.to_string(),
            native_decimals: decimals,
        };
        Ok(SubscanAdapter::new(self.http(format!("{chain_name} Subscan API")), config).into())
    }

    fn utxo(
        &self,
        provider_key: &str,
        chain_name: &str,
        source_name: &str,
        default_url: &str,
        ticker: &str,
        explorer: UtxoExplorer,
    ) -> Result<ChainAdapter, BalanceError> {
        let config = UtxoConfig {
            chain_name: non_empty(chain_name)?,
            base_url: self.url(provider_key, default_url)?,
            ticker: ticker.to_string(),
            explorer,
        };
        Ok(UtxoAdapter::new(self.http(source_name), config).into())
    }

    /// One adapter per provider key
    fn adapters(&self) -> Result<Vec<(String, ChainAdapter)>, BalanceError> {
        let keys = &self.settings.api_keys;
        let mut adapters: Vec<(&str, ChainAdapter)> = vec![
            (
                "ethereum",
                self.etherscan(
                    "ethereum",
                    "Ethereum",
                    "https://api.etherscan.io/api",
                    "ETH",
                    keys.etherscan.as_ref(),
                )?,
            ),
            (
                "arbitrum",
                self.etherscan(
                    "arbitrum",
                    "Arbitrum",
                    "https://api.arbiscan.io/api",
                    "ETH",
                    keys.arbiscan.as_ref(),
                )?,
            ),
            (
                "polygon",
                self.etherscan(
                    "polygon",
                    "Polygon",
                    "https://api.polygonscan.com/api",
                    "MATIC",
                    keys.polygonscan.as_ref(),
                )?,
            ),
            (
                "bsc",
                self.etherscan(
                    "bsc",
                    "Binance Smart Chain",
                    "https://api.bscscan.com/api",
                    "BNB",
                    keys.bscscan.as_ref(),
                )?,
            ),
            (
                "fantom",
                self.etherscan(
                    "fantom",
                    "Fantom",
                    "https://api.ftmscan.com/api",
                    "FTM",
                    keys.ftmscan.as_ref(),
                )?,
            ),
            (
                "optimism",
                self.etherscan(
                    "optimism",
                    "Optimism",
                    "https://api-optimistic.etherscan.io/api",
                    "ETH",
                    keys.optimism.as_ref(),
                )?,
            ),
            (
                "base",
                self.etherscan(
                    "base",
                    "Base",
                    "https://api.basescan.org/api",
                    "ETH",
                    keys.basescan.as_ref(),
                )?,
            ),
            (
                "blockscout",
                self.blockscout(
                    "blockscout",
                    "Gnosis Chain",
                    "Blockscout API",
                    "https://gnosis.blockscout.com/api",
                    "xDAI",
                )?,
            ),
            (
                "celo-explorer",
                self.blockscout(
                    "celo-explorer",
                    "Celo",
                    "Celo Explorer API",
                    "https://explorer.celo.org/mainnet/api",
                    "CELO",
                )?,
            ),
            (
                "aurora",
                self.blockscout(
                    "aurora",
                    "Aurora",
                    "Aurora Explorer API",
                    "https://explorer.mainnet.aurora.dev/api",
                    "ETH",
                )?,
            ),
            (
                "glacier",
                self.evm_rpc(
                    "glacier",
                    "Avalanche",
                    "https://api.avax.network/ext/bc/C/rpc",
                    "AVAX",
                )?,
            ),
            ("blast", self.evm_rpc("blast", "Blast", "https://rpc.blast.io", "ETH")?),
            (
                "agoric",
                self.cosmos(
                    self.cosmos_config("agoric", "Agoric", "agoric", "BLD")?
                        .with_denom("uist", "IST"),
                ),
            ),
            (
                "near",
                NearAdapter::new(
                    self.http("NEAR RPC API"),
                    self.url("near", "https://rpc.mainnet.near.org")?,
                )
                .into(),
            ),
            (
                "sui",
                SuiAdapter::new(
                    self.http("SUI API"),
                    self.url("sui", "https://fullnode.mainnet.sui.io:443")?,
                )
                .into(),
            ),
            (
                "stellar",
                StellarAdapter::new(
                    self.http("Stellar Horizon API"),
                    self.url("stellar", "https://horizon.stellar.org")?,
                )
                .into(),
            ),
            (
                "hedera",
                HederaAdapter::new(
                    self.http("Hedera Mirror Node API"),
                    self.url("hedera", "https://mainnet-public.mirrornode.hedera.com")?,
                )
                .into(),
            ),
            (
                "stacks",
                StacksAdapter::new(
                    self.http("Stacks API"),
                    self.url("stacks", "https://api.hiro.so")?,
                    present(keys.hiro.as_ref()),
                )
                .into(),
            ),
            ("polkadot", self.subscan("polkadot", "Polkadot", "DOT", 10)?),
            ("kusama", self.subscan("kusama", "Kusama", "KSM", 12)?),
            (
                "cardano",
                CardanoAdapter::new(
                    self.http("Cardano Blockfrost API"),
                    self.url("cardano", "https://cardano-mainnet.blockfrost.io/api/v0")?,
                    present(keys.blockfrost.as_ref()),
                )
                .into(),
            ),
            (
                "filecoin",
                FilecoinAdapter::new(
                    self.http("Filfox API"),
                    self.url("filecoin", "https://filfox.info/api/v1")?,
                )
                .into(),
            ),
            (
                "arweave",
                ArweaveAdapter::new(
                    self.http("Arweave API"),
                    self.url("arweave", "https://arweave.net")?,
                )
                .into(),
            ),
            (
                "deso",
                DesoAdapter::new(
                    self.http("Deso API"),
                    self.url("deso", "https://api.deso.org/api/v0")?,
                )
                .into(),
            ),
            (
                "blockcypher",
                self.utxo(
                    "blockcypher",
                    "Litecoin",
                    "BlockCypher API",
                    "https://api.blockcypher.com/v1/ltc/main",
                    "LTC",
                    UtxoExplorer::BlockCypher,
                )?,
            ),
            (
                "blockchain-info",
                self.utxo(
                    "blockchain-info",
                    "Bitcoin",
                    "Blockchain.info API",
                    "https://blockchain.info",
                    "BTC",
                    UtxoExplorer::BlockchainInfo,
                )?,
            ),
        ];

        for (provider_key, chain_name, path, ticker) in COSMOS_CHAINS {
            let config = self.cosmos_config(provider_key, chain_name, path, ticker)?;
            adapters.push((*provider_key, self.cosmos(config)));
        }

        Ok(adapters
            .into_iter()
            .map(|(key, adapter)| (key.to_string(), adapter))
            .collect())
    }
}

impl AdapterRegistry<ChainAdapter> {
    /// Registry with the default chain table and one adapter per provider key
    ///
    /// All adapters share one connection pool. Base URLs can be redirected per
    /// provider key through [`AdapterSettings::endpoints`].
    pub fn bootstrap(settings: &AdapterSettings) -> Result<Self, BalanceError> {
        let builder = Builder {
            settings,
            client: build_http_client(settings.timeout_seconds)?,
        };

        let mut registry = Self::new();
        for (name, chain_id, provider_key) in DEFAULT_CHAINS {
            registry.register_chain(ChainConfig::new(*name, *chain_id, *provider_key));
        }
        for (provider_key, adapter) in builder.adapters()? {
            registry.register_adapter(provider_key, adapter);
        }

        info!(
            chains = registry.list_supported_chains().len(),
            adapters = registry.adapter_count(),
            "adapter registry ready"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use balance_adapter::BalanceAdapter;
    use shared_types::ChainId;

    use super::*;

    #[test]
    fn every_chain_resolves() {
        let registry = AdapterRegistry::bootstrap(&AdapterSettings::default()).unwrap();

        assert_eq!(registry.list_supported_chains().len(), DEFAULT_CHAINS.len());
        for (name, chain_id, _) in DEFAULT_CHAINS {
            assert!(
                registry.resolve(ChainId::new(*chain_id)).is_some(),
                "{name} has no adapter"
            );
        }
        assert_eq!(registry.adapter_count(), DEFAULT_CHAINS.len());
    }

    #[test]
    fn families_by_chain() {
        let registry = AdapterRegistry::bootstrap(&AdapterSettings::default()).unwrap();
        let family = |id: u64| registry.resolve(ChainId::new(id)).unwrap().name();

        assert_eq!(family(1), "etherscan");
        assert_eq!(family(100), "blockscout");
        assert_eq!(family(42220), "blockscout");
        assert_eq!(family(43114), "evm-rpc");
        assert_eq!(family(8011), "cosmos");
        assert_eq!(family(397), "near");
        assert_eq!(family(0), "blockchain-info");
        assert_eq!(family(2), "blockcypher");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let settings = AdapterSettings {
            timeout_seconds: 0,
            ..AdapterSettings::default()
        };
        let result = AdapterRegistry::bootstrap(&settings);
        assert!(matches!(result, Err(BalanceError::Configuration { .. })));
    }
}
