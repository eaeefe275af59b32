// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-id to adapter routing
//!
//! The registry holds two tables: the supported chains (each naming a
//! provider key) and one adapter instance per provider key. Several chains
//! may share a provider key and therefore the same adapter instance.

use std::{collections::HashMap, sync::Arc};

use shared_types::{ChainConfig, ChainId};
use tracing::debug;

use crate::ChainAdapter;

/// Routing table from chain identifiers to adapter instances
#[derive(Debug)]
pub struct AdapterRegistry<A = ChainAdapter> {
    chains: Vec<ChainConfig>,
    adapters: HashMap<String, Arc<A>>,
}

impl<A> Default for AdapterRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> AdapterRegistry<A> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            chains: Vec::new(),
            adapters: HashMap::new(),
        }
    }

    /// Adapter serving `chain_id`
    ///
    /// Returns `None` when the chain is not registered or its provider key has
    /// no adapter bound.
    pub fn resolve(&self, chain_id: ChainId) -> Option<Arc<A>> {
        let config = self.chain_config(chain_id)?;
        let adapter = self.adapters.get(&config.provider_key).cloned();
        if adapter.is_none() {
            debug!(%chain_id, provider = config.provider_key, "chain has no adapter bound");
        }
        adapter
    }

    /// Routing metadata for `chain_id`
    pub fn chain_config(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.iter().find(|chain| chain.chain_id == chain_id)
    }

    /// Every registered chain in registration order
    pub fn list_supported_chains(&self) -> Vec<ChainConfig> {
        self.chains.clone()
    }

    /// Add a chain, replacing any existing entry with the same id in place
    pub fn register_chain(&mut self, config: ChainConfig) {
        match self
            .chains
            .iter_mut()
            .find(|chain| chain.chain_id == config.chain_id)
        {
            Some(existing) => *existing = config,
            None => self.chains.push(config),
        }
    }

    /// Bind an adapter to a provider key, replacing any previous binding
    pub fn register_adapter(
        &mut self,
        provider_key: impl Into<String>,
        adapter: impl Into<Arc<A>>,
    ) {
        self.adapters.insert(provider_key.into(), adapter.into());
    }

    /// Number of bound adapter instances
    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }

    /// Bound provider keys, sorted
    pub fn provider_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.adapters.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Stub(&'static str);

    fn registry() -> AdapterRegistry<Stub> {
        let mut registry = AdapterRegistry::new();
        registry.register_chain(ChainConfig::new("Ethereum", 1, "explorer"));
        registry.register_chain(ChainConfig::new("Base", 8453, "explorer"));
        registry.register_chain(ChainConfig::new("Orphan", 7, "missing"));
        registry.register_adapter("explorer", Stub("explorer"));
        registry
    }

    #[test]
    fn resolves_shared_instance() {
        let registry = registry();

        let ethereum = registry.resolve(ChainId::new(1)).unwrap();
        let base = registry.resolve(ChainId::new(8453)).unwrap();
        assert!(Arc::ptr_eq(&ethereum, &base));
        assert!(Arc::ptr_eq(
            &ethereum,
            &registry.resolve(ChainId::new(1)).unwrap()
        ));
    }

    #[test]
    fn unknown_chain_or_provider() {
        let registry = registry();

        assert!(registry.resolve(ChainId::new(999_999)).is_none());
        assert!(registry.resolve(ChainId::new(7)).is_none());
        assert!(registry.chain_config(ChainId::new(7)).is_some());
    }

    #[test]
    fn register_chain_upserts() {
        let mut registry = registry();
        registry.register_chain(ChainConfig::new("Mainnet", 1, "explorer"));

        let chains = registry.list_supported_chains();
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[0].name, "Mainnet");
    }

    #[test]
    fn register_adapter_replaces() {
        let mut registry = registry();
        registry.register_adapter("explorer", Stub("replacement"));
        registry.register_adapter("other", Stub("other"));

        assert_eq!(registry.adapter_count(), 2);
        assert_eq!(registry.provider_keys(), vec!["explorer", "other"]);
        assert_eq!(
            *registry.resolve(ChainId::new(1)).unwrap(),
            Stub("replacement")
        );
    }

    #[test]
    fn listing_is_a_copy() {
        let registry = registry();
        let mut chains = registry.list_supported_chains();
        chains.clear();
        assert_eq!(registry.list_supported_chains().len(), 3);
    }
}
