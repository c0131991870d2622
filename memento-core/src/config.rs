use std::hash::Hash;

use serde::Deserialize;

use crate::{BoundedStore, CacheStore, EvictionPolicy, MapStore};

/// Store selection that can be loaded from a configuration file.
///
/// Without a `limit` the store is the default unbounded map; with one it is a
/// [`BoundedStore`] using `policy` (LRU when omitted).
///
/// ```
/// use memento_core::{CacheStore, StoreConfig};
///
/// let config: StoreConfig = serde_json::from_str(r#"{ "limit": 2, "policy": "fifo" }"#).unwrap();
/// let mut store = config.build::<u32, u32>();
/// store.insert(1, 1);
/// store.insert(2, 2);
/// store.insert(3, 3);
/// assert_eq!(store.len(), 2);
/// assert!(!store.contains(&1));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub limit: Option<usize>,
    pub policy: EvictionPolicy,
}

impl StoreConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn bounded(limit: usize, policy: EvictionPolicy) -> Self {
        Self {
            limit: Some(limit),
            policy,
        }
    }

    pub fn build<K, V>(&self) -> ConfiguredStore<K, V> {
        match self.limit {
            Some(limit) => ConfiguredStore::Bounded(BoundedStore::new(limit, self.policy)),
            None => ConfiguredStore::Unbounded(MapStore::new()),
        }
    }

    /// A cache factory for [`MemoOptions::cache_factory`](crate::MemoOptions::cache_factory).
    pub fn factory<K, V>(self) -> impl FnOnce() -> ConfiguredStore<K, V> {
        move || self.build()
    }
}

/// Store chosen at runtime from a [`StoreConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredStore<K, V> {
    Unbounded(MapStore<K, V>),
    Bounded(BoundedStore<K, V>),
}

impl<K: Eq + Hash + Clone, V: Clone> CacheStore<K, V> for ConfiguredStore<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        match self {
            ConfiguredStore::Unbounded(store) => store.get(key),
            ConfiguredStore::Bounded(store) => store.get(key),
        }
    }

    fn insert(&mut self, key: K, value: V) {
        match self {
            ConfiguredStore::Unbounded(store) => store.insert(key, value),
            ConfiguredStore::Bounded(store) => store.insert(key, value),
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        match self {
            ConfiguredStore::Unbounded(store) => store.remove(key),
            ConfiguredStore::Bounded(store) => store.remove(key),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            ConfiguredStore::Unbounded(store) => store.contains(key),
            ConfiguredStore::Bounded(store) => store.contains(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            ConfiguredStore::Unbounded(store) => store.len(),
            ConfiguredStore::Bounded(store) => store.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            ConfiguredStore::Unbounded(store) => store.clear(),
            ConfiguredStore::Bounded(store) => store.clear(),
        }
    }
}
