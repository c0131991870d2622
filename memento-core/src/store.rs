use std::collections::HashMap;
use std::hash::Hash;

/// Key-value storage behind a memoized function.
///
/// A wrapper owns exactly one store, created by its cache factory when the
/// function is wrapped. `get` takes `&mut self` so stores can update their own
/// bookkeeping (recency, frequency, dead-entry cleanup) on reads.
///
/// Implementations decide their own retention: [`MapStore`] keeps everything,
/// [`IdentityStore`](crate::IdentityStore) drops entries whose key object is
/// gone, [`BoundedStore`](crate::BoundedStore) evicts past a limit.
///
/// # Examples
///
/// ```
/// use memento_core::{CacheStore, MapStore};
///
/// let mut store = MapStore::new();
/// store.insert("answer".to_string(), 42);
/// assert_eq!(store.get(&"answer".to_string()), Some(42));
/// assert_eq!(store.len(), 1);
/// ```
pub trait CacheStore<K, V> {
    /// Returns a clone of the stored value, if any.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Stores `value` under `key`, replacing any previous value.
    fn insert(&mut self, key: K, value: V);

    /// Removes and returns the value stored under `key`.
    fn remove(&mut self, key: &K) -> Option<V>;

    fn contains(&self, key: &K) -> bool;

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

/// Unbounded `HashMap` store; the default for every wrapper.
///
/// Entries are never evicted. Memory grows with the number of distinct keys
/// for as long as the wrapper lives; use [`CacheStore::remove`] /
/// [`CacheStore::clear`] (or the wrapper's `invalidate` / `clear`) to release
/// it by hand.
#[derive(Debug, Clone)]
pub struct MapStore<K, V> {
    map: HashMap<K, V>,
}

impl<K, V> MapStore<K, V> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }
}

impl<K, V> Default for MapStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V: Clone> CacheStore<K, V> for MapStore<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces() {
        let mut store = MapStore::new();
        store.insert(1, "one");
        store.insert(1, "uno");
        assert_eq!(store.get(&1), Some("uno"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = MapStore::with_capacity(4);
        store.insert("a", 1);
        store.insert("b", 2);

        assert_eq!(store.remove(&"a"), Some(1));
        assert!(!store.contains(&"a"));
        assert!(store.contains(&"b"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_never_evicts() {
        let mut store = MapStore::new();
        for i in 0..10_000 {
            store.insert(i, i * 2);
        }
        assert_eq!(store.len(), 10_000);
        assert_eq!(store.get(&0), Some(0));
    }
}
