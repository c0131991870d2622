use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::utils::{find_min_frequency_key, move_key_to_end, remove_key};
use crate::{CacheEntry, CacheStore, EvictionPolicy};

/// Opt-in store with an entry limit and an [`EvictionPolicy`].
///
/// Memoization normally trades memory for time without bound; this store is
/// for callers who need a ceiling. Once an insert pushes the entry count past
/// `limit`, one entry is evicted according to the policy:
///
/// - **FIFO**: the oldest inserted key (front of the order queue)
/// - **LRU**: the least recently read key (front of the order queue; hits move
///   keys to the back)
/// - **LFU**: the key with the fewest hits, oldest first on ties
/// - **Random**: a uniformly random key
///
/// LFU and Random never evict the key just inserted unless it is the only
/// entry, so a fresh key is not dropped for having no hits yet. A limit of
/// `0` caches nothing.
///
/// # Examples
///
/// ```
/// use memento_core::{BoundedStore, CacheStore, EvictionPolicy};
///
/// let mut store = BoundedStore::new(2, EvictionPolicy::LRU);
/// store.insert("a", 1);
/// store.insert("b", 2);
/// let _ = store.get(&"a"); // "a" is now the most recently used
/// store.insert("c", 3);    // evicts "b"
///
/// assert!(store.contains(&"a"));
/// assert!(!store.contains(&"b"));
/// assert!(store.contains(&"c"));
/// ```
#[derive(Debug, Clone)]
pub struct BoundedStore<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    order: VecDeque<K>,
    limit: usize,
    policy: EvictionPolicy,
}

impl<K, V> BoundedStore<K, V> {
    pub fn new(limit: usize, policy: EvictionPolicy) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            limit,
            policy,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }
}

impl<K: Eq + Hash + Clone, V> BoundedStore<K, V> {
    /// Evicts entries until the store is within its limit.
    fn enforce_limit(&mut self) {
        while self.map.len() > self.limit {
            let victim = match self.policy {
                EvictionPolicy::FIFO | EvictionPolicy::LRU => self.order.front().cloned(),
                // The newest key sits at the back and is never the victim
                // unless it is the only one.
                EvictionPolicy::LFU => match self.order.len() {
                    0 => None,
                    1 => self.order.front().cloned(),
                    len => find_min_frequency_key(&self.map, self.order.range(..len - 1)),
                },
                EvictionPolicy::Random => match self.order.len() {
                    0 => None,
                    1 => self.order.front().cloned(),
                    len => self.order.get(fastrand::usize(..len - 1)).cloned(),
                },
            };

            match victim {
                Some(key) => {
                    remove_key(&mut self.map, &mut self.order, &key);
                }
                None => break,
            }
        }
    }
}

impl<K: Eq + Hash + Clone, V: Clone> CacheStore<K, V> for BoundedStore<K, V> {
    fn get(&mut self, key: &K) -> Option<V> {
        let entry = self.map.get_mut(key)?;
        if self.policy == EvictionPolicy::LFU {
            entry.increment_frequency();
        }
        let value = entry.value.clone();
        if self.policy == EvictionPolicy::LRU {
            move_key_to_end(&mut self.order, key);
        }
        Some(value)
    }

    fn insert(&mut self, key: K, value: V) {
        if self.map.insert(key.clone(), CacheEntry::new(value)).is_some() {
            if let Some(pos) = self.order.iter().position(|k| *k == key) {
                self.order.remove(pos);
            }
        }
        self.order.push_back(key);
        self.enforce_limit();
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        remove_key(&mut self.map, &mut self.order, key)
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }
}
