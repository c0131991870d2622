//! Order-queue helpers shared by the bounded store's eviction policies.

use crate::CacheEntry;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Moves a key to the end of the order queue (marks as most recently used).
///
/// If the key is not in the queue, the queue is left unchanged.
///
/// # Performance
///
/// O(n) in the length of the queue.
///
/// # Examples
///
/// ```
/// use std::collections::VecDeque;
/// use memento_core::utils::move_key_to_end;
///
/// let mut order = VecDeque::from(vec!["key1", "key2", "key3"]);
/// move_key_to_end(&mut order, &"key2");
/// assert_eq!(order, VecDeque::from(vec!["key1", "key3", "key2"]));
///
/// move_key_to_end(&mut order, &"missing");
/// assert_eq!(order.len(), 3);
/// ```
pub fn move_key_to_end<K: PartialEq>(order: &mut VecDeque<K>, key: &K) {
    if let Some(pos) = order.iter().position(|k| k == key) {
        if let Some(k) = order.remove(pos) {
            order.push_back(k);
        }
    }
}

/// Finds the key with the minimum access frequency among `candidates`,
/// walked from oldest to newest.
///
/// Candidates that have no entry in the map are skipped. On ties the oldest
/// key wins.
///
/// # Examples
///
/// ```
/// use std::collections::{HashMap, VecDeque};
/// use memento_core::{CacheEntry, utils::find_min_frequency_key};
///
/// let mut map = HashMap::new();
/// map.insert("a", CacheEntry { value: 1, frequency: 5 });
/// map.insert("b", CacheEntry { value: 2, frequency: 2 });
/// map.insert("c", CacheEntry { value: 3, frequency: 2 });
///
/// let order = VecDeque::from(vec!["a", "b", "c"]);
/// assert_eq!(find_min_frequency_key(&map, &order), Some("b"));
/// ```
pub fn find_min_frequency_key<'a, K, V, I>(
    map: &HashMap<K, CacheEntry<V>>,
    candidates: I,
) -> Option<K>
where
    K: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let mut min: Option<(&K, u64)> = None;
    for key in candidates {
        if let Some(entry) = map.get(key) {
            match min {
                Some((_, freq)) if entry.frequency >= freq => {}
                _ => min = Some((key, entry.frequency)),
            }
        }
    }
    min.map(|(key, _)| key.clone())
}

/// Removes a key from both the map and the order queue.
///
/// Returns the removed value, if the key was present in the map.
pub fn remove_key<K, V>(
    map: &mut HashMap<K, CacheEntry<V>>,
    order: &mut VecDeque<K>,
    key: &K,
) -> Option<V>
where
    K: Eq + Hash,
{
    if let Some(pos) = order.iter().position(|k| k == key) {
        order.remove(pos);
    }
    map.remove(key).map(|entry| entry.value)
}
