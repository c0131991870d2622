//! Identity-keyed caching for `Arc` arguments.
//!
//! Value-based keys need the argument rendered to a string, which is wasteful
//! for large objects and impossible for values without a canonical rendering.
//! [`ByIdentity`] keys a call by the *address* of its `Arc<T>` argument
//! instead, and [`IdentityStore`] holds only a [`Weak`] reference to that
//! object, so caching never keeps the object alive.
//!
//! # Precondition
//!
//! Identity keys treat two calls as equal exactly when they receive the same
//! allocation. The wrapper performs no deep-equality reasoning: if an object
//! reachable through the `Arc` can change (interior mutability), the cached
//! result may describe its old state. Callers relying on identity keys must
//! ensure that pointer-equal arguments imply equal inputs.
//!
//! # Reclamation
//!
//! When the last strong `Arc` to a key object is dropped, the object's
//! destructor runs and any heap memory it owns is freed, whether or not the
//! cache still has an entry for it. The remaining `Weak` only pins the small
//! `Arc` header allocation, and the entry itself is dropped on the next purge:
//! purges run automatically as the store grows (amortised over inserts) and on
//! demand through [`IdentityStore::purge_dead`].

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::{CacheStore, KeyFn};

const MIN_PURGE_THRESHOLD: usize = 32;

/// Cache key identifying an `Arc` allocation by address.
///
/// Holds a [`Weak`] to the allocation, which keeps the address from being
/// reused by another `Arc` for as long as the key exists.
pub struct IdentityKey<T: ?Sized> {
    weak: Weak<T>,
}

impl<T: ?Sized> IdentityKey<T> {
    pub fn of(target: &Arc<T>) -> Self {
        Self {
            weak: Arc::downgrade(target),
        }
    }

    fn addr(&self) -> usize {
        self.weak.as_ptr() as *const () as usize
    }

    /// `true` while at least one strong `Arc` to the object exists.
    pub fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }

    pub fn upgrade(&self) -> Option<Arc<T>> {
        self.weak.upgrade()
    }
}

impl<T: ?Sized> Clone for IdentityKey<T> {
    fn clone(&self) -> Self {
        Self {
            weak: self.weak.clone(),
        }
    }
}

impl<T: ?Sized> PartialEq for IdentityKey<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for IdentityKey<T> {}

impl<T: ?Sized> Hash for IdentityKey<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for IdentityKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKey")
            .field("addr", &format_args!("{:#x}", self.addr()))
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Key strategy for functions taking a single `Arc<T>`: keys by allocation
/// identity. Pair with [`IdentityStore`].
///
/// ```
/// use std::sync::Arc;
/// use memento_core::{wrap, ByIdentity, IdentityStore, MemoOptions};
///
/// let total = wrap(
///     |data: Arc<Vec<u64>>| data.iter().sum::<u64>(),
///     MemoOptions::new()
///         .key_fn(ByIdentity)
///         .cache_factory(IdentityStore::new),
/// );
///
/// let data = Arc::new(vec![1, 2, 3]);
/// assert_eq!(total.call(Arc::clone(&data)), 6);
/// assert_eq!(total.call(Arc::clone(&data)), 6);
/// assert_eq!(total.len(), 1);
///
/// drop(data);
/// assert_eq!(total.len(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ByIdentity;

impl<T: ?Sized> KeyFn<Arc<T>> for ByIdentity {
    type Key = IdentityKey<T>;
    type Error = Infallible;

    fn derive_key(&self, args: &Arc<T>) -> Result<Self::Key, Self::Error> {
        Ok(IdentityKey::of(args))
    }
}

/// Store keyed by [`IdentityKey`] that forgets entries whose key object has
/// been dropped. See the [module docs](self) for the reclamation guarantees.
pub struct IdentityStore<T: ?Sized, V> {
    entries: HashMap<IdentityKey<T>, V>,
    purge_threshold: usize,
}

impl<T: ?Sized, V> IdentityStore<T, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            purge_threshold: MIN_PURGE_THRESHOLD,
        }
    }

    /// Drops every entry whose key object no longer exists. Returns how many
    /// entries were removed.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.is_alive());
        let purged = before - self.entries.len();
        if purged > 0 {
            debug!(purged, remaining = self.entries.len(), "purged dead identity keys");
        }
        purged
    }

    /// Number of stored entries including dead ones not purged yet.
    pub fn raw_len(&self) -> usize {
        self.entries.len()
    }

    /// Purges when the raw entry count reaches the threshold, then sets the
    /// next threshold to twice the surviving count so purging stays amortised
    /// O(1) per insert.
    fn maybe_purge(&mut self) {
        if self.entries.len() >= self.purge_threshold {
            self.purge_dead();
            self.purge_threshold = (self.entries.len() * 2).max(MIN_PURGE_THRESHOLD);
        }
    }
}

impl<T: ?Sized, V> Default for IdentityStore<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, V: Clone> CacheStore<IdentityKey<T>, V> for IdentityStore<T, V> {
    fn get(&mut self, key: &IdentityKey<T>) -> Option<V> {
        let alive = self
            .entries
            .get_key_value(key)
            .map(|(stored, _)| stored.is_alive())?;
        if alive {
            self.entries.get(key).cloned()
        } else {
            self.entries.remove(key);
            None
        }
    }

    fn insert(&mut self, key: IdentityKey<T>, value: V) {
        self.maybe_purge();
        self.entries.insert(key, value);
    }

    fn remove(&mut self, key: &IdentityKey<T>) -> Option<V> {
        self.entries.remove(key)
    }

    fn contains(&self, key: &IdentityKey<T>) -> bool {
        self.entries
            .get_key_value(key)
            .map_or(false, |(stored, _)| stored.is_alive())
    }

    /// Live entries only; O(n).
    fn len(&self) -> usize {
        self.entries.keys().filter(|key| key.is_alive()).count()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.purge_threshold = MIN_PURGE_THRESHOLD;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_same_allocation_same_key() {
        let a = Arc::new(5);
        let b = Arc::clone(&a);
        let c = Arc::new(5);
        assert_eq!(IdentityKey::of(&a), IdentityKey::of(&b));
        assert_ne!(IdentityKey::of(&a), IdentityKey::of(&c));
    }

    #[test]
    fn test_entry_does_not_keep_object_alive() {
        let dropped = Arc::new(AtomicBool::new(false));
        let obj = Arc::new(DropFlag(Arc::clone(&dropped)));

        let mut store = IdentityStore::new();
        store.insert(IdentityKey::of(&obj), "cached");
        assert_eq!(store.len(), 1);

        drop(obj);
        assert!(dropped.load(Ordering::SeqCst));
        assert_eq!(store.len(), 0);
        assert_eq!(store.raw_len(), 1);

        assert_eq!(store.purge_dead(), 1);
        assert_eq!(store.raw_len(), 0);
    }

    #[test]
    fn test_inserts_purge_dead_entries() {
        let mut store = IdentityStore::new();
        for i in 0..MIN_PURGE_THRESHOLD {
            let transient = Arc::new(i);
            store.insert(IdentityKey::of(&transient), i);
        }
        assert_eq!(store.raw_len(), MIN_PURGE_THRESHOLD);

        let keeper = Arc::new(usize::MAX);
        store.insert(IdentityKey::of(&keeper), 0);
        assert_eq!(store.raw_len(), 1);
        assert!(store.contains(&IdentityKey::of(&keeper)));
    }

    #[test]
    fn test_get_of_dead_key_removes_it() {
        let mut store = IdentityStore::new();
        let obj = Arc::new(String::from("x"));
        let key = IdentityKey::of(&obj);
        store.insert(key.clone(), 1);
        drop(obj);

        assert_eq!(store.get(&key), None);
        assert_eq!(store.raw_len(), 0);
    }

    #[test]
    fn test_unsized_targets() {
        let slice: Arc<[u8]> = Arc::from(vec![1u8, 2, 3]);
        let mut store = IdentityStore::new();
        store.insert(IdentityKey::of(&slice), 6);
        assert_eq!(store.get(&IdentityKey::of(&slice)), Some(6));
    }
}
