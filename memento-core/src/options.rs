use std::borrow::Cow;
use std::hash::Hash;

use crate::{CacheStore, DefaultKey, MapStore};

/// Name used in log events when a wrapper is not given one.
pub const DEFAULT_CACHE_NAME: &str = "memoized";

/// Options for [`wrap`](crate::wrap) and friends.
///
/// - `key_fn`: how to derive a cache key from the arguments
///   (default: [`DefaultKey`]),
/// - `cache_factory`: creates the wrapper's store, called exactly once at wrap
///   time (default: an unbounded [`MapStore`]),
/// - `name`: label attached to log events (default: `"memoized"`).
///
/// ```
/// use memento_core::{BoundedStore, EvictionPolicy, MemoOptions, wrap};
///
/// let square = wrap(
///     |n: u64| n * n,
///     MemoOptions::new()
///         .name("square")
///         .cache_factory(|| BoundedStore::new(100, EvictionPolicy::LRU)),
/// );
/// assert_eq!(square.call(12), 144);
/// assert_eq!(square.name(), "square");
/// ```
#[derive(Clone, Debug)]
pub struct MemoOptions<K = DefaultKey, C = DefaultStore> {
    key_fn: K,
    cache_factory: C,
    name: Cow<'static, str>,
}

impl MemoOptions {
    pub fn new() -> Self {
        Self {
            key_fn: DefaultKey,
            cache_factory: DefaultStore,
            name: Cow::Borrowed(DEFAULT_CACHE_NAME),
        }
    }
}

impl Default for MemoOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> MemoOptions<K, C> {
    /// Replaces the key derivation strategy.
    pub fn key_fn<K2>(self, key_fn: K2) -> MemoOptions<K2, C> {
        MemoOptions {
            key_fn,
            cache_factory: self.cache_factory,
            name: self.name,
        }
    }

    /// Replaces the store factory. Any `FnOnce() -> S` with
    /// `S: CacheStore<Key, V>` works, e.g. `IdentityStore::new`.
    pub fn cache_factory<C2>(self, cache_factory: C2) -> MemoOptions<K, C2> {
        MemoOptions {
            key_fn: self.key_fn,
            cache_factory,
            name: self.name,
        }
    }

    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Splits the options into key strategy, store factory and name, for
    /// wrappers built outside this crate.
    pub fn into_parts(self) -> (K, C, Cow<'static, str>) {
        (self.key_fn, self.cache_factory, self.name)
    }
}

/// Creates the store for one wrapper instance.
pub trait StoreFactory<K, V> {
    type Store: CacheStore<K, V>;

    fn create(self) -> Self::Store;
}

/// Factory for the default unbounded [`MapStore`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStore;

impl<K: Eq + Hash, V: Clone> StoreFactory<K, V> for DefaultStore {
    type Store = MapStore<K, V>;

    fn create(self) -> MapStore<K, V> {
        MapStore::new()
    }
}

impl<K, V, S, F> StoreFactory<K, V> for F
where
    S: CacheStore<K, V>,
    F: FnOnce() -> S,
{
    type Store = S;

    fn create(self) -> S {
        self()
    }
}
