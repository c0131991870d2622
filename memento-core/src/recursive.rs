use std::convert::Infallible;

use crate::error::into_ok;
#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::{
    CacheStore, DefaultKey, KeyArgs, KeyFn, LocalCache, MapStore, MemoOptions, StoreFactory,
};

/// A memoized function that recurses through its own cache.
///
/// The wrapped function receives a handle as its first argument; calling the
/// handle goes through the cache, so every intermediate result of a recursive
/// computation is stored and reused.
///
/// ```
/// use std::cell::Cell;
/// use memento_core::RecursiveMemoized;
///
/// let runs = Cell::new(0);
/// let factorial = RecursiveMemoized::new(|fact: &dyn Fn(u64) -> u64, n: u64| {
///     runs.set(runs.get() + 1);
///     if n == 0 { 1 } else { n * fact(n - 1) }
/// });
///
/// assert_eq!(factorial.call(5), 120);
/// assert_eq!(factorial.len(), 6); // keys 0..=5
/// assert_eq!(factorial.call(3), 6);
/// assert_eq!(factorial.len(), 6);
/// assert_eq!(runs.get(), 6);
/// ```
pub struct RecursiveMemoized<A, V, F, K = DefaultKey, S = MapStore<String, V>> {
    func: F,
    cache: LocalCache<A, V, K, S>,
}

/// Wraps a self-recursive function with the given options.
pub fn wrap_recursive<A, V, F, K, C>(
    func: F,
    options: MemoOptions<K, C>,
) -> RecursiveMemoized<A, V, F, K, C::Store>
where
    F: Fn(&dyn Fn(A) -> V, A) -> V,
    K: KeyFn<A, Error = Infallible>,
    C: StoreFactory<K::Key, V>,
    V: Clone,
{
    let (key_fn, cache_factory, name) = options.into_parts();
    RecursiveMemoized {
        func,
        cache: LocalCache::new(key_fn, cache_factory.create(), name),
    }
}

impl<A, V, F> RecursiveMemoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(&dyn Fn(A) -> V, A) -> V,
{
    pub fn new(func: F) -> Self {
        wrap_recursive(func, MemoOptions::new())
    }
}

impl<A, V, F, K, S> RecursiveMemoized<A, V, F, K, S>
where
    F: Fn(&dyn Fn(A) -> V, A) -> V,
    K: KeyFn<A, Error = Infallible>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub fn call(&self, args: A) -> V {
        let key = into_ok(self.cache.derive_key(&args));
        into_ok(self.cache.get_or_compute(key, args, |args| {
            Ok::<V, Infallible>((self.func)(&|inner| self.call(inner), args))
        }))
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, args: &A) -> bool {
        self.cache.contains(args)
    }

    pub fn invalidate(&self, args: &A) -> bool {
        self.cache.invalidate(args)
    }

    pub fn clear(&self) {
        self.cache.clear()
    }

    pub fn name(&self) -> &str {
        self.cache.name()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &LocalCache<A, V, K, S> {
        &self.cache
    }
}
