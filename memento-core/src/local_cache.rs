use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;

use tracing::{debug, trace};

#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::{CacheStore, KeyFn};

/// Single-threaded cache state shared by [`Memoized`](crate::Memoized) and
/// [`RecursiveMemoized`](crate::RecursiveMemoized).
///
/// Owns the key strategy and exactly one store. The store lives in a
/// `RefCell` that is only borrowed for the duration of a lookup or an insert,
/// never while the underlying function runs, so the function may re-enter the
/// wrapper (recursion) without a borrow conflict.
///
/// Per key the state is either absent or present. A key becomes present once,
/// on the first successful computation; it only goes back to absent through
/// [`invalidate`](Self::invalidate), [`clear`](Self::clear) or the store's own
/// retention rules.
pub struct LocalCache<A, V, K, S> {
    key_fn: K,
    store: RefCell<S>,
    name: Cow<'static, str>,
    #[cfg(feature = "stats")]
    stats: CacheStats,
    _marker: PhantomData<fn(&A) -> V>,
}

impl<A, V, K, S> LocalCache<A, V, K, S> {
    pub(crate) fn new(key_fn: K, store: S, name: Cow<'static, str>) -> Self {
        Self {
            key_fn,
            store: RefCell::new(store),
            name,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Runs `f` with shared access to the store, e.g. to inspect a
    /// [`BoundedStore`](crate::BoundedStore)'s policy.
    ///
    /// # Panics
    ///
    /// If called from inside the wrapped function while the store is being
    /// written (it never is while the function runs).
    pub fn with_store<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.store.borrow())
    }
}

impl<A, V, K, S> LocalCache<A, V, K, S>
where
    K: KeyFn<A>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub(crate) fn derive_key(&self, args: &A) -> Result<K::Key, K::Error> {
        self.key_fn.derive_key(args)
    }

    /// Returns the stored value for `key`, or runs `compute` and stores its
    /// `Ok` value. An `Err` is returned untouched and nothing is stored.
    pub(crate) fn get_or_compute<E>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Result<V, E>,
    ) -> Result<V, E> {
        let cached = self.store.borrow_mut().get(&key);
        if let Some(value) = cached {
            trace!(cache = %self.name, "cache hit");
            #[cfg(feature = "stats")]
            self.stats.record_hit();
            return Ok(value);
        }

        trace!(cache = %self.name, "cache miss");
        #[cfg(feature = "stats")]
        self.stats.record_miss();

        match compute(args) {
            Ok(value) => {
                self.store.borrow_mut().insert(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                debug!(cache = %self.name, "computation failed, result not cached");
                #[cfg(feature = "stats")]
                self.stats.record_failure();
                Err(err)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.borrow().is_empty()
    }

    /// `true` if a result for `args` is stored. Arguments whose key cannot be
    /// derived are never stored.
    pub fn contains(&self, args: &A) -> bool {
        match self.key_fn.derive_key(args) {
            Ok(key) => self.store.borrow().contains(&key),
            Err(_) => false,
        }
    }

    /// Removes the stored result for `args`. Returns whether one was present.
    pub fn invalidate(&self, args: &A) -> bool {
        match self.key_fn.derive_key(args) {
            Ok(key) => self.store.borrow_mut().remove(&key).is_some(),
            Err(_) => false,
        }
    }

    /// Removes every stored result.
    pub fn clear(&self) {
        self.store.borrow_mut().clear();
        debug!(cache = %self.name, "cache cleared");
    }
}
