use std::borrow::Cow;
use std::convert::Infallible;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::in_flight::{into_ok, InFlightGuard, Served};
#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::{
    CacheStore, DefaultKey, IntoCallError, KeyArgs, KeyFn, MapStore, MemoOptions, StoreFactory,
};

/// How a [`SyncMemoized`] handles concurrent first calls on the same key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InFlightPolicy {
    /// One computation per key at a time. Concurrent callers of a key that is
    /// being computed block and receive that computation's result. If it
    /// fails, nothing is stored and one of the waiting callers computes again.
    #[default]
    Coalesce,
    /// Every caller that misses computes on its own, outside any lock. The
    /// first result stored wins; later duplicates are discarded and the stored
    /// value is returned.
    Duplicate,
}

/// Thread-safe memoized function.
///
/// The store sits behind a `parking_lot::Mutex` that is held only for lookups
/// and inserts, never while the function runs. With
/// [`InFlightPolicy::Coalesce`] a `DashMap` of per-key `OnceCell`s tracks
/// computations in flight so concurrent first calls run the function once.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::thread;
/// use memento_core::SyncMemoized;
///
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&runs);
/// let slow_square = Arc::new(SyncMemoized::new(move |n: u64| {
///     counter.fetch_add(1, Ordering::SeqCst);
///     thread::sleep(std::time::Duration::from_millis(20));
///     n * n
/// }));
///
/// let handles: Vec<_> = (0..8)
///     .map(|_| {
///         let memo = Arc::clone(&slow_square);
///         thread::spawn(move || memo.call(9))
///     })
///     .collect();
/// for handle in handles {
///     assert_eq!(handle.join().unwrap(), 81);
/// }
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// ```
pub struct SyncMemoized<A, V, F, K = DefaultKey, S = MapStore<String, V>>
where
    K: KeyFn<A>,
{
    func: F,
    key_fn: K,
    store: Mutex<S>,
    in_flight: DashMap<K::Key, Arc<OnceCell<V>>>,
    policy: InFlightPolicy,
    name: Cow<'static, str>,
    #[cfg(feature = "stats")]
    stats: CacheStats,
    _marker: PhantomData<fn(A) -> V>,
}

impl<A, V, F> SyncMemoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(A) -> V,
{
    /// Wraps `func` with the default key strategy, an unbounded store and
    /// [`InFlightPolicy::Coalesce`].
    pub fn new(func: F) -> Self {
        Self::with_options(func, MemoOptions::new(), InFlightPolicy::Coalesce)
    }
}

impl<A, V, F, K, S> SyncMemoized<A, V, F, K, S>
where
    K: KeyFn<A>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    /// Wraps an infallible `func` with explicit options and policy.
    pub fn with_options<C>(func: F, options: MemoOptions<K, C>, policy: InFlightPolicy) -> Self
    where
        F: Fn(A) -> V,
        C: StoreFactory<K::Key, V, Store = S>,
    {
        Self::from_parts(func, options, policy)
    }

    /// Wraps a fallible `func` with explicit options and policy. Only `Ok`
    /// values are stored.
    pub fn try_with_options<E, C>(
        func: F,
        options: MemoOptions<K, C>,
        policy: InFlightPolicy,
    ) -> Self
    where
        F: Fn(A) -> Result<V, E>,
        C: StoreFactory<K::Key, V, Store = S>,
    {
        Self::from_parts(func, options, policy)
    }

    fn from_parts<C>(func: F, options: MemoOptions<K, C>, policy: InFlightPolicy) -> Self
    where
        C: StoreFactory<K::Key, V, Store = S>,
    {
        let (key_fn, cache_factory, name) = options.into_parts();
        Self {
            func,
            key_fn,
            store: Mutex::new(cache_factory.create()),
            in_flight: DashMap::new(),
            policy,
            name,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
            _marker: PhantomData,
        }
    }

    pub fn policy(&self) -> InFlightPolicy {
        self.policy
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    pub fn contains(&self, args: &A) -> bool {
        match self.key_fn.derive_key(args) {
            Ok(key) => self.store.lock().contains(&key),
            Err(_) => false,
        }
    }

    pub fn invalidate(&self, args: &A) -> bool {
        match self.key_fn.derive_key(args) {
            Ok(key) => self.store.lock().remove(&key).is_some(),
            Err(_) => false,
        }
    }

    pub fn clear(&self) {
        self.store.lock().clear();
        debug!(cache = %self.name, "cache cleared");
    }

    /// Number of keys with a computation currently running (coalescing only).
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn lookup(&self, key: &K::Key) -> Option<V> {
        self.store.lock().get(key)
    }

    fn fetch<E>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.lookup(&key) {
            self.record(Served::Stored);
            return Ok(value);
        }

        match self.policy {
            InFlightPolicy::Coalesce => self.fetch_coalesced(key, args, compute),
            InFlightPolicy::Duplicate => self.fetch_duplicate(key, args, compute),
        }
    }

    fn fetch_coalesced<E>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Result<V, E>,
    ) -> Result<V, E> {
        let cell = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let _guard = InFlightGuard::new(&self.in_flight, &key, &cell);

        let mut served = Served::Coalesced;
        let result = cell.get_or_try_init(|| {
            // Another caller may have finished and released its slot between
            // our lookup and taking this one.
            if let Some(value) = self.lookup(&key) {
                served = Served::Stored;
                return Ok::<V, E>(value);
            }
            served = Served::Computed;
            let value = compute(args)?;
            self.store.lock().insert(key.clone(), value.clone());
            Ok(value)
        });

        match result {
            Ok(value) => {
                self.record(served);
                Ok(value.clone())
            }
            Err(err) => {
                self.record(Served::Computed);
                self.record_failure();
                Err(err)
            }
        }
    }

    fn fetch_duplicate<E>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Result<V, E>,
    ) -> Result<V, E> {
        self.record(Served::Computed);
        let value = match compute(args) {
            Ok(value) => value,
            Err(err) => {
                self.record_failure();
                return Err(err);
            }
        };

        let mut store = self.store.lock();
        if let Some(existing) = store.get(&key) {
            return Ok(existing);
        }
        store.insert(key, value.clone());
        Ok(value)
    }

    fn record(&self, served: Served) {
        match served {
            Served::Stored => {
                trace!(cache = %self.name, "cache hit");
                #[cfg(feature = "stats")]
                self.stats.record_hit();
            }
            Served::Computed => {
                trace!(cache = %self.name, "cache miss");
                #[cfg(feature = "stats")]
                self.stats.record_miss();
            }
            Served::Coalesced => {
                debug!(cache = %self.name, "reused in-flight computation");
                #[cfg(feature = "stats")]
                self.stats.record_coalesced();
            }
        }
    }

    fn record_failure(&self) {
        debug!(cache = %self.name, "computation failed, result not cached");
        #[cfg(feature = "stats")]
        self.stats.record_failure();
    }
}

impl<A, V, F, K, S> SyncMemoized<A, V, F, K, S>
where
    F: Fn(A) -> V,
    K: KeyFn<A, Error = Infallible>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub fn call(&self, args: A) -> V {
        let key = into_ok(self.key_fn.derive_key(&args));
        into_ok(self.fetch(key, args, |args| Ok::<V, Infallible>((self.func)(args))))
    }
}

impl<A, V, E, F, K, S> SyncMemoized<A, V, F, K, S>
where
    F: Fn(A) -> Result<V, E>,
    K: KeyFn<A>,
    K::Error: IntoCallError<E>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    /// Like [`Memoized::try_call`](crate::Memoized::try_call). Under
    /// coalescing, only the caller whose computation failed sees its `Err`;
    /// callers waiting on it retry the computation.
    pub fn try_call(&self, args: A) -> Result<V, E> {
        let key = self
            .key_fn
            .derive_key(&args)
            .map_err(IntoCallError::into_call_error)?;
        self.fetch(key, args, &self.func)
    }
}
