use std::borrow::Cow;
use std::convert::Infallible;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, trace};

#[cfg(feature = "stats")]
use memento_core::CacheStats;
use memento_core::in_flight::{into_ok, InFlightGuard, Served};
use memento_core::{
    CacheStore, DefaultKey, InFlightPolicy, IntoCallError, KeyArgs, KeyFn, MapStore, MemoOptions,
    StoreFactory,
};

/// A memoized async function.
///
/// Stores resolved values, not futures: the first call for a key awaits the
/// wrapped function and stores its output, later calls return a clone of it.
/// Under [`InFlightPolicy::Coalesce`] (the default) concurrent calls for a key
/// that is still being computed await the same computation instead of
/// starting their own.
///
/// Only tokio's `sync` primitives are used, so any executor can drive the
/// returned futures. The store lock is never held across an `.await`.
///
/// # Cancellation
///
/// If the future computing a key is dropped before it completes, nothing is
/// stored and one of the callers waiting on that key starts the computation
/// again. There is no built-in timeout; wrap calls in one if needed.
///
/// # Examples
///
/// ```
/// use memento_async::AsyncMemoized;
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let lookup = AsyncMemoized::new(|id: u64| async move { format!("user-{id}") });
///
/// assert_eq!(lookup.call(7).await, "user-7");
/// assert_eq!(lookup.call(7).await, "user-7");
/// assert_eq!(lookup.len(), 1);
/// # });
/// ```
pub struct AsyncMemoized<A, V, F, K = DefaultKey, S = MapStore<String, V>>
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

impl<A, V, F, Fut> AsyncMemoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(A) -> Fut,
    Fut: Future<Output = V>,
{
    /// Wraps `func` with the default key strategy, an unbounded store and
    /// coalescing of concurrent calls.
    pub fn new(func: F) -> Self {
        Self::with_options(func, MemoOptions::new(), InFlightPolicy::Coalesce)
    }
}

impl<A, V, F, K, S> AsyncMemoized<A, V, F, K, S>
where
    K: KeyFn<A>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub fn with_options<Fut, C>(
        func: F,
        options: MemoOptions<K, C>,
        policy: InFlightPolicy,
    ) -> Self
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = V>,
        C: StoreFactory<K::Key, V, Store = S>,
    {
        Self::from_parts(func, options, policy)
    }

    /// Wraps an async function returning `Result`. Only `Ok` values are stored.
    pub fn try_with_options<E, Fut, C>(
        func: F,
        options: MemoOptions<K, C>,
        policy: InFlightPolicy,
    ) -> Self
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
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

    /// Number of keys whose computation is currently being awaited.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn lookup(&self, key: &K::Key) -> Option<V> {
        self.store.lock().get(key)
    }

    async fn fetch<E, Fut>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Fut,
    ) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(&key) {
            self.record(Served::Stored);
            return Ok(value);
        }

        match self.policy {
            InFlightPolicy::Coalesce => self.fetch_coalesced(key, args, compute).await,
            InFlightPolicy::Duplicate => {
                self.record(Served::Computed);
                let value = match compute(args).await {
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
        }
    }

    async fn fetch_coalesced<E, Fut>(
        &self,
        key: K::Key,
        args: A,
        compute: impl FnOnce(A) -> Fut,
    ) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();
        let _guard = InFlightGuard::new(&self.in_flight, &key, &cell);

        let mut served = Served::Coalesced;
        let slot = &mut served;
        let key_ref = &key;
        let result = cell
            .get_or_try_init(move || async move {
                if let Some(value) = self.lookup(key_ref) {
                    *slot = Served::Stored;
                    return Ok::<V, E>(value);
                }
                *slot = Served::Computed;
                let value = compute(args).await?;
                self.store.lock().insert(key_ref.clone(), value.clone());
                Ok(value)
            })
            .await;

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

impl<A, V, F, Fut, K, S> AsyncMemoized<A, V, F, K, S>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = V>,
    K: KeyFn<A, Error = Infallible>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub async fn call(&self, args: A) -> V {
        let key = into_ok(self.key_fn.derive_key(&args));
        let result = self
            .fetch(key, args, |args| {
                let pending = (self.func)(args);
                async move { Ok::<V, Infallible>(pending.await) }
            })
            .await;
        into_ok(result)
    }
}

impl<A, V, E, F, Fut, K, S> AsyncMemoized<A, V, F, K, S>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = Result<V, E>>,
    K: KeyFn<A>,
    K::Error: IntoCallError<E>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    /// Returns the stored `Ok` value or awaits the wrapped function. `Err`
    /// results are returned to the caller whose computation produced them and
    /// never stored.
    pub async fn try_call(&self, args: A) -> Result<V, E> {
        let key = self
            .key_fn
            .derive_key(&args)
            .map_err(IntoCallError::into_call_error)?;
        self.fetch(key, args, &self.func).await
    }
}
