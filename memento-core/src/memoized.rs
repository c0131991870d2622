use crate::error::into_ok;
#[cfg(feature = "stats")]
use crate::CacheStats;
use crate::{
    CacheStore, DefaultKey, IntoCallError, KeyArgs, KeyFn, LocalCache, MapStore, MemoOptions,
    StoreFactory,
};
use std::convert::Infallible;

/// A deterministic function wrapped with its own cache.
///
/// The first call with a given argument list runs the function and stores the
/// result under the derived key; later calls with an equal key return a clone
/// of the stored result without running it. For a pure function the wrapper
/// never changes what a call returns, only how often the function runs.
///
/// Each `Memoized` owns exactly one store, created at wrap time. Wrapping the
/// same function twice gives two independent caches.
///
/// `Memoized` is single-threaded (`!Sync`). Use
/// [`SyncMemoized`](crate::SyncMemoized) to share a cache between threads.
///
/// # Type Parameters
///
/// * `A` - argument type (a single value, or a tuple for several arguments)
/// * `V` - cached value type
/// * `F` - the wrapped function
/// * `K` - key strategy, [`DefaultKey`] unless overridden
/// * `S` - store, [`MapStore`] unless overridden
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use memento_core::Memoized;
///
/// let runs = Cell::new(0);
/// let add = Memoized::new(|(a, b): (i32, i32)| {
///     runs.set(runs.get() + 1);
///     a + b
/// });
///
/// assert_eq!(add.call((12, 3)), 15);
/// assert_eq!(add.call((1, 23)), 24);
/// assert_eq!(add.call((12, 3)), 15);
/// assert_eq!(runs.get(), 2);
/// assert_eq!(add.len(), 2);
/// ```
pub struct Memoized<A, V, F, K = DefaultKey, S = MapStore<String, V>> {
    func: F,
    cache: LocalCache<A, V, K, S>,
}

/// Wraps an infallible function.
///
/// ```
/// use memento_core::{wrap, MemoOptions};
///
/// // Case-insensitive lookups share one entry.
/// let shout = wrap(
///     |s: String| s.to_uppercase(),
///     MemoOptions::new().key_fn(|s: &String| s.to_lowercase()),
/// );
/// assert_eq!(shout.call("Hi".to_string()), "HI");
/// assert_eq!(shout.call("hI".to_string()), "HI");
/// assert_eq!(shout.len(), 1);
/// ```
pub fn wrap<A, V, F, K, C>(func: F, options: MemoOptions<K, C>) -> Memoized<A, V, F, K, C::Store>
where
    F: Fn(A) -> V,
    K: KeyFn<A>,
    C: StoreFactory<K::Key, V>,
    V: Clone,
{
    Memoized::from_options(func, options)
}

/// Wraps a fallible function. Only `Ok` values are stored.
///
/// ```
/// use memento_core::{try_wrap, MemoOptions};
///
/// let parse = try_wrap(|s: &'static str| s.parse::<u32>(), MemoOptions::new());
/// assert_eq!(parse.try_call("42"), Ok(42));
/// assert!(parse.try_call("x").is_err());
/// assert_eq!(parse.len(), 1);
/// ```
pub fn try_wrap<A, V, E, F, K, C>(
    func: F,
    options: MemoOptions<K, C>,
) -> Memoized<A, V, F, K, C::Store>
where
    F: Fn(A) -> Result<V, E>,
    K: KeyFn<A>,
    C: StoreFactory<K::Key, V>,
    V: Clone,
{
    Memoized::from_options(func, options)
}

impl<A, V, F> Memoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(A) -> V,
{
    /// Wraps `func` with the default key strategy and an unbounded store.
    pub fn new(func: F) -> Self {
        wrap(func, MemoOptions::new())
    }
}

impl<A, V, F, K, S> Memoized<A, V, F, K, S> {
    fn from_options<C>(func: F, options: MemoOptions<K, C>) -> Self
    where
        K: KeyFn<A>,
        C: StoreFactory<K::Key, V, Store = S>,
    {
        let (key_fn, cache_factory, name) = options.into_parts();
        Self {
            func,
            cache: LocalCache::new(key_fn, cache_factory.create(), name),
        }
    }

    pub fn name(&self) -> &str {
        self.cache.name()
    }

    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    /// The underlying cache state.
    pub fn cache(&self) -> &LocalCache<A, V, K, S> {
        &self.cache
    }
}

impl<A, V, F, K, S> Memoized<A, V, F, K, S>
where
    K: KeyFn<A>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, args: &A) -> bool {
        self.cache.contains(args)
    }

    /// Drops the stored result for `args`, so the next call recomputes it.
    pub fn invalidate(&self, args: &A) -> bool {
        self.cache.invalidate(args)
    }

    pub fn clear(&self) {
        self.cache.clear()
    }
}

impl<A, V, F, K, S> Memoized<A, V, F, K, S>
where
    F: Fn(A) -> V,
    K: KeyFn<A, Error = Infallible>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    /// Returns the cached result for `args`, computing and storing it first
    /// if needed. A panic in the wrapped function propagates and stores
    /// nothing.
    pub fn call(&self, args: A) -> V {
        let key = into_ok(self.cache.derive_key(&args));
        into_ok(
            self.cache
                .get_or_compute(key, args, |args| Ok::<V, Infallible>((self.func)(args))),
        )
    }
}

impl<A, V, E, F, K, S> Memoized<A, V, F, K, S>
where
    F: Fn(A) -> Result<V, E>,
    K: KeyFn<A>,
    K::Error: IntoCallError<E>,
    S: CacheStore<K::Key, V>,
    V: Clone,
{
    /// Returns the cached `Ok` value for `args`, or runs the function.
    ///
    /// `Err` results (and key-derivation errors, converted with
    /// [`IntoCallError`]) are returned unmodified and never stored, so a later
    /// call with the same arguments runs the function again.
    pub fn try_call(&self, args: A) -> Result<V, E> {
        let key = self
            .cache
            .derive_key(&args)
            .map_err(IntoCallError::into_call_error)?;
        self.cache.get_or_compute(key, args, &self.func)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundedStore, EvictionPolicy, FallibleKey, JsonKey, KeyError};
    use std::cell::Cell;

    #[test]
    fn test_repeat_calls_run_once() {
        let runs = Cell::new(0);
        let double = Memoized::new(|n: u64| {
            runs.set(runs.get() + 1);
            n * 2
        });

        for _ in 0..5 {
            assert_eq!(double.call(21), 42);
        }
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_independent_wrappers_do_not_share() {
        fn triple(n: i32) -> i32 {
            n * 3
        }
        let a = Memoized::new(triple);
        let b = Memoized::new(triple);
        a.call(1);
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }

    #[test]
    fn test_err_not_cached() {
        let runs = Cell::new(0);
        let flaky = try_wrap(
            |n: u32| {
                runs.set(runs.get() + 1);
                if runs.get() == 1 {
                    Err("transient")
                } else {
                    Ok(n + 1)
                }
            },
            MemoOptions::new(),
        );

        assert_eq!(flaky.try_call(1), Err("transient"));
        assert!(!flaky.contains(&1));
        assert_eq!(flaky.try_call(1), Ok(2));
        assert_eq!(flaky.try_call(1), Ok(2));
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let runs = Cell::new(0);
        let id = Memoized::new(|s: String| {
            runs.set(runs.get() + 1);
            s
        });

        id.call("a".to_string());
        assert!(id.invalidate(&"a".to_string()));
        assert!(!id.invalidate(&"a".to_string()));
        id.call("a".to_string());
        assert_eq!(runs.get(), 2);

        id.clear();
        assert!(id.is_empty());
    }

    #[test]
    fn test_key_error_propagates() {
        #[derive(Debug, PartialEq)]
        enum CalcError {
            BadKey,
        }
        impl From<KeyError> for CalcError {
            fn from(_: KeyError) -> Self {
                CalcError::BadKey
            }
        }

        let runs = Cell::new(0);
        let sqrt = try_wrap(
            |n: i64| {
                runs.set(runs.get() + 1);
                Ok::<_, CalcError>((n as f64).sqrt())
            },
            MemoOptions::new().key_fn(FallibleKey(|n: &i64| {
                if *n < 0 {
                    Err(KeyError::unsupported("negative"))
                } else {
                    Ok(*n)
                }
            })),
        );

        assert_eq!(sqrt.try_call(-4), Err(CalcError::BadKey));
        assert_eq!(runs.get(), 0);
        assert_eq!(sqrt.try_call(16), Ok(4.0));
        assert!(!sqrt.contains(&-4));
    }

    #[test]
    fn test_json_key() {
        #[derive(serde::Serialize)]
        struct Query {
            table: &'static str,
            limit: u32,
        }

        let runs = Cell::new(0);
        let plan = try_wrap(
            |q: Query| {
                runs.set(runs.get() + 1);
                Ok::<_, KeyError>(format!("scan {} limit {}", q.table, q.limit))
            },
            MemoOptions::new().key_fn(JsonKey),
        );

        let first = plan.try_call(Query { table: "posts", limit: 10 }).unwrap();
        let second = plan.try_call(Query { table: "posts", limit: 10 }).unwrap();
        assert_eq!(first, second);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_custom_store() {
        let square = wrap(
            |n: u32| n * n,
            MemoOptions::new().cache_factory(|| BoundedStore::new(2, EvictionPolicy::FIFO)),
        );
        square.call(1);
        square.call(2);
        square.call(3);
        assert_eq!(square.len(), 2);
        assert!(!square.contains(&1));
        assert_eq!(square.cache().with_store(|s| s.limit()), 2);
    }

    #[test]
    fn test_panic_stores_nothing() {
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let explode = Cell::new(true);
        let fragile = Memoized::new(|n: u8| {
            if explode.get() {
                panic!("boom");
            }
            n
        });

        let result = catch_unwind(AssertUnwindSafe(|| fragile.call(7)));
        assert!(result.is_err());
        assert!(fragile.is_empty());

        explode.set(false);
        assert_eq!(fragile.call(7), 7);
        assert_eq!(fragile.len(), 1);
    }

    #[cfg(feature = "stats")]
    #[test]
    fn test_stats_track_hits_misses_failures() {
        let half = try_wrap(
            |n: u32| if n % 2 == 0 { Ok(n / 2) } else { Err(n) },
            MemoOptions::new().name("half"),
        );
        let _ = half.try_call(4);
        let _ = half.try_call(4);
        let _ = half.try_call(3);

        let stats = half.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 2);
        assert_eq!(stats.failures(), 1);
        assert_eq!(half.name(), "half");
    }
}
