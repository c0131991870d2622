//! # Memento
//!
//! Function memoization with one cache per wrapped instance.
//!
//! Wrap a deterministic function once, then call the wrapper instead of the
//! function: the first call with given arguments runs it, later calls with
//! equal arguments return a clone of the stored result.
//!
//! ## Features
//!
//! - **Instance-scoped**: each wrapper owns its cache; nothing is global
//! - **Collision-free default keys**: `(12, 3)` and `(1, 23)` are distinct
//! - **Pluggable key derivation**: closures, JSON keys, or object identity
//! - **Weak identity caches**: cache by `Arc` address without keeping objects
//!   alive
//! - **Result-aware**: `try_call` stores only `Ok` values
//! - **Recursion** through the cache, and a thread-safe variant that runs each
//!   key's computation once even under contention
//!
//! ## Quick Start
//!
//! ```rust
//! use memento::memoize;
//!
//! let add = memoize(|(a, b): (i32, i32)| a + b);
//!
//! assert_eq!(add.call((12, 3)), 15);
//! assert_eq!(add.call((1, 23)), 24);
//! assert_eq!(add.len(), 2);
//! ```
//!
//! ## Recursion
//!
//! ```rust
//! use memento::memoize_recursive;
//!
//! let fib = memoize_recursive(|fib: &dyn Fn(u32) -> u64, n: u32| {
//!     if n < 2 { n as u64 } else { fib(n - 1) + fib(n - 2) }
//! });
//! assert_eq!(fib.call(80), 23_416_728_348_467_685);
//! ```
//!
//! ## Custom Keys
//!
//! Types used as arguments with the default key strategy implement
//! [`CacheableKey`], either directly or through the `Debug`-based
//! [`DefaultCacheableKey`] marker. The argument list as a whole must be
//! [`KeyArgs`]: primitives, `String`, `Option`, `Vec` and `Box` work bare,
//! while a user type is passed by reference, inside a tuple (as below), or
//! given its own one-line `KeyArgs` impl:
//!
//! ```rust
//! use memento::{memoize, CacheableKey};
//!
//! #[derive(Clone)]
//! struct Point {
//!     x: i64,
//!     y: i64,
//! }
//!
//! impl CacheableKey for Point {
//!     fn to_cache_key(&self) -> String {
//!         format!("{}:{}", self.x, self.y)
//!     }
//! }
//!
//! let norm = memoize(|(p, scale): (Point, i64)| (p.x.abs() + p.y.abs()) * scale);
//! assert_eq!(norm.call((Point { x: 3, y: -4 }, 2)), 14);
//! ```
//!
//! Or replace key derivation altogether:
//!
//! ```rust
//! use std::sync::Arc;
//! use memento::{wrap, ByIdentity, IdentityStore, MemoOptions};
//!
//! let checksum = wrap(
//!     |blob: Arc<Vec<u8>>| blob.iter().map(|&b| b as u64).sum::<u64>(),
//!     MemoOptions::new()
//!         .key_fn(ByIdentity)
//!         .cache_factory(IdentityStore::new),
//! );
//!
//! let blob = Arc::new(vec![1u8, 2, 3]);
//! assert_eq!(checksum.call(Arc::clone(&blob)), 6);
//! drop(blob);
//! assert!(checksum.is_empty());
//! ```

pub use memento_core::*;

/// Wraps `func` with the default options: component-wise keys, an unbounded
/// store and the default name.
pub fn memoize<A, V, F>(func: F) -> Memoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(A) -> V,
{
    Memoized::new(func)
}

/// Wraps a fallible `func` with the default options. Only `Ok` values are
/// stored; errors are returned unchanged.
///
/// ```rust
/// use memento::try_memoize;
///
/// let parse = try_memoize(|s: String| s.trim().parse::<i64>());
/// assert_eq!(parse.try_call(" 12 ".to_string()), Ok(12));
/// assert!(parse.try_call("twelve".to_string()).is_err());
/// assert_eq!(parse.len(), 1);
/// ```
pub fn try_memoize<A, V, E, F>(func: F) -> Memoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(A) -> Result<V, E>,
{
    try_wrap(func, MemoOptions::new())
}

/// Wraps a self-recursive `func` with the default options.
pub fn memoize_recursive<A, V, F>(func: F) -> RecursiveMemoized<A, V, F>
where
    A: KeyArgs,
    V: Clone,
    F: Fn(&dyn Fn(A) -> V, A) -> V,
{
    RecursiveMemoized::new(func)
}
