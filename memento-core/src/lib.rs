//! # Memento Core
//!
//! Building blocks for instance-scoped function memoization.
//!
//! Every wrapper owns exactly one cache, created when the function is wrapped.
//! Nothing is registered globally, so wrapping the same function twice gives
//! two independent caches and dropping a wrapper drops its results.
//!
//! ## Features
//!
//! - **Key Derivation**: arguments become keys through a [`KeyFn`] strategy:
//!   the default [`DefaultKey`] (component-wise, type-tagged), [`JsonKey`]
//!   (serde-serializable arguments), any closure, or [`ByIdentity`]
//! - **Pluggable Stores**: anything implementing [`CacheStore`]; unbounded
//!   [`MapStore`] by default, [`BoundedStore`] for FIFO/LRU/LFU/Random limits
//! - **Weak Identity Caches**: [`IdentityStore`] keys by object identity and
//!   never keeps a key object alive
//! - **Recursion**: [`RecursiveMemoized`] routes recursive calls through its
//!   own cache
//! - **Concurrency**: [`SyncMemoized`] collapses concurrent first calls of a
//!   key into one computation
//! - **Statistics**: per-wrapper [`CacheStats`] behind the `stats` feature
//!
//! ## Module Organization
//!
//! - [`keys`] - argument-to-key encoding
//! - [`key_fn`] - key derivation strategies
//! - [`store`], [`bounded_store`], [`identity`], [`config`] - stores
//! - [`memoized`], [`recursive`], [`sync_memoized`] - the wrappers
//! - [`local_cache`] - single-threaded cache state shared by the wrappers
//!
//! ## Example
//!
//! ```
//! use memento_core::{wrap, BoundedStore, EvictionPolicy, MemoOptions};
//!
//! let word_count = wrap(
//!     |text: String| text.split_whitespace().count(),
//!     MemoOptions::new()
//!         .name("word_count")
//!         .cache_factory(|| BoundedStore::new(1_000, EvictionPolicy::LRU)),
//! );
//!
//! assert_eq!(word_count.call("to be or not to be".to_string()), 6);
//! assert_eq!(word_count.len(), 1);
//! ```

pub mod bounded_store;
mod cache_entry;
pub mod config;
mod error;
mod eviction_policy;
pub mod identity;
#[doc(hidden)]
pub mod in_flight;
pub mod key_fn;
pub mod keys;
pub mod local_cache;
pub mod memoized;
mod options;
pub mod recursive;
pub mod store;
pub mod sync_memoized;
pub mod utils;

#[cfg(feature = "stats")]
mod stats;

pub use bounded_store::BoundedStore;
pub use cache_entry::CacheEntry;
pub use config::{ConfiguredStore, StoreConfig};
pub use error::{IntoCallError, KeyError};
pub use eviction_policy::EvictionPolicy;
pub use identity::{ByIdentity, IdentityKey, IdentityStore};
pub use key_fn::{DefaultKey, FallibleKey, JsonKey, KeyFn};
pub use keys::{CacheableKey, DefaultCacheableKey, KeyArgs, KEY_ESCAPE, KEY_SEPARATOR};
pub use local_cache::LocalCache;
pub use memoized::{try_wrap, wrap, Memoized};
pub use options::{DefaultStore, MemoOptions, StoreFactory, DEFAULT_CACHE_NAME};
pub use recursive::{wrap_recursive, RecursiveMemoized};
pub use store::{CacheStore, MapStore};
pub use sync_memoized::{InFlightPolicy, SyncMemoized};

#[cfg(feature = "stats")]
pub use stats::CacheStats;
