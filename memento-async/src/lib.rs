//! # Memento Async
//!
//! Memoization for async functions.
//!
//! [`AsyncMemoized`] wraps a function returning a future and caches the
//! resolved value per key. Concurrent calls for a key that is still being
//! computed share one computation, like a promise cache: every caller awaits
//! the same eventual result and the wrapped function runs once.
//!
//! ## Features
//!
//! - **Single in-flight computation per key** (default), or duplicate
//!   computations with first-stored-wins via [`InFlightPolicy::Duplicate`]
//! - **Result caching**: with `try_call`, only `Ok` values are stored
//! - **Cancellation safe**: dropping a computing future hands the work to the
//!   next waiter and stores nothing
//! - **Executor agnostic**: only tokio's `sync` primitives are used
//! - **Same stores and key strategies** as the synchronous wrappers
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use memento_async::prelude::*;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let fetch_profile = Arc::new(AsyncMemoized::try_with_options(
//!     |user: String| async move {
//!         if user.is_empty() {
//!             Err("empty user name")
//!         } else {
//!             Ok(format!("profile of {user}"))
//!         }
//!     },
//!     MemoOptions::new()
//!         .name("profiles")
//!         .cache_factory(|| BoundedStore::new(128, EvictionPolicy::LRU)),
//!     InFlightPolicy::Coalesce,
//! ));
//!
//! assert_eq!(fetch_profile.try_call("ada".to_string()).await, Ok("profile of ada".to_string()));
//! assert!(fetch_profile.try_call(String::new()).await.is_err());
//! assert_eq!(fetch_profile.len(), 1);
//! # });
//! ```

mod async_memoized;

pub use async_memoized::AsyncMemoized;

pub use memento_core::{
    BoundedStore, ByIdentity, CacheStore, DefaultKey, EvictionPolicy, FallibleKey, IdentityStore,
    InFlightPolicy, JsonKey, KeyError, KeyFn, MapStore, MemoOptions, StoreConfig,
};

#[cfg(feature = "stats")]
pub use memento_core::CacheStats;

/// Everything needed to wrap async functions.
pub mod prelude {
    pub use crate::AsyncMemoized;
    pub use memento_core::{
        BoundedStore, ByIdentity, DefaultKey, EvictionPolicy, IdentityStore, InFlightPolicy,
        JsonKey, MemoOptions, StoreConfig,
    };
}
