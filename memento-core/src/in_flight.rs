//! Bookkeeping shared by the coalescing wrappers in this crate and in
//! `memento-async`. Not part of the stable API.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;

pub use crate::error::into_ok;

/// How a coalescing call obtained its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Served {
    /// Found in the store.
    Stored,
    /// This call ran the function.
    Computed,
    /// Another call's in-flight computation produced it.
    Coalesced,
}

/// Removes a key's in-flight slot when the call that looked it up finishes,
/// including by unwinding or by its future being dropped. Only the exact
/// slot this call used is removed.
pub struct InFlightGuard<'a, Q: Eq + Hash, C> {
    in_flight: &'a DashMap<Q, Arc<C>>,
    key: &'a Q,
    cell: &'a Arc<C>,
}

impl<'a, Q: Eq + Hash, C> InFlightGuard<'a, Q, C> {
    pub fn new(in_flight: &'a DashMap<Q, Arc<C>>, key: &'a Q, cell: &'a Arc<C>) -> Self {
        Self {
            in_flight,
            key,
            cell,
        }
    }
}

impl<Q: Eq + Hash, C> Drop for InFlightGuard<'_, Q, C> {
    fn drop(&mut self) {
        self.in_flight
            .remove_if(self.key, |_, cell| Arc::ptr_eq(cell, self.cell));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_removes_own_slot() {
        let in_flight: DashMap<&str, Arc<u8>> = DashMap::new();
        let cell = Arc::new(1);
        in_flight.insert("k", Arc::clone(&cell));
        {
            let _guard = InFlightGuard::new(&in_flight, &"k", &cell);
        }
        assert!(in_flight.is_empty());
    }

    #[test]
    fn test_guard_leaves_newer_slot() {
        let in_flight: DashMap<&str, Arc<u8>> = DashMap::new();
        let stale = Arc::new(1);
        let fresh = Arc::new(2);
        in_flight.insert("k", Arc::clone(&fresh));
        {
            let _guard = InFlightGuard::new(&in_flight, &"k", &stale);
        }
        assert_eq!(in_flight.len(), 1);
    }
}
