use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Policy a [`BoundedStore`](crate::BoundedStore) uses to pick the entry to
/// drop when an insert pushes it past its limit.
///
/// The default memoization store never evicts; this enum only matters for
/// callers that opt into a bounded store.
///
/// # Variants
///
/// * `FIFO` - **First In, First Out**
///   - The oldest inserted entry is removed first
///   - Reading a cached value does NOT change its position
///
/// * `LRU` - **Least Recently Used** (default)
///   - The least recently read entry is removed first
///   - Every hit moves the entry to the "most recent" position
///
/// * `LFU` - **Least Frequently Used**
///   - The entry with the fewest hits is removed first
///   - Ties go to the oldest entry
///   - The entry just inserted is never the one removed
///
/// * `Random` - **Random replacement**
///   - A uniformly random entry other than the newest is removed
///   - No bookkeeping on hits
///
/// # Examples
///
/// ```
/// use memento_core::EvictionPolicy;
///
/// assert_eq!(EvictionPolicy::default(), EvictionPolicy::LRU);
///
/// let policy: EvictionPolicy = "lfu".into();
/// assert_eq!(policy, EvictionPolicy::LFU);
///
/// let strict: Result<EvictionPolicy, _> = "mru".parse();
/// assert!(strict.is_err());
/// ```
///
/// # Performance Characteristics
///
/// | Policy | Eviction | Cache Hit |
/// |--------|----------|-----------|
/// | FIFO   | O(1)     | O(1)      |
/// | LRU    | O(1)     | O(n)      |
/// | LFU    | O(n)     | O(1)      |
/// | Random | O(n)     | O(1)      |
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EvictionPolicy {
    FIFO,
    #[default]
    LRU,
    LFU,
    Random,
}

impl EvictionPolicy {
    /// Lowercase name, as accepted by [`FromStr`] and configuration files.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EvictionPolicy::FIFO => "fifo",
            EvictionPolicy::LRU => "lru",
            EvictionPolicy::LFU => "lfu",
            EvictionPolicy::Random => "random",
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict, case-insensitive parsing. Unknown names are an error.
impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::FIFO),
            "lru" => Ok(EvictionPolicy::LRU),
            "lfu" => Ok(EvictionPolicy::LFU),
            "random" => Ok(EvictionPolicy::Random),
            other => Err(format!(
                "unknown eviction policy `{other}`, expected one of: fifo, lru, lfu, random"
            )),
        }
    }
}

impl TryFrom<String> for EvictionPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lenient conversion: unknown names fall back to LRU.
///
/// ```
/// use memento_core::EvictionPolicy;
///
/// let fifo: EvictionPolicy = "FIFO".into();
/// assert_eq!(fifo, EvictionPolicy::FIFO);
///
/// let unknown: EvictionPolicy = "clock".into();
/// assert_eq!(unknown, EvictionPolicy::LRU);
/// ```
impl From<&str> for EvictionPolicy {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}
