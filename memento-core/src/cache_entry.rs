/// Internal wrapper that tracks how often a value was read from a
/// [`BoundedStore`](crate::BoundedStore).
///
/// The access counter drives the LFU eviction policy; the other policies
/// ignore it.
///
/// # Examples
///
/// ```
/// use memento_core::CacheEntry;
///
/// let mut entry = CacheEntry::new(42);
/// assert_eq!(entry.value, 42);
/// assert_eq!(entry.frequency, 0);
///
/// entry.increment_frequency();
/// assert_eq!(entry.frequency, 1);
/// ```
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub frequency: u64,
}

impl<V> CacheEntry<V> {
    /// Creates a new entry with a zero access counter.
    pub fn new(value: V) -> Self {
        Self {
            value,
            frequency: 0,
        }
    }

    /// Increments the access counter, saturating at `u64::MAX`.
    pub fn increment_frequency(&mut self) {
        self.frequency = self.frequency.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_has_zero_frequency() {
        let entry = CacheEntry::new("data");
        assert_eq!(entry.value, "data");
        assert_eq!(entry.frequency, 0);
    }

    #[test]
    fn test_frequency_saturates() {
        let mut entry = CacheEntry::new(1);
        entry.frequency = u64::MAX;
        entry.increment_frequency();
        assert_eq!(entry.frequency, u64::MAX);
    }
}
