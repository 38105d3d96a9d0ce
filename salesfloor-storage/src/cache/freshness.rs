//! Staleness metadata for cache reads.

use chrono::TimeDelta;
use salesfloor_core::Timestamp;

/// Result of a cache read, carrying staleness metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<T> {
    value: T,
    /// When this value was cached.
    cached_at: Timestamp,
    /// Whether the entry was still inside its TTL when read.
    was_fresh: bool,
}

impl<T> CacheRead<T> {
    pub(crate) fn new(value: T, cached_at: Timestamp, was_fresh: bool) -> Self {
        Self {
            value,
            cached_at,
            was_fresh,
        }
    }

    /// Consume the wrapper and return the underlying value.
    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn cached_at(&self) -> Timestamp {
        self.cached_at
    }

    pub fn was_fresh(&self) -> bool {
        self.was_fresh
    }

    /// Age of the entry at `now`; zero if the clock went backwards.
    pub fn age(&self, now: Timestamp) -> TimeDelta {
        (now - self.cached_at).max(TimeDelta::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_age_never_negative() {
        let now = Utc::now();
        let read = CacheRead::new(1u8, now + TimeDelta::seconds(5), true);
        assert_eq!(read.age(now), TimeDelta::zero());
        assert_eq!(read.age(now + TimeDelta::seconds(7)), TimeDelta::seconds(2));
        assert_eq!(read.into_value(), 1);
    }
}
