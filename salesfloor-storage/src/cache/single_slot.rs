//! A cache that remembers exactly one keyed value.
//!
//! Writing any key evicts whatever was there before. Concurrent writers are
//! last-writer-wins; the cached values are snapshots of the same query, so
//! losing one of two racing refreshes is harmless.

use chrono::TimeDelta;
use salesfloor_core::Timestamp;
use std::sync::RwLock;
use std::time::Duration;

use super::CacheRead;

#[derive(Debug, Clone)]
struct Slot<K, V> {
    key: K,
    value: V,
    cached_at: Timestamp,
}

/// Single-entry TTL cache.
#[derive(Debug)]
pub struct SingleSlotCache<K, V> {
    ttl: TimeDelta,
    slot: RwLock<Option<Slot<K, V>>>,
}

impl<K, V> SingleSlotCache<K, V>
where
    K: PartialEq + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::ZERO)
    }

    /// The cached value for `key` if it is younger than the TTL at `now`.
    pub fn get_fresh(&self, key: &K, now: Timestamp) -> Option<CacheRead<V>> {
        self.get_any(key, now).filter(CacheRead::was_fresh)
    }

    /// The cached value for `key` regardless of age.
    pub fn get_any(&self, key: &K, now: Timestamp) -> Option<CacheRead<V>> {
        let guard = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.as_ref().filter(|slot| &slot.key == key).map(|slot| {
            let fresh = now - slot.cached_at < self.ttl;
            CacheRead::new(slot.value.clone(), slot.cached_at, fresh)
        })
    }

    /// Replace the slot.
    pub fn put(&self, key: K, value: V, now: Timestamp) {
        let mut guard = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(Slot {
            key,
            value,
            cached_at: now,
        });
    }

    pub fn clear(&self) {
        let mut guard = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = None;
    }

    /// Key currently held, if any.
    pub fn current_key(&self) -> Option<K> {
        let guard = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.as_ref().map(|slot| slot.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    #[test]
    fn test_fresh_within_ttl() {
        let cache = SingleSlotCache::new(Duration::from_secs(30));
        let t = Utc::now();
        cache.put("daily", 7, t);

        let hit = cache.get_fresh(&"daily", t + TimeDelta::seconds(29)).unwrap();
        assert_eq!(*hit.value(), 7);
        assert_eq!(hit.cached_at(), t);
        assert!(cache.get_fresh(&"daily", t + TimeDelta::seconds(30)).is_none());
    }

    #[test]
    fn test_stale_read_survives_ttl() {
        let cache = SingleSlotCache::new(Duration::from_secs(15));
        let t = Utc::now();
        cache.put("QTZM".to_string(), 1.5, t);

        let stale = cache
            .get_any(&"QTZM".to_string(), t + TimeDelta::hours(1))
            .unwrap();
        assert!(!stale.was_fresh());
        assert_eq!(stale.into_value(), 1.5);
    }

    #[test]
    fn test_new_key_evicts_old() {
        let cache = SingleSlotCache::new(Duration::from_secs(30));
        let t = Utc::now();
        cache.put("daily", 1, t);
        cache.put("weekly", 2, t);

        assert!(cache.get_any(&"daily", t).is_none());
        assert_eq!(cache.current_key(), Some("weekly"));
        cache.clear();
        assert!(cache.current_key().is_none());
    }

    proptest! {
        #[test]
        fn prop_fresh_iff_younger_than_ttl(ttl_secs in 1u64..120, age_ms in 0i64..240_000) {
            let cache = SingleSlotCache::new(Duration::from_secs(ttl_secs));
            let t = Utc::now();
            cache.put(0u8, (), t);
            let now = t + TimeDelta::milliseconds(age_ms);
            let expected = age_ms < (ttl_secs as i64) * 1000;
            prop_assert_eq!(cache.get_fresh(&0u8, now).is_some(), expected);
            prop_assert!(cache.get_any(&0u8, now).is_some());
        }
    }
}
