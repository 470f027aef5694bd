//! Time-boxed result cache.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, TimeDelta, Utc};

/// Map whose entries expire a fixed time after insertion.
///
/// Expiry is checked on read; the caller supplies the current time so the
/// cache stays deterministic under test.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: TimeDelta,
    entries: HashMap<K, (V, DateTime<Utc>)>,
}

impl<K: Eq + Hash, V> TtlCache<K, V> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: TimeDelta) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Value for `key` if it was inserted less than `ttl` before `now`.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(_, inserted)| now - *inserted < self.ttl)
            .map(|(value, _)| value)
    }

    /// Insert or replace the value for `key`.
    pub fn insert(&mut self, key: K, value: V, now: DateTime<Utc>) {
        self.entries.insert(key, (value, now));
    }

    /// Drop every entry that has expired at `now`.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, (_, inserted)| now - *inserted < ttl);
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_entries_expire() {
        let mut cache = TtlCache::new(TimeDelta::hours(2));
        cache.insert("BTC", 1, at(0));
        assert_eq!(cache.get(&"BTC", at(1)), Some(&1));
        assert_eq!(cache.get(&"BTC", at(2)), None);
        assert_eq!(cache.get(&"ETH", at(0)), None);
    }

    #[test]
    fn test_insert_refreshes_timestamp() {
        let mut cache = TtlCache::new(TimeDelta::hours(2));
        cache.insert("BTC", 1, at(0));
        cache.insert("BTC", 2, at(3));
        assert_eq!(cache.get(&"BTC", at(4)), Some(&2));
    }

    #[test]
    fn test_purge() {
        let mut cache = TtlCache::new(TimeDelta::hours(1));
        cache.insert("a", 1, at(0));
        cache.insert("b", 2, at(5));
        cache.purge_expired(at(5));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
