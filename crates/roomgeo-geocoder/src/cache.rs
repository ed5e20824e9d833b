//! In-memory TTL cache of successful lookups.
//!
//! Keys are normalised addresses (trimmed, lowercased, internal whitespace
//! collapsed). Only successful results are cached; failures always reach the
//! provider again on the next call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use roomgeo_core::GeocodeResult;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: GeocodeResult,
    expires_at: Instant,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
pub struct GeocodeCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache key for an address.
#[must_use]
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl GeocodeCache {
    /// A `ttl` of zero disables the cache entirely.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached result if present and unexpired. Expired entries
    /// are dropped on read.
    pub fn get(&self, address: &str) -> Option<GeocodeResult> {
        if !self.is_enabled() {
            return None;
        }
        let key = normalize_address(address);
        let mut entries = self.lock();
        let now = Instant::now();

        match entries.get(&key) {
            Some(entry) if entry.expires_at > now => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.result.clone())
            }
            Some(_) => {
                entries.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores a result, sweeping expired entries first so keys that are
    /// never read again do not accumulate.
    pub fn insert(&self, address: &str, result: GeocodeResult) {
        if !self.is_enabled() {
            return;
        }
        let now = Instant::now();
        let entry = CacheEntry {
            result,
            expires_at: now + self.ttl,
        };
        let mut entries = self.lock();
        evict_expired(&mut entries, now);
        entries.insert(normalize_address(address), entry);
    }

    /// Drops one address. Returns whether it was cached.
    pub fn invalidate(&self, address: &str) -> bool {
        self.lock().remove(&normalize_address(address)).is_some()
    }

    /// Drops everything. Returns the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Drops expired entries. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        evict_expired(&mut self.lock(), Instant::now())
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

fn evict_expired(entries: &mut HashMap<String, CacheEntry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.expires_at > now);
    before - entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> GeocodeResult {
        GeocodeResult {
            latitude: 42.3505,
            longitude: -71.1054,
            display_name: "Mugar Memorial Library, Boston".to_owned(),
            provider_place_id: "1234".to_owned(),
            confidence: 0.85,
        }
    }

    #[test]
    fn normalization_collapses_case_and_whitespace() {
        assert_eq!(
            normalize_address("  771  Commonwealth\tAve,  BOSTON "),
            "771 commonwealth ave, boston"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hit_after_insert() {
        let cache = GeocodeCache::new(Duration::from_secs(60));
        cache.insert("771 Commonwealth Ave", result());
        assert_eq!(cache.get("771  commonwealth ave"), Some(result()));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = GeocodeCache::new(Duration::from_secs(60));
        cache.insert("771 Commonwealth Ave", result());
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("771 Commonwealth Ave"), None);
        assert_eq!(cache.stats().entries, 0, "expired entry should be dropped on read");
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_removes_only_expired() {
        let cache = GeocodeCache::new(Duration::from_secs(60));
        cache.insert("old", result());
        tokio::time::advance(Duration::from_secs(45)).await;
        cache.insert("new", result());
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.cleanup_expired(), 1);
        assert!(cache.get("new").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_sweeps_unread_expired_entries() {
        let cache = GeocodeCache::new(Duration::from_secs(60));
        cache.insert("1 Silber Way", result());
        cache.insert("775 Commonwealth Ave", result());
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert("771 Commonwealth Ave", result());
        assert_eq!(cache.stats().entries, 1);
        assert!(cache.get("771 Commonwealth Ave").is_some());
    }

    #[test]
    fn zero_ttl_disables_cache() {
        let cache = GeocodeCache::new(Duration::ZERO);
        cache.insert("771 Commonwealth Ave", result());
        assert!(!cache.is_enabled());
        assert_eq!(cache.get("771 Commonwealth Ave"), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[tokio::test]
    async fn invalidate_and_clear() {
        let cache = GeocodeCache::new(Duration::from_secs(60));
        cache.insert("a", result());
        cache.insert("b", result());
        assert!(cache.invalidate("A"));
        assert!(!cache.invalidate("A"));
        assert_eq!(cache.clear(), 1);
    }
}
