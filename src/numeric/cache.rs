// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Resolved Mask Cache
//!
//! Memoizes numeric -> name mask resolution per (message type, mask).
//!
//! # Why This Works
//!
//! - Resolution is a pure function of the schema and the mask
//! - [`NumericFieldMask`] keeps its paths in a sorted set, so equal masks
//!   hash equal whatever order their paths were added in
//! - Concurrent misses on the same key may both compute; both produce the
//!   same mask, so the last write wins harmlessly
//!
//! # Eviction
//!
//! Unbounded by default. [`EvictionPolicy`] can cap the entry count
//! (oldest-first eviction) and/or expire entries after a TTL.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

use super::NumericFieldMask;
use crate::error::Result;
use crate::field_mask::FieldMask;
use crate::metrics;

/// Cache key: (message type full name, mask)
type CacheKey = (String, NumericFieldMask);

/// Cached resolution
#[derive(Clone, Debug)]
struct CacheEntry {
    mask: FieldMask,
    inserted_at: Instant,
    /// Matches the insertion-order record that owns this entry
    generation: u64,
}

/// When cached masks are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionPolicy {
    /// Evict oldest entries beyond this count (None = unbounded)
    pub max_entries: Option<usize>,
    /// Expire entries older than this (None = never)
    pub ttl: Option<Duration>,
}

impl EvictionPolicy {
    /// Never evict.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_entries(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries),
            ttl: None,
        }
    }

    #[must_use]
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            max_entries: None,
            ttl: Some(ttl),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct MaskCacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Entries dropped to respect `max_entries`
    pub evicted: u64,
    /// Entries dropped because their TTL passed
    pub expired: u64,
    /// Current number of entries
    pub entry_count: usize,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

/// Cache of resolved field masks.
#[derive(Debug)]
pub struct MaskCache {
    /// Cache: (type name, mask) → resolved mask
    cache: DashMap<CacheKey, CacheEntry>,
    /// Insertion order for eviction (oldest first)
    order: Mutex<VecDeque<(CacheKey, u64)>>,
    policy: EvictionPolicy,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evicted: AtomicU64,
    expired: AtomicU64,
}

impl MaskCache {
    #[must_use]
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            cache: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            policy,
            next_generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    /// Cached mask for `(type_name, mask)`, if present and not expired.
    pub fn get(&self, type_name: &str, mask: &NumericFieldMask) -> Option<FieldMask> {
        let key = (type_name.to_string(), mask.clone());

        if let Some(entry) = self.cache.get(&key) {
            if !self.policy.is_expired(&entry) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(true);
                return Some(entry.mask.clone());
            }
            drop(entry); // Release read lock before removing
            if self
                .cache
                .remove_if(&key, |_, entry| self.policy.is_expired(entry))
                .is_some()
            {
                self.expired.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_eviction("expired", 1);
                metrics::set_cache_entries(self.cache.len());
                debug!(message_type = type_name, "Expired cached field mask");
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(false);
        None
    }

    /// Cache a resolved mask.
    pub fn insert(&self, type_name: &str, mask: &NumericFieldMask, resolved: FieldMask) {
        let key = (type_name.to_string(), mask.clone());

        if let Some(max_entries) = self.policy.max_entries {
            if !self.cache.contains_key(&key) {
                self.evict_to(max_entries.saturating_sub(1));
            }
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let entry = CacheEntry {
            mask: resolved,
            inserted_at: Instant::now(),
            generation,
        };

        // Insertion order only matters when there is a cap to enforce
        if self.policy.max_entries.is_none() {
            self.cache.insert(key, entry);
        } else {
            let mut order = self.order.lock();
            self.cache.insert(key.clone(), entry);
            order.push_back((key, generation));
            if order.len() > self.cache.len() {
                self.compact_order(&mut order);
            }
        }

        metrics::set_cache_entries(self.cache.len());
    }

    /// Drop order records whose entry was replaced, expired or removed.
    fn compact_order(&self, order: &mut VecDeque<(CacheKey, u64)>) {
        order.retain(|(key, generation)| {
            self.cache
                .get(key)
                .is_some_and(|entry| entry.generation == *generation)
        });
    }

    /// Cached mask, or compute, cache and return it. Errors are not cached.
    pub fn get_or_try_insert_with<F>(
        &self,
        type_name: &str,
        mask: &NumericFieldMask,
        resolve: F,
    ) -> Result<FieldMask>
    where
        F: FnOnce() -> Result<FieldMask>,
    {
        if let Some(cached) = self.get(type_name, mask) {
            return Ok(cached);
        }

        let resolved = resolve()?;
        self.insert(type_name, mask, resolved.clone());
        Ok(resolved)
    }

    /// Drop oldest entries until at most `target` remain.
    fn evict_to(&self, target: usize) {
        let mut order = self.order.lock();
        let mut evicted = 0usize;

        while self.cache.len() > target {
            let Some((old_key, generation)) = order.pop_front() else {
                break;
            };
            // Skip order records superseded by a later insert of the same key
            if self
                .cache
                .remove_if(&old_key, |_, entry| entry.generation == generation)
                .is_some()
            {
                evicted += 1;
            }
        }

        if evicted > 0 {
            self.evicted.fetch_add(evicted as u64, Ordering::Relaxed);
            metrics::record_cache_eviction("capacity", evicted);
            debug!(evicted, remaining = self.cache.len(), "Evicted cached field masks");
        }
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        if self.policy.ttl.is_none() {
            return 0;
        }

        let before = self.cache.len();
        self.cache.retain(|_, entry| !self.policy.is_expired(entry));
        let purged = before.saturating_sub(self.cache.len());

        if purged > 0 {
            if self.policy.max_entries.is_some() {
                self.compact_order(&mut self.order.lock());
            }
            self.expired.fetch_add(purged as u64, Ordering::Relaxed);
            metrics::record_cache_eviction("expired", purged);
            metrics::set_cache_entries(self.cache.len());
        }
        purged
    }

    /// Get cache statistics
    pub fn stats(&self) -> MaskCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        MaskCacheStats {
            hits,
            misses,
            evicted: self.evicted.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entry_count: self.cache.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        self.cache.clear();
        self.order.lock().clear();
        metrics::set_cache_entries(0);
    }
}

#[cfg(test)]
impl MaskCache {
    fn order_len(&self) -> usize {
        self.order.lock().len()
    }
}

impl Default for MaskCache {
    fn default() -> Self {
        Self::new(EvictionPolicy::unbounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldMaskError;

    const TS: &str = "google.protobuf.Timestamp";

    fn mask(paths: &[&str]) -> NumericFieldMask {
        NumericFieldMask::from_paths(paths.iter().copied())
    }

    fn resolved(paths: &[&str]) -> FieldMask {
        FieldMask::from_paths(paths.iter().copied())
    }

    #[test]
    fn test_cache_hit() {
        let cache = MaskCache::default();
        cache.insert(TS, &mask(&["1"]), resolved(&["seconds"]));

        assert_eq!(cache.get(TS, &mask(&["1"])), Some(resolved(&["seconds"])));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_cache_miss() {
        let cache = MaskCache::default();
        assert_eq!(cache.get(TS, &mask(&["1"])), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_key_is_order_independent() {
        let cache = MaskCache::default();
        let a = NumericFieldMask::new().with_path("2").with_path("1");
        let b = NumericFieldMask::new().with_path("1").with_path("2");

        cache.insert(TS, &a, resolved(&["nanos", "seconds"]));
        assert!(cache.get(TS, &b).is_some());
    }

    #[test]
    fn test_different_types_and_invert_flags() {
        let cache = MaskCache::default();
        cache.insert(TS, &mask(&["1"]), resolved(&["seconds"]));

        assert!(cache.get("google.protobuf.Duration", &mask(&["1"])).is_none());
        assert!(cache.get(TS, &mask(&["1"]).with_invert(true)).is_none());
    }

    #[test]
    fn test_get_or_try_insert_with() {
        let cache = MaskCache::default();
        let mut calls = 0;

        for _ in 0..3 {
            let result = cache
                .get_or_try_insert_with(TS, &mask(&["2"]), || {
                    calls += 1;
                    Ok(resolved(&["nanos"]))
                })
                .unwrap();
            assert_eq!(result, resolved(&["nanos"]));
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_not_cached() {
        let cache = MaskCache::default();
        let result = cache.get_or_try_insert_with(TS, &mask(&["1."]), || {
            Err(FieldMaskError::MalformedPath {
                path: "1.".into(),
                reason: "empty segment".into(),
            })
        });

        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_oldest() {
        let cache = MaskCache::new(EvictionPolicy::max_entries(3));

        cache.insert(TS, &mask(&["1"]), resolved(&["a"]));
        cache.insert(TS, &mask(&["2"]), resolved(&["b"]));
        cache.insert(TS, &mask(&["3"]), resolved(&["c"]));
        assert_eq!(cache.len(), 3);

        // Insert 4th - should evict oldest
        cache.insert(TS, &mask(&["4"]), resolved(&["d"]));

        assert_eq!(cache.len(), 3);
        assert!(cache.get(TS, &mask(&["1"])).is_none());
        assert!(cache.get(TS, &mask(&["4"])).is_some());
        assert_eq!(cache.stats().evicted, 1);
    }

    #[test]
    fn test_reinsert_does_not_evict_fresh_entry() {
        let cache = MaskCache::new(EvictionPolicy::max_entries(2));

        cache.insert(TS, &mask(&["1"]), resolved(&["a"]));
        cache.insert(TS, &mask(&["2"]), resolved(&["b"]));
        // Re-insert the oldest key; its stale order record must not evict it later
        cache.insert(TS, &mask(&["1"]), resolved(&["a2"]));
        cache.insert(TS, &mask(&["3"]), resolved(&["c"]));

        assert_eq!(cache.get(TS, &mask(&["1"])), Some(resolved(&["a2"])));
        assert!(cache.get(TS, &mask(&["2"])).is_none());
        assert!(cache.get(TS, &mask(&["3"])).is_some());
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = MaskCache::new(EvictionPolicy::ttl(Duration::ZERO));
        cache.insert(TS, &mask(&["1"]), resolved(&["seconds"]));

        assert!(cache.get(TS, &mask(&["1"])).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expired, 1);
    }

    #[test]
    fn test_purge_expired() {
        let cache = MaskCache::new(EvictionPolicy::ttl(Duration::ZERO));
        cache.insert(TS, &mask(&["1"]), resolved(&["seconds"]));
        cache.insert(TS, &mask(&["2"]), resolved(&["nanos"]));

        assert_eq!(cache.purge_expired(), 2);
        assert!(cache.is_empty());

        let unbounded = MaskCache::default();
        unbounded.insert(TS, &mask(&["1"]), resolved(&["seconds"]));
        assert_eq!(unbounded.purge_expired(), 0);
        assert_eq!(unbounded.len(), 1);
    }

    #[test]
    fn test_hit_rate_and_clear() {
        let cache = MaskCache::default();
        cache.insert(TS, &mask(&["1"]), resolved(&["seconds"]));

        // 3 hits, 1 miss
        cache.get(TS, &mask(&["1"]));
        cache.get(TS, &mask(&["1"]));
        cache.get(TS, &mask(&["1"]));
        cache.get(TS, &mask(&["2"]));

        let stats = cache.stats();
        assert!((stats.hit_rate - 0.75).abs() < 0.01);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_order_does_not_grow_without_cap() {
        let ttl_only = MaskCache::new(EvictionPolicy::ttl(Duration::ZERO));
        let unbounded = MaskCache::default();

        for _ in 0..1000 {
            ttl_only
                .get_or_try_insert_with(TS, &mask(&["1"]), || Ok(resolved(&["seconds"])))
                .unwrap();
            unbounded.insert(TS, &mask(&["1"]), resolved(&["seconds"]));
        }

        assert_eq!(ttl_only.order_len(), 0);
        assert_eq!(unbounded.order_len(), 0);
        assert_eq!(unbounded.len(), 1);
    }

    #[test]
    fn test_order_bounded_by_entries_under_churn() {
        let cache = MaskCache::new(EvictionPolicy::max_entries(4).with_ttl(Duration::ZERO));
        let capped = MaskCache::new(EvictionPolicy::max_entries(4));

        for i in 0..1000 {
            let key = mask(&[["1", "2", "3"][i % 3]]);
            // Every lookup expires, so each round re-inserts
            cache
                .get_or_try_insert_with(TS, &key, || Ok(resolved(&["seconds"])))
                .unwrap();
            capped.insert(TS, &key, resolved(&["seconds"]));

            assert!(cache.order_len() <= cache.len());
            assert!(capped.order_len() <= capped.len());
        }

        assert_eq!(capped.len(), 3);
        cache.purge_expired();
        assert_eq!(cache.order_len(), 0);
    }

    #[test]
    fn test_concurrent_misses_converge() {
        let cache = MaskCache::new(EvictionPolicy::max_entries(8));
        let key = mask(&["1", "2"]);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        let result = cache
                            .get_or_try_insert_with(TS, &key, || Ok(resolved(&["nanos", "seconds"])))
                            .unwrap();
                        assert_eq!(result, resolved(&["nanos", "seconds"]));
                    }
                });
            }
        });

        assert_eq!(cache.len(), 1);
        assert!(cache.order_len() <= cache.len());
        assert_eq!(cache.get(TS, &key), Some(resolved(&["nanos", "seconds"])));

        let stats = cache.stats();
        assert_eq!(stats.hits + stats.misses, 801);
        assert!(stats.misses >= 1);
    }
}
