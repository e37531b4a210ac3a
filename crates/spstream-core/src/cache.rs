// Keyed result cache with per-key single-flight computation and TTL expiry.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::Clock;

/// A cached value that records when it was produced.
///
/// The cache calls `stamp` once, right after a successful computation and
/// before the value is shared, so callers always see the store time.
pub trait Stamped {
    fn stamp(&mut self, at: DateTime<Utc>);
}

/// Identifies one cached result: the team it was computed for plus a
/// fingerprint of every setting that influenced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    team: String,
    fingerprint: String,
}

impl CacheKey {
    pub fn new(team: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            fingerprint: fingerprint.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.team, self.fingerprint)
    }
}

/// Point-in-time counters for cache activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub failures: u64,
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    invalidations: AtomicU64,
}

struct Entry<V> {
    value: Arc<V>,
    /// `None` when the expiry would overflow the calendar; such entries
    /// only leave through invalidation.
    expires_at: Option<DateTime<Utc>>,
}

impl<V> Entry<V> {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |exp| now < exp)
    }
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<Entry<V>>>>;

/// Caches one computed value per [`CacheKey`].
///
/// Callers asking for the same key while a computation is running wait for
/// it and share its result. Different keys never wait on each other. Failed
/// computations leave nothing behind.
pub struct ResultCache<V> {
    slots: Mutex<HashMap<CacheKey, Slot<V>>>,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl<V: Stamped> ResultCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
            counters: Counters::default(),
        }
    }

    /// Return the fresh value stored under `key`, or run `compute` and store
    /// its result for `ttl`.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        compute: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().await;

        let now = self.clock.now();
        match guard.as_ref() {
            Some(entry) if entry.is_fresh(now) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                return Ok(Arc::clone(&entry.value));
            }
            Some(_) => {
                debug!(key = %key, "cache entry expired");
                *guard = None;
            }
            None => {}
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "cache miss, computing");

        // Keys for past days are never asked for again.
        let swept = self.purge_expired();
        if swept > 0 {
            debug!(swept, "dropped stale cache keys");
        }

        let mut value = match compute().await {
            Ok(v) => v,
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, "computation failed; nothing cached");
                return Err(e);
            }
        };

        let stored_at = self.clock.now();
        value.stamp(stored_at);
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| stored_at.checked_add_signed(d));

        let value = Arc::new(value);
        *guard = Some(Entry {
            value: Arc::clone(&value),
            expires_at,
        });
        Ok(value)
    }

    /// Drop the entry for `key`. Waits for an in-flight computation on the
    /// same key to finish and discards its result. Returns whether anything
    /// was removed.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        let slot = {
            let slots = self.slots.lock().expect("cache slots mutex poisoned");
            slots.get(key).cloned()
        };
        let Some(slot) = slot else {
            return false;
        };
        let removed = slot.lock().await.take().is_some();
        if removed {
            self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "cache entry invalidated");
        }
        removed
    }

    /// Drop every entry. Returns how many were removed.
    pub async fn invalidate_all(&self) -> usize {
        let slots: Vec<Slot<V>> = {
            let slots = self.slots.lock().expect("cache slots mutex poisoned");
            slots.values().cloned().collect()
        };
        let mut removed = 0;
        for slot in slots {
            if slot.lock().await.take().is_some() {
                removed += 1;
            }
        }
        self.counters
            .invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!(removed, "cache cleared");
        removed
    }

    /// Forget keys whose entry is empty or expired and that nobody is
    /// currently computing. Returns how many keys were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut slots = self.slots.lock().expect("cache slots mutex poisoned");
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|e| e.is_fresh(now)),
                Err(_) => true,
            }
        });
        before - slots.len()
    }

    /// Number of fresh entries. Keys with a computation in flight are not
    /// counted.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let slots = self.slots.lock().expect("cache slots mutex poisoned");
        slots
            .values()
            .filter(|slot| {
                slot.try_lock()
                    .map(|entry| entry.as_ref().is_some_and(|e| e.is_fresh(now)))
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    fn slot(&self, key: &CacheKey) -> Slot<V> {
        let mut slots = self.slots.lock().expect("cache slots mutex poisoned");
        Arc::clone(slots.entry(key.clone()).or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
