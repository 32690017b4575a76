//! # Build Cache
//!
//! Memoizes built values by key with at-most-one build per key.
//!
//! ## Locking
//!
//! The key map sits behind a `parking_lot::RwLock` and is only held long
//! enough to find or insert a per-key slot. Each slot is a
//! `parking_lot::Mutex`; the builder runs while holding the slot lock, so
//! concurrent requesters of the same key wait for that build and share its
//! result, while other keys proceed independently. A failed build leaves the
//! slot empty and the next requester tries again.
//!
//! Entries live until [`BuildCache::clear`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

type Slot<V> = Arc<Mutex<Option<Arc<V>>>>;

/// Counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Populated entries.
    pub entries: usize,
    /// Requests answered from a populated entry.
    pub hits: u64,
    /// Requests that ran the builder.
    pub misses: u64,
    /// Builder runs that produced a value.
    pub builds: u64,
}

/// Thread-safe memo table.
#[derive(Debug)]
pub struct BuildCache<K, V> {
    slots: RwLock<HashMap<K, Slot<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
}

impl<K, V> Default for BuildCache<K, V> {
    fn default() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            builds: AtomicU64::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone, V> BuildCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `build` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the builder's error. Nothing is cached in that case.
    pub fn get_or_build<E>(
        &self,
        key: &K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        let slot = self.slot(key);
        let mut value = slot.lock();
        if let Some(cached) = value.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("cache hit");
            return Ok(Arc::clone(cached));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("cache miss");
        let built = Arc::new(build()?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        *value = Some(Arc::clone(&built));
        Ok(built)
    }

    fn slot(&self, key: &K) -> Slot<V> {
        if let Some(slot) = self.slots.read().get(key) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(key.clone()).or_default())
    }

    /// The cached value, without building.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.slots.read().get(key).map(Arc::clone)?;
        let value = slot.lock();
        value.as_ref().map(Arc::clone)
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.lock().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
        }
    }
}
