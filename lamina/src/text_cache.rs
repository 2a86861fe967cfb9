//! Measurement cache for text.
//!
//! Measuring is the only per-frame cost the engine cannot avoid on its own, and
//! a UI re-declares mostly the same strings every frame. `CachedMeasurer` keeps
//! the most recently used results keyed by a hash of content and style.

use std::cell::{Cell, RefCell};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::text::{TextMeasurement, TextMeasurer, TextStyle};

/// Entries kept when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 4096;

/// LRU-backed wrapper around any [`TextMeasurer`].
///
/// Interior mutability keeps `measure(&self)` usable through `&dyn
/// TextMeasurer`; one instance belongs to one thread.
pub struct CachedMeasurer<M> {
    inner: M,
    entries: RefCell<LruCache<u64, TextMeasurement>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self::with_capacity(inner, DEFAULT_CAPACITY)
    }

    /// A capacity of 0 is treated as 1.
    pub fn with_capacity(inner: M, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            entries: RefCell::new(LruCache::new(capacity)),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.get(), self.misses.get())
    }

    fn key(text: &str, style: &TextStyle) -> u64 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        style.hash(&mut hasher);
        hasher.finish()
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMeasurement {
        let key = Self::key(text, style);
        let cached = self.entries.borrow_mut().get(&key).copied();
        if let Some(measurement) = cached {
            self.hits.set(self.hits.get() + 1);
            return measurement;
        }
        self.misses.set(self.misses.get() + 1);
        let measurement = self.inner.measure(text, style);
        self.entries.borrow_mut().put(key, measurement);
        measurement
    }
}
