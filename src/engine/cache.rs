use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::engine::RowSet;

/// Cache key for a range filter. Bounds are stored as raw bit patterns so
/// float queries hash and compare exactly.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct FilterKey {
    column: String,
    lo: u64,
    hi: u64,
}

impl FilterKey {
    pub fn new(column: &str, lo: f64, hi: f64) -> Self {
        FilterKey {
            column: column.to_string(),
            lo: lo.to_bits(),
            hi: hi.to_bits(),
        }
    }
}

/// LRU cache of filter results for repeated interactive queries.
///
/// Interactive exploration re-issues the same range filters as selections
/// toggle; caching them keeps repeat latency flat. See
/// [`Dataset::filter_cached`](crate::engine::Dataset::filter_cached).
#[derive(Debug)]
pub struct FilterCache {
    cache: RefCell<LruCache<FilterKey, RowSet>>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(128).unwrap())
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        FilterCache {
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &FilterKey) -> Option<RowSet> {
        self.cache.borrow().peek(key).cloned()
    }

    pub fn put(&self, key: FilterKey, rows: RowSet) {
        self.cache.borrow_mut().put(key, rows);
    }
}

impl Default for FilterCache {
    fn default() -> Self {
        Self::new()
    }
}
