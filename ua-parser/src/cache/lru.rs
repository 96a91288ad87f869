use std::num::NonZeroUsize;
use std::sync::Mutex;

use super::Cache;
use crate::PartialResult;

/// Size-bounded LRU cache. On a hit the entry moves to most-recently-used;
/// on an insert at capacity, the least-recently-used entry is evicted.
/// O(1) amortised; every `get` mutates the access order, so the
/// concurrency contract is a single exclusive lock across `get` and
/// `put` (§5).
pub struct Lru {
    inner: Mutex<lru::LruCache<String, PartialResult>>,
}

impl Lru {
    /// Builds an LRU cache bounded to `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(lru::LruCache::new(capacity)),
        }
    }
}

impl Cache for Lru {
    fn get(&self, key: &str) -> Option<PartialResult> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: String, value: PartialResult) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let evicted = inner.put(key, value);
        if let Some((key, _)) = evicted {
            tracing::trace!(%key, policy = "lru", "evicted");
        }
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}
