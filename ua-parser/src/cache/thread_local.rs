use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use super::Cache;
use crate::PartialResult;

/// Gives every thread its own private cache instance, built lazily on
/// first use by a factory closure.
///
/// Useful when a policy's internal locking would otherwise become a
/// contention point under heavy multi-threaded load and per-thread
/// duplication of entries is an acceptable trade (§4.7). The registry
/// itself is a plain mutex-guarded map; it is only consulted once per
/// thread's first call, not on every `get`/`put`, because the looked
/// up `Arc<dyn Cache>` is cloned out and used directly afterwards.
pub struct ThreadLocalCache {
    factory: Box<dyn Fn() -> Arc<dyn Cache> + Send + Sync>,
    registry: Mutex<HashMap<ThreadId, Arc<dyn Cache>>>,
}

impl ThreadLocalCache {
    /// Builds a registry that constructs a fresh per-thread cache with
    /// `factory` the first time each thread touches it.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            registry: Mutex::new(HashMap::new()),
        }
    }

    fn current(&self) -> Arc<dyn Cache> {
        let id = std::thread::current().id();
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registry
            .entry(id)
            .or_insert_with(|| (self.factory)())
            .clone()
    }
}

impl Cache for ThreadLocalCache {
    fn get(&self, key: &str) -> Option<PartialResult> {
        self.current().get(key)
    }

    fn put(&self, key: String, value: PartialResult) {
        self.current().put(key, value)
    }

    /// Sum of live entries across every thread that has touched this
    /// cache so far. Threads that have exited are not removed from the
    /// registry, so this can overcount relative to currently-live
    /// threads; it is meant for the boundedness check in §8, not for
    /// precise accounting.
    fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .map(|c| c.len())
            .sum()
    }
}
