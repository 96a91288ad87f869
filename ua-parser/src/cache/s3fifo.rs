use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::RwLock;

use super::Cache;
use crate::PartialResult;

const MAX_FREQ: u8 = 3;

struct Record {
    value: PartialResult,
    freq: AtomicU8,
}

struct Inner {
    small: VecDeque<String>,
    main: VecDeque<String>,
    /// Keys only: recently evicted from `small` without having been
    /// accessed again, remembered so a re-insert goes straight to
    /// `main` instead of restarting in `small`.
    ghost: VecDeque<String>,
    records: HashMap<String, Record>,
}

/// S3-FIFO: a small FIFO queue admits everything, a large "main" FIFO
/// holds entries that proved themselves by being accessed again, and a
/// ghost queue of bare keys remembers recent `small` evictions so they
/// re-enter through `main` instead of cycling through `small` forever.
///
/// Every entry keeps a saturating access counter (max 3, per the
/// original design). A hit only bumps that counter through a shared
/// reference behind the read lock — no FIFO reordering on the hot
/// path. Queue movement happens only on insert/evict under the write
/// lock (§4.6.3, §5).
pub struct S3Fifo {
    small_capacity: usize,
    main_capacity: usize,
    inner: RwLock<Inner>,
}

impl S3Fifo {
    /// Builds an S3-FIFO cache bounded to `capacity` entries, split
    /// ~10%/90% between the small and main queues (capacities always
    /// summing to exactly `capacity`, so the two queues together never
    /// hold more live entries than requested), with a ghost queue
    /// sized to match the main queue.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        let small_capacity = ((capacity + 9) / 10).clamp(1, capacity);
        let main_capacity = capacity - small_capacity;
        Self {
            small_capacity,
            main_capacity,
            inner: RwLock::new(Inner {
                small: VecDeque::new(),
                main: VecDeque::new(),
                ghost: VecDeque::new(),
                records: HashMap::new(),
            }),
        }
    }
}

impl Inner {
    fn ghost_remember(&mut self, key: String, ghost_capacity: usize) {
        if ghost_capacity == 0 {
            return;
        }
        if self.ghost.len() >= ghost_capacity {
            self.ghost.pop_front();
        }
        self.ghost.push_back(key);
    }

    fn evict_small(&mut self, main_capacity: usize, ghost_capacity: usize) {
        if let Some(key) = self.small.pop_front() {
            let freq = self
                .records
                .get(&key)
                .map(|r| r.freq.load(Ordering::Acquire))
                .unwrap_or(0);
            if freq > 0 {
                if let Some(r) = self.records.get(&key) {
                    r.freq.store(freq - 1, Ordering::Release);
                }
                self.main.push_back(key);
                if self.main.len() > main_capacity {
                    self.evict_main();
                }
            } else {
                self.records.remove(&key);
                self.ghost_remember(key, ghost_capacity);
            }
            return;
        }
    }

    fn evict_main(&mut self) {
        while let Some(key) = self.main.pop_front() {
            let freq = self
                .records
                .get(&key)
                .map(|r| r.freq.load(Ordering::Acquire))
                .unwrap_or(0);
            if freq > 0 {
                if let Some(r) = self.records.get(&key) {
                    r.freq.store(freq - 1, Ordering::Release);
                }
                self.main.push_back(key);
                continue;
            }
            self.records.remove(&key);
            tracing::trace!(%key, policy = "s3fifo", queue = "main", "evicted");
            return;
        }
    }
}

impl Cache for S3Fifo {
    fn get(&self, key: &str) -> Option<PartialResult> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let record = inner.records.get(key)?;
        let cur = record.freq.load(Ordering::Acquire);
        if cur < MAX_FREQ {
            record.freq.store(cur + 1, Ordering::Release);
        }
        Some(record.value.clone())
    }

    fn put(&self, key: String, value: PartialResult) {
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(record) = inner.records.get_mut(&key) {
            record.value = value;
            return;
        }

        let ghost_capacity = self.main_capacity;
        let came_from_ghost = if let Some(pos) = inner.ghost.iter().position(|k| k == &key) {
            inner.ghost.remove(pos);
            true
        } else {
            false
        };

        inner.records.insert(
            key.clone(),
            Record {
                value,
                freq: AtomicU8::new(0),
            },
        );

        if came_from_ghost {
            inner.main.push_back(key);
            if inner.main.len() > self.main_capacity {
                inner.evict_main();
            }
        } else {
            inner.small.push_back(key);
            if inner.small.len() > self.small_capacity {
                inner.evict_small(self.main_capacity, ghost_capacity);
            }
        }
    }

    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .records
            .len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn value(family: &str) -> PartialResult {
        PartialResult {
            requested: crate::Domain::USER_AGENT,
            user_agent: Some(crate::user_agent::Value {
                family: family.to_string(),
                major: None,
                minor: None,
                patch: None,
                patch_minor: None,
            }),
            os: None,
            device: None,
            string: family.to_string(),
        }
    }

    #[test]
    fn bounded_by_capacity() {
        let c = S3Fifo::new(NonZeroUsize::new(10).unwrap());
        for i in 0..50 {
            c.put(format!("k{i}"), value("X"));
        }
        assert!(c.len() <= 10);
    }

    #[test]
    fn capacity_one_never_holds_more_than_one_entry() {
        let c = S3Fifo::new(NonZeroUsize::new(1).unwrap());
        for key in ["a", "b", "a", "c", "a", "b"] {
            c.put(key.to_string(), value("X"));
            assert!(c.len() <= 1);
        }
    }

    #[test]
    fn frequently_accessed_entry_survives_churn() {
        let c = S3Fifo::new(NonZeroUsize::new(4).unwrap());
        c.put("hot".into(), value("Hot"));
        for _ in 0..3 {
            assert!(c.get("hot").is_some());
        }
        for i in 0..20 {
            c.put(format!("filler{i}"), value("Filler"));
        }
        assert!(c.get("hot").is_some());
    }

    #[test]
    fn update_existing_key_does_not_grow() {
        let c = S3Fifo::new(NonZeroUsize::new(4).unwrap());
        c.put("a".into(), value("A"));
        c.put("a".into(), value("A2"));
        assert_eq!(c.len(), 1);
        assert_eq!(c.get("a").unwrap().user_agent.unwrap().family, "A2");
    }
}
