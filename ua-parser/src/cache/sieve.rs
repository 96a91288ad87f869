use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use super::Cache;
use crate::PartialResult;

struct Entry {
    key: String,
    value: PartialResult,
    visited: AtomicBool,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner {
    slab: Vec<Option<Entry>>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    /// Most recently inserted entry.
    head: Option<usize>,
    /// Oldest entry; eviction hand starts here.
    tail: Option<usize>,
    hand: Option<usize>,
}

/// SIEVE eviction: a single "hand" sweeps from the tail toward the head
/// looking for an entry that hasn't been visited since its last sweep.
/// A visited entry is spared once (its bit is cleared and the hand
/// moves on); an unvisited entry is evicted. New entries are always
/// inserted at the head, unvisited.
///
/// Hits only need a read lock: they flip an [`AtomicBool`] reachable
/// through the shared reference, never touch the list links. Only
/// insert/evict take the write lock (§4.6.2, §5).
pub struct Sieve {
    capacity: usize,
    inner: RwLock<Inner>,
}

impl Sieve {
    /// Builds a SIEVE cache bounded to `capacity` entries. `capacity`
    /// must be at least 1.
    pub fn new(capacity: std::num::NonZeroUsize) -> Self {
        Self {
            capacity: capacity.get(),
            inner: RwLock::new(Inner {
                slab: Vec::new(),
                free: Vec::new(),
                index: HashMap::new(),
                head: None,
                tail: None,
                hand: None,
            }),
        }
    }
}

impl Inner {
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let e = self.slab[idx].as_ref().unwrap();
            (e.prev, e.next)
        };
        match prev {
            Some(p) => self.slab[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slab[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_head(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let e = self.slab[idx].as_mut().unwrap();
            e.prev = None;
            e.next = old_head;
        }
        if let Some(h) = old_head {
            self.slab[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    /// Runs the SIEVE hand until it finds and evicts an unvisited
    /// entry.
    fn evict_one(&mut self) {
        let mut cursor = self.hand.or(self.tail);
        loop {
            let Some(idx) = cursor else { return };
            let visited = self.slab[idx]
                .as_ref()
                .unwrap()
                .visited
                .swap(false, Ordering::AcqRel);
            if visited {
                cursor = self.slab[idx].as_ref().unwrap().prev.or(self.tail);
                continue;
            }
            let prev = self.slab[idx].as_ref().unwrap().prev;
            self.hand = prev.or(self.tail);
            let key = self.slab[idx].as_ref().unwrap().key.clone();
            self.unlink(idx);
            self.slab[idx] = None;
            self.free.push(idx);
            self.index.remove(&key);
            tracing::trace!(%key, policy = "sieve", "evicted");
            return;
        }
    }

    fn alloc(&mut self, entry: Entry) -> usize {
        if let Some(idx) = self.free.pop() {
            self.slab[idx] = Some(entry);
            idx
        } else {
            self.slab.push(Some(entry));
            self.slab.len() - 1
        }
    }
}

impl Cache for Sieve {
    fn get(&self, key: &str) -> Option<PartialResult> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let idx = *inner.index.get(key)?;
        let entry = inner.slab[idx].as_ref().unwrap();
        entry.visited.store(true, Ordering::Release);
        Some(entry.value.clone())
    }

    fn put(&self, key: String, value: PartialResult) {
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(&idx) = inner.index.get(&key) {
            inner.slab[idx].as_mut().unwrap().value = value;
            return;
        }
        if inner.index.len() >= self.capacity {
            inner.evict_one();
        }
        let entry = Entry {
            key: key.clone(),
            value,
            visited: AtomicBool::new(false),
            prev: None,
            next: None,
        };
        let idx = inner.alloc(entry);
        inner.push_head(idx);
        inner.index.insert(key, idx);
    }

    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .index
            .len()
    }
}
