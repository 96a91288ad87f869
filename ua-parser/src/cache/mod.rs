//! The cache substrate and the resolver that sits in front of a base
//! resolver to consult it.
//!
//! A cache is a bounded key→value store with one operation set: `get`
//! (may mutate internal metadata) and `put` (insert or update, may
//! evict). It is a collaborator, not a resolver — it doesn't know
//! about facets, only about UA strings and [`PartialResult`]s.

mod lru;
mod s3fifo;
mod sieve;
mod thread_local;

pub use lru::Lru;
pub use s3fifo::S3Fifo;
pub use sieve::Sieve;
pub use thread_local::ThreadLocalCache;

use crate::{Domain, PartialResult, Resolver};

/// Bounded key→value store backing a [`CachingResolver`]. Keys are UA
/// strings, values are partial results. Implementations must be safe
/// to call concurrently from many threads (§5).
pub trait Cache: Send + Sync {
    /// Looks up `key`. May mutate internal eviction metadata (SIEVE's
    /// visited bit, S3-FIFO's frequency counter, LRU's recency order)
    /// without that counting as an external side effect.
    fn get(&self, key: &str) -> Option<PartialResult>;

    /// Inserts or updates `key`, evicting per the policy's algorithm
    /// if the cache is at capacity.
    fn put(&self, key: String, value: PartialResult);

    /// Current number of live entries. Used to verify the
    /// boundedness invariant (§8); not part of the hot path.
    fn len(&self) -> usize;
}

/// Wraps a base [`Resolver`] with a [`Cache`] in front of it.
///
/// On `resolve`: a cache hit that already covers every requested facet
/// is returned narrowed to the request; a partial or total miss
/// delegates the missing facets to the base resolver, merges the
/// fresh result with whatever was cached (the cached value wins for
/// any facet it already covers — cached values are immutable and
/// authoritative once produced), stores the merged result back, and
/// returns it narrowed to the request.
pub struct CachingResolver<C> {
    base: Box<dyn Resolver>,
    cache: C,
}

impl<C: Cache> CachingResolver<C> {
    /// Wraps `base` with `cache`.
    pub fn new(base: Box<dyn Resolver>, cache: C) -> Self {
        Self { base, cache }
    }

    /// Current number of entries held by the underlying cache.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl<C: Cache> Resolver for CachingResolver<C> {
    fn resolve(&self, ua: &str, requested: Domain) -> PartialResult {
        let Some(hit) = self.cache.get(ua) else {
            let result = self.base.resolve(ua, requested);
            self.cache.put(ua.to_string(), result.clone());
            return result.narrowed(requested);
        };

        let missing = requested.difference(hit.requested);
        if missing.is_empty() {
            return hit.narrowed(requested);
        }

        let fresh = self.base.resolve(ua, missing);
        let merged = hit.merge(fresh);
        self.cache.put(ua.to_string(), merged.clone());
        merged.narrowed(requested)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{device, os, user_agent, Regexes};
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ruleset() -> crate::Ruleset {
        Regexes {
            user_agent_parsers: vec![user_agent::Parser {
                regex: r"(Chrome)/(\d+)".to_string(),
                ..Default::default()
            }],
            os_parsers: vec![],
            device_parsers: vec![],
        }
        .compile()
        .unwrap()
    }

    /// A `Cache` wrapper that counts hits, to make cache usage
    /// observable from outside (§8 scenario 4).
    struct CountingCache<C> {
        inner: C,
        hits: Arc<AtomicUsize>,
    }
    impl<C: Cache> Cache for CountingCache<C> {
        fn get(&self, key: &str) -> Option<PartialResult> {
            let r = self.inner.get(key);
            if r.is_some() {
                self.hits.fetch_add(1, Ordering::SeqCst);
            }
            r
        }
        fn put(&self, key: String, value: PartialResult) {
            self.inner.put(key, value)
        }
        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn second_call_hits_cache() {
        let hits = Arc::new(AtomicUsize::new(0));
        let cache = CountingCache {
            inner: Lru::new(NonZeroUsize::new(8).unwrap()),
            hits: hits.clone(),
        };
        let resolver = CachingResolver::new(
            Box::new(crate::BasicResolver::new(ruleset())),
            cache,
        );

        let ua = "Chrome/99 test";
        resolver.resolve(ua, Domain::USER_AGENT);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        resolver.resolve(ua, Domain::USER_AGENT);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cache_transparency() {
        let base = crate::BasicResolver::new(ruleset());
        let cached = CachingResolver::new(
            Box::new(crate::BasicResolver::new(ruleset())),
            Lru::new(NonZeroUsize::new(8).unwrap()),
        );

        for ua in ["Chrome/1 x", "nope", "Chrome/2 y"] {
            for requested in [Domain::USER_AGENT, Domain::all(), Domain::empty()] {
                let direct = base.resolve(ua, requested);
                let via_cache = cached.resolve(ua, requested);
                assert_eq!(direct.user_agent, via_cache.user_agent);
                assert_eq!(direct.os, via_cache.os);
                assert_eq!(direct.device, via_cache.device);
            }
        }
    }

    #[test]
    fn partial_hit_fetches_only_missing_facets() {
        let resolver = CachingResolver::new(
            Box::new(crate::BasicResolver::new(ruleset())),
            Lru::new(NonZeroUsize::new(8).unwrap()),
        );
        let ua = "Chrome/42 desktop";
        let first = resolver.resolve(ua, Domain::USER_AGENT);
        assert_eq!(first.user_agent.unwrap().family, "Chrome");

        let second = resolver.resolve(ua, Domain::all());
        assert_eq!(second.requested, Domain::all());
        assert!(second.os.is_none());
        assert!(second.device.is_none());
    }
}
