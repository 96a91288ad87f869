use std::num::NonZeroUsize;

use proptest::prelude::*;

use ua_parser::cache::{CachingResolver, Lru, Sieve, S3Fifo};
use ua_parser::{device, os, user_agent, BasicResolver, Domain, Regexes, Resolver, Ruleset};

fn sample_ruleset() -> Ruleset {
    Regexes {
        user_agent_parsers: vec![
            user_agent::Parser {
                regex: r"(Chrome)/(\d+)\.(\d+)".to_string(),
                ..Default::default()
            },
            user_agent::Parser {
                regex: r"(Firefox)/(\d+)".to_string(),
                ..Default::default()
            },
        ],
        os_parsers: vec![os::Parser {
            regex: r"(Windows NT) (\d+)\.(\d+)".to_string(),
            ..Default::default()
        }],
        device_parsers: vec![device::Parser {
            regex: r"(iPhone|iPad)".to_string(),
            ..Default::default()
        }],
    }
    .compile()
    .unwrap()
}

fn ua_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "Chrome/[0-9]{1,3}\\.[0-9]{1,3}( test)?",
        "Firefox/[0-9]{1,3}( mobile)?",
        "Windows NT [0-9]{1,2}\\.[0-9]",
        "iPhone|iPad",
        ".{0,40}",
    ]
}

fn domain_strategy() -> impl Strategy<Value = Domain> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, b, c)| {
        let mut d = Domain::empty();
        if a {
            d |= Domain::USER_AGENT;
        }
        if b {
            d |= Domain::OS;
        }
        if c {
            d |= Domain::DEVICE;
        }
        d
    })
}

proptest! {
    /// Resolving twice with the same input and request set is
    /// idempotent: no hidden state leaks between calls.
    #[test]
    fn resolve_is_idempotent(ua in ua_strategy(), requested in domain_strategy()) {
        let resolver = BasicResolver::new(sample_ruleset());
        let a = resolver.resolve(&ua, requested);
        let b = resolver.resolve(&ua, requested);
        prop_assert_eq!(a.user_agent, b.user_agent);
        prop_assert_eq!(a.os, b.os);
        prop_assert_eq!(a.device, b.device);
    }

    /// Widening the requested set never changes the facets already
    /// covered by the narrower request.
    #[test]
    fn widening_request_preserves_prior_facets(ua in ua_strategy(), requested in domain_strategy()) {
        let resolver = BasicResolver::new(sample_ruleset());
        let narrow = resolver.resolve(&ua, requested);
        let wide = resolver.resolve(&ua, Domain::all());

        if requested.contains(Domain::USER_AGENT) {
            prop_assert_eq!(narrow.user_agent, wide.user_agent);
        }
        if requested.contains(Domain::OS) {
            prop_assert_eq!(narrow.os, wide.os);
        }
        if requested.contains(Domain::DEVICE) {
            prop_assert_eq!(narrow.device, wide.device);
        }
    }

    /// A caching resolver must be transparent: it returns exactly what
    /// the base resolver would, for any sequence of requested domains.
    #[test]
    fn cache_is_transparent(ua in ua_strategy(), first in domain_strategy(), second in domain_strategy()) {
        let base = BasicResolver::new(sample_ruleset());
        let cached = CachingResolver::new(
            Box::new(BasicResolver::new(sample_ruleset())),
            Lru::new(NonZeroUsize::new(64).unwrap()),
        );

        let direct_first = base.resolve(&ua, first);
        let via_cache_first = cached.resolve(&ua, first);
        prop_assert_eq!(direct_first.user_agent, via_cache_first.user_agent);
        prop_assert_eq!(direct_first.os, via_cache_first.os);
        prop_assert_eq!(direct_first.device, via_cache_first.device);

        let direct_second = base.resolve(&ua, second);
        let via_cache_second = cached.resolve(&ua, second);
        prop_assert_eq!(direct_second.user_agent, via_cache_second.user_agent);
        prop_assert_eq!(direct_second.os, via_cache_second.os);
        prop_assert_eq!(direct_second.device, via_cache_second.device);
    }

    /// Every eviction policy keeps the cache within its configured
    /// bound no matter how many distinct keys are pushed through it —
    /// including small capacities, where a naive split of an eviction
    /// policy's internal queues can quietly add up to more than the
    /// requested total.
    #[test]
    fn every_policy_stays_bounded(
        keys in prop::collection::vec(any::<u16>(), 0..300),
        capacity in 1usize..17,
    ) {
        let capacity = NonZeroUsize::new(capacity).unwrap();
        let resolver = BasicResolver::new(sample_ruleset());

        let lru = CachingResolver::new(Box::new(BasicResolver::new(sample_ruleset())), Lru::new(capacity));
        let sieve = CachingResolver::new(Box::new(BasicResolver::new(sample_ruleset())), Sieve::new(capacity));
        let s3fifo = CachingResolver::new(Box::new(BasicResolver::new(sample_ruleset())), S3Fifo::new(capacity));

        for k in &keys {
            let ua = format!("Chrome/{k}.0 unique");
            lru.resolve(&ua, Domain::all());
            sieve.resolve(&ua, Domain::all());
            s3fifo.resolve(&ua, Domain::all());
            let _ = resolver.resolve(&ua, Domain::all());
        }

        prop_assert!(lru.cache_len() <= capacity.get());
        prop_assert!(sieve.cache_len() <= capacity.get());
        prop_assert!(s3fifo.cache_len() <= capacity.get());
    }

    /// `with_defaults` round-trips: every facet is either the real
    /// match or the documented "Other" sentinel, never left unset.
    #[test]
    fn with_defaults_never_panics_for_full_request(ua in ua_strategy()) {
        let resolver = BasicResolver::new(sample_ruleset());
        let result = resolver.resolve(&ua, Domain::all()).with_defaults();
        prop_assert!(!result.user_agent.family.is_empty());
        prop_assert!(!result.os.family.is_empty());
        prop_assert!(!result.device.family.is_empty());
    }
}
