//! Base resolvers: orchestrators that own a full [`Ruleset`] and
//! return the first match per requested facet.

use std::sync::Arc;

use crate::{Domain, PartialResult, Ruleset};

/// The universal resolver protocol. Every layer of the pipeline —
/// basic, regex-set, caching, thread-local, or a caller's own wrapper
/// — speaks this one interface, so composition is by wrapping rather
/// than inheritance.
///
/// Implementations MUST return at least the facets in `requested`;
/// they MAY return more if computationally free. They MUST carry the
/// requested facet set on the returned [`PartialResult`] so callers
/// can distinguish "not requested" from "requested but unmatched".
pub trait Resolver: Send + Sync {
    /// Resolves `ua` against `requested`, returning at least those
    /// facets (`none` where no rule matched).
    fn resolve(&self, ua: &str, requested: Domain) -> PartialResult;
}

/// Linear base resolver: for each requested facet, scans its matcher
/// list in order and stops at the first match. O(R) regex evaluations
/// per facet in the worst case — tolerable only with a caching layer
/// in front (see [`crate::cache::CachingResolver`]).
pub struct BasicResolver {
    ruleset: Arc<Ruleset>,
}

impl BasicResolver {
    /// Builds a resolver over `ruleset`.
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset: Arc::new(ruleset),
        }
    }

    /// Builds a resolver sharing an existing `ruleset`.
    pub fn from_arc(ruleset: Arc<Ruleset>) -> Self {
        Self { ruleset }
    }
}

impl Resolver for BasicResolver {
    fn resolve(&self, ua: &str, requested: Domain) -> PartialResult {
        PartialResult {
            requested,
            user_agent: requested
                .contains(Domain::USER_AGENT)
                .then(|| self.ruleset.user_agent.extract_linear(ua))
                .flatten(),
            os: requested
                .contains(Domain::OS)
                .then(|| self.ruleset.os.extract_linear(ua))
                .flatten(),
            device: requested
                .contains(Domain::DEVICE)
                .then(|| self.ruleset.device.extract_linear(ua))
                .flatten(),
            string: ua.to_string(),
        }
    }
}

/// Regex-set base resolver: for each requested facet, uses the
/// multi-pattern prefilter to narrow down candidate rules in a single
/// pass over the input before re-applying the winning rule's own
/// regex to extract capture groups. Sublinear in the number of rules
/// for typical inputs.
pub struct RegexSetResolver {
    ruleset: Arc<Ruleset>,
}

impl RegexSetResolver {
    /// Builds a resolver over `ruleset`.
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset: Arc::new(ruleset),
        }
    }

    /// Builds a resolver sharing an existing `ruleset`.
    pub fn from_arc(ruleset: Arc<Ruleset>) -> Self {
        Self { ruleset }
    }
}

impl Resolver for RegexSetResolver {
    fn resolve(&self, ua: &str, requested: Domain) -> PartialResult {
        PartialResult {
            requested,
            user_agent: requested
                .contains(Domain::USER_AGENT)
                .then(|| self.ruleset.user_agent.extract_filtered(ua))
                .flatten(),
            os: requested
                .contains(Domain::OS)
                .then(|| self.ruleset.os.extract_filtered(ua))
                .flatten(),
            device: requested
                .contains(Domain::DEVICE)
                .then(|| self.ruleset.device.extract_filtered(ua))
                .flatten(),
            string: ua.to_string(),
        }
    }
}
