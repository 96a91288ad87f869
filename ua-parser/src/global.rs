//! Process-wide default parser.
//!
//! A single swappable [`Resolver`] lives behind a global cell so that
//! callers who don't need per-call control over which resolver or
//! ruleset to use can just call [`parse`] and friends. The cell starts
//! out lazily pointing at an empty [`BasicResolver`] (a [`Ruleset`]
//! with no rules, so every facet resolves to `none`); callers that
//! want real matching must install their own ruleset with
//! [`set_resolver`] before parsing anything meaningful — this crate
//! does not bundle rule data of its own.

use std::sync::{Arc, OnceLock, RwLock};

use crate::{BasicResolver, CompleteResult, Domain, Resolver};

static DEFAULT: OnceLock<RwLock<Arc<dyn Resolver>>> = OnceLock::new();

fn cell() -> &'static RwLock<Arc<dyn Resolver>> {
    DEFAULT.get_or_init(|| {
        tracing::debug!("initializing global resolver to an empty ruleset");
        RwLock::new(Arc::new(BasicResolver::new(crate::Ruleset::empty())))
    })
}

/// Replaces the process-wide default resolver. Takes effect for every
/// call to [`parse`]/[`parse_user_agent`]/[`parse_os`]/[`parse_device`]
/// made afterwards, from any thread; in-flight calls see either the
/// old or the new resolver, never a mix of the two.
pub fn set_resolver(resolver: Arc<dyn Resolver>) {
    tracing::info!("replacing global resolver");
    *cell()
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner) = resolver;
}

/// Returns the currently installed global resolver.
pub fn resolver() -> Arc<dyn Resolver> {
    cell()
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}

/// Resolves every facet of `ua` using the global resolver, substituting
/// defaults for anything unmatched.
pub fn parse(ua: &str) -> CompleteResult {
    resolver().resolve(ua, Domain::all()).with_defaults()
}

/// Resolves only the user agent facet of `ua` using the global
/// resolver.
pub fn parse_user_agent(ua: &str) -> Option<crate::user_agent::Value> {
    resolver().resolve(ua, Domain::USER_AGENT).user_agent
}

/// Resolves only the OS facet of `ua` using the global resolver.
pub fn parse_os(ua: &str) -> Option<crate::os::Value> {
    resolver().resolve(ua, Domain::OS).os
}

/// Resolves only the device facet of `ua` using the global resolver.
pub fn parse_device(ua: &str) -> Option<crate::device::Value> {
    resolver().resolve(ua, Domain::DEVICE).device
}
