//! Compiled rule lists for all three facets, built once and shared
//! read-only across threads (§3 "Lifecycle").

use crate::{device, os, user_agent, Error, Regexes};

/// Three ordered matcher lists, one per facet. Order is significant:
/// matchers are evaluated in sequence and the first match wins for
/// that facet. Immutable after construction.
pub struct Ruleset {
    pub(crate) user_agent: user_agent::Matchers,
    pub(crate) os: os::Matchers,
    pub(crate) device: device::Matchers,
}

impl Ruleset {
    /// A ruleset with no rules for any facet: resolving against it
    /// always returns `none` for every requested facet.
    pub fn empty() -> Self {
        Self {
            user_agent: user_agent::Matchers::empty(),
            os: os::Matchers::empty(),
            device: device::Matchers::empty(),
        }
    }

    /// Number of rules loaded per facet, in `(user_agent, os, device)`
    /// order.
    pub fn len(&self) -> (usize, usize, usize) {
        (
            self.user_agent.len(),
            self.os.len(),
            self.device.len(),
        )
    }
}

impl TryFrom<Regexes> for Ruleset {
    type Error = Error;

    fn try_from(r: Regexes) -> Result<Self, Error> {
        let ua = r
            .user_agent_parsers
            .into_iter()
            .try_fold(user_agent::Builder::new(), |b, p| b.push(p))?
            .build()?;
        tracing::debug!(rules = ua.len(), facet = "user_agent", "compiled matchers");
        let os = r
            .os_parsers
            .into_iter()
            .try_fold(os::Builder::new(), |b, p| b.push(p))?
            .build()?;
        tracing::debug!(rules = os.len(), facet = "os", "compiled matchers");
        let dev = r
            .device_parsers
            .into_iter()
            .try_fold(device::Builder::new(), |b, p| b.push(p))?
            .build()?;
        tracing::debug!(rules = dev.len(), facet = "device", "compiled matchers");
        Ok(Ruleset {
            user_agent: ua,
            os,
            device: dev,
        })
    }
}
