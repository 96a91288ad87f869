use crate::{device, os, user_agent, Domain};

/// Result of resolving a UA string against a requested [`Domain`].
///
/// A facet set to `None` means either "not requested" or "requested
/// but no rule matched it" — `requested` disambiguates the two.
#[derive(Clone, Debug)]
pub struct PartialResult {
    /// Facets the caller asked to have resolved.
    pub requested: Domain,
    /// User agent facet, if requested and matched.
    pub user_agent: Option<user_agent::Value>,
    /// OS facet, if requested and matched.
    pub os: Option<os::Value>,
    /// Device facet, if requested and matched.
    pub device: Option<device::Value>,
    /// The original UA string this result was resolved from.
    pub string: String,
}

impl PartialResult {
    /// A result carrying no facets, as if `requested` had been empty.
    pub fn empty(ua: &str) -> Self {
        Self {
            requested: Domain::empty(),
            user_agent: None,
            os: None,
            device: None,
            string: ua.to_string(),
        }
    }

    /// Returns a copy restricted to `requested`: facets outside it are
    /// cleared and `requested` is overwritten with the new set. Used
    /// by the caching resolver to serve a narrower view of a broader
    /// cached result.
    pub fn narrowed(&self, requested: Domain) -> Self {
        Self {
            requested,
            user_agent: requested
                .contains(Domain::USER_AGENT)
                .then(|| self.user_agent.clone())
                .flatten(),
            os: requested
                .contains(Domain::OS)
                .then(|| self.os.clone())
                .flatten(),
            device: requested
                .contains(Domain::DEVICE)
                .then(|| self.device.clone())
                .flatten(),
            string: self.string.clone(),
        }
    }

    /// Merges `other` (freshly resolved for the facets `self` was
    /// missing) into `self`, preferring `self`'s value for any facet
    /// it already had requested — including a `None` facet, which is
    /// itself an authoritative "no rule matched" result, not a hole to
    /// fill in. The merged `requested` is the union of both.
    pub fn merge(mut self, other: PartialResult) -> Self {
        if !self.requested.contains(Domain::USER_AGENT) {
            self.user_agent = other.user_agent;
        }
        if !self.requested.contains(Domain::OS) {
            self.os = other.os;
        }
        if !self.requested.contains(Domain::DEVICE) {
            self.device = other.device;
        }
        self.requested = self.requested.union(other.requested);
        self
    }

    /// Substitutes the per-facet default sentinel (family `"Other"`,
    /// no brand/model/version) for any facet that is `None`.
    ///
    /// # Panics
    ///
    /// Panics if `requested` is not [`Domain::all`] — defaulting a
    /// facet that was never requested would silently manufacture data
    /// the caller didn't ask for and can't distinguish from a real
    /// match, which is a contract violation rather than a recoverable
    /// error (see spec §6/§7).
    pub fn with_defaults(self) -> CompleteResult {
        assert!(
            self.requested.is_all(),
            "with_defaults requires every facet to have been requested, got {:?}",
            self.requested
        );
        CompleteResult {
            user_agent: self.user_agent.unwrap_or_default(),
            os: self.os.unwrap_or_default(),
            device: self.device.unwrap_or_default(),
            string: self.string,
        }
    }
}

/// Result of resolving a UA string against all three facets, with
/// defaults substituted for anything unmatched. Produced only by
/// [`PartialResult::with_defaults`].
#[derive(Clone, Debug)]
pub struct CompleteResult {
    /// User agent facet, defaulted if unmatched.
    pub user_agent: user_agent::Value,
    /// OS facet, defaulted if unmatched.
    pub os: os::Value,
    /// Device facet, defaulted if unmatched.
    pub device: device::Value,
    /// The original UA string this result was resolved from.
    pub string: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn with_defaults_round_trip() {
        let r = PartialResult {
            requested: Domain::all(),
            user_agent: None,
            os: Some(os::Value {
                family: "Linux".to_string(),
                major: None,
                minor: None,
                patch: None,
                patch_minor: None,
            }),
            device: None,
            string: "ua".to_string(),
        };
        let c = r.with_defaults();
        assert_eq!(c.user_agent.family, "Other");
        assert_eq!(c.os.family, "Linux");
        assert_eq!(c.device.family, "Other");
        assert_eq!(c.string, "ua");
    }

    #[test]
    #[should_panic]
    fn with_defaults_panics_if_not_all_requested() {
        PartialResult::empty("ua").with_defaults();
    }

    #[test]
    fn merge_prefers_cached_negative_result() {
        let cached = PartialResult {
            requested: Domain::USER_AGENT,
            user_agent: None,
            os: None,
            device: None,
            string: "ua".to_string(),
        };
        let fresh = PartialResult {
            requested: Domain::USER_AGENT | Domain::OS,
            user_agent: Some(user_agent::Value {
                family: "ShouldNotWin".to_string(),
                major: None,
                minor: None,
                patch: None,
                patch_minor: None,
            }),
            os: Some(os::Value {
                family: "Windows".to_string(),
                major: None,
                minor: None,
                patch: None,
                patch_minor: None,
            }),
            device: None,
            string: "ua".to_string(),
        };
        let merged = cached.merge(fresh);
        assert_eq!(merged.user_agent, None);
        assert_eq!(merged.os.unwrap().family, "Windows");
        assert_eq!(merged.requested, Domain::all() & !Domain::DEVICE);
    }

    #[test]
    fn narrowed_clears_unrequested_facets() {
        let full = PartialResult {
            requested: Domain::all(),
            user_agent: Some(user_agent::Value::default()),
            os: Some(os::Value::default()),
            device: Some(device::Value::default()),
            string: "ua".to_string(),
        };
        let narrow = full.narrowed(Domain::OS);
        assert_eq!(narrow.requested, Domain::OS);
        assert!(narrow.user_agent.is_none());
        assert!(narrow.device.is_none());
        assert!(narrow.os.is_some());
    }
}
