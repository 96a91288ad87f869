/// Selects which facets a caller wants resolved: the user agent, the
/// OS, the device, or any union of the three. An empty set is a legal
/// "resolve nothing" request.
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Domain: u8 {
        /// The originating client (browser, app, bot...).
        const USER_AGENT = 1 << 0;
        /// The operating system.
        const OS = 1 << 1;
        /// The physical or virtual device.
        const DEVICE = 1 << 2;
    }
}

impl Default for Domain {
    /// The default is the empty set, matching [`bitflags`]' own
    /// convention; use [`Domain::all`] to request every facet.
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod test {
    use super::Domain;

    #[test]
    fn union_and_subset() {
        let ua_os = Domain::USER_AGENT | Domain::OS;
        assert!(ua_os.contains(Domain::USER_AGENT));
        assert!(ua_os.contains(Domain::OS));
        assert!(!ua_os.contains(Domain::DEVICE));
        assert!(Domain::all().contains(ua_os));
    }

    #[test]
    fn empty_is_legal() {
        assert!(Domain::empty().is_empty());
        assert_eq!(Domain::empty().iter().count(), 0);
    }

    #[test]
    fn difference() {
        let requested = Domain::all();
        let have = Domain::USER_AGENT;
        assert_eq!(requested.difference(have), Domain::OS | Domain::DEVICE);
    }
}
