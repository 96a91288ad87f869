//! Operating system matching.

use serde::Deserialize;

use crate::template::{OptResolver, Resolver};

/// OS rule record.
#[derive(Deserialize, Default, Clone)]
pub struct Parser {
    /// Regex to check the UA against.
    pub regex: String,
    /// Replacement for [`Value::family`]. Must be set if [`Self::regex`]
    /// has no capture group; if there are captures, may be fully
    /// templated (with `$n` placeholders for any group).
    pub os_replacement: Option<String>,
    /// Replacement for [`Value::major`], may be fully templated.
    pub os_v1_replacement: Option<String>,
    /// Replacement for [`Value::minor`], may be fully templated.
    pub os_v2_replacement: Option<String>,
    /// Replacement for [`Value::patch`], may be fully templated.
    pub os_v3_replacement: Option<String>,
    /// Replacement for [`Value::patch_minor`], may be fully templated.
    pub os_v4_replacement: Option<String>,
}

type Repl = (Resolver, OptResolver, OptResolver, OptResolver, OptResolver);

/// Builder for [`Matchers`], pushed into in rule order.
#[derive(Default)]
pub struct Builder {
    builder: regex_filtered::Builder,
    repl: Vec<Repl>,
}
impl Builder {
    /// Initialise an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the pushed rules into [`Matchers`].
    pub fn build(self) -> Result<Matchers, regex_filtered::BuildError> {
        let Self { builder, repl } = self;
        Ok(Matchers {
            matcher: builder.build()?,
            repl,
        })
    }

    /// Add a rule, fails if [`Parser::regex`] is invalid. If
    /// [`Parser::os_replacement`] is missing and the regex has no
    /// capture group, the family resolves to the empty string for
    /// every match of that rule (same default-extraction convention
    /// as the other facets).
    pub fn push(mut self, os: Parser) -> Result<Self, regex_filtered::ParseError> {
        self.builder = self.builder.push(&crate::rewrite_regex(&os.regex))?;
        let r = &self.builder.regexes()[self.builder.regexes().len() - 1];
        let groups = r.captures_len() - 1;
        self.repl.push((
            Resolver::new(os.os_replacement, groups, 1),
            OptResolver::new(os.os_v1_replacement, groups, 2),
            OptResolver::new(os.os_v2_replacement, groups, 3),
            OptResolver::new(os.os_v3_replacement, groups, 4),
            OptResolver::new(os.os_v4_replacement, groups, 5),
        ));
        Ok(self)
    }

    /// Bulk loading of rules into the builder.
    pub fn push_all<I>(self, os: I) -> Result<Self, regex_filtered::ParseError>
    where
        I: IntoIterator<Item = Parser>,
    {
        os.into_iter().try_fold(self, |s, p| s.push(p))
    }
}

/// Compiled, ordered OS rule list.
pub struct Matchers {
    matcher: regex_filtered::Regexes,
    repl: Vec<Repl>,
}
impl Matchers {
    /// An empty rule list: matches nothing.
    pub fn empty() -> Self {
        Builder::new().build().expect("empty builder never fails")
    }

    /// Number of rules held.
    pub fn len(&self) -> usize {
        self.repl.len()
    }

    /// Whether the rule list is empty.
    pub fn is_empty(&self) -> bool {
        self.repl.is_empty()
    }

    fn extract_at(&self, idx: usize, c: &regex::Captures<'_>) -> Value {
        let (o, v1, v2, v3, v4) = &self.repl[idx];
        Value {
            family: o.resolve(c),
            major: v1.resolve(c),
            minor: v2.resolve(c),
            patch: v3.resolve(c),
            patch_minor: v4.resolve(c),
        }
    }

    /// Linear scan over the rules in order, first match wins.
    pub fn extract_linear(&self, ua: &str) -> Option<Value> {
        self.matcher
            .regexes()
            .iter()
            .enumerate()
            .find_map(|(idx, re)| re.captures(ua).map(|c| self.extract_at(idx, &c)))
    }

    /// Prefiltered lookup, first candidate wins.
    pub fn extract_filtered(&self, ua: &str) -> Option<Value> {
        let (idx, re) = self.matcher.matching(ua).next()?;
        let c = re.captures(ua)?;
        Some(self.extract_at(idx, &c))
    }
}

/// Extracted OS data.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Value {
    /// OS family, e.g. `"Mac OS X"`.
    pub family: String,
    /// Major version component.
    pub major: Option<String>,
    /// Minor version component.
    pub minor: Option<String>,
    /// Patch version component.
    pub patch: Option<String>,
    /// Patch-minor version component.
    pub patch_minor: Option<String>,
}

impl Default for Value {
    /// The per-facet default sentinel used by [`crate::PartialResult::with_defaults`].
    fn default() -> Self {
        Self {
            family: "Other".to_string(),
            major: None,
            minor: None,
            patch: None,
            patch_minor: None,
        }
    }
}
