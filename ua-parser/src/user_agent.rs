//! User agent matching.
//!
//! The user agent is the representation of the client (browser, app,
//! bot...), in UAP lingo the user agent is composed of a *family* (the
//! project name) and a *version* of up to 4 segments.

use serde::Deserialize;

use crate::template::{FamilyResolver, OptResolver};
use crate::Error;

/// Individual user agent rule record. Plain data, deserializable from
/// `regexes.yaml`-shaped input, or built literally.
#[derive(Deserialize, Default, Clone)]
pub struct Parser {
    /// Regex to check the UA against; if it matches, the rule applies.
    pub regex: String,
    /// If set, used for [`Value::family`]. If it contains a `$1`
    /// placeholder, that is replaced by the value of the first
    /// capture group. If unset, the first capture group is used
    /// directly.
    pub family_replacement: Option<String>,
    /// If set, provides [`Value::major`]; may contain `$1`-`$9`
    /// placeholders expanded against the match's capture groups.
    /// Otherwise the second capture group is used.
    pub v1_replacement: Option<String>,
    /// If set, provides [`Value::minor`], fully templated as above.
    /// Otherwise the third capture group is used.
    pub v2_replacement: Option<String>,
    /// If set, provides [`Value::patch`], fully templated as above.
    /// Otherwise the fourth capture group is used.
    pub v3_replacement: Option<String>,
    /// If set, provides [`Value::patch_minor`], fully templated as
    /// above. Otherwise the fifth capture group is used.
    pub v4_replacement: Option<String>,
}

type Repl = (FamilyResolver, OptResolver, OptResolver, OptResolver, OptResolver);

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

    /// Pushes a rule into the builder, fails if [`Parser::regex`] is
    /// invalid or a templated [`Parser::family_replacement`]
    /// references a group the regex does not have.
    pub fn push(mut self, ua: Parser) -> Result<Self, Error> {
        self.builder = self.builder.push(&crate::rewrite_regex(&ua.regex))?;
        let r = &self.builder.regexes()[self.builder.regexes().len() - 1];
        let groups = r.captures_len() - 1;
        self.repl.push((
            FamilyResolver::new(ua.family_replacement, groups)?,
            OptResolver::new(ua.v1_replacement, groups, 2),
            OptResolver::new(ua.v2_replacement, groups, 3),
            OptResolver::new(ua.v3_replacement, groups, 4),
            OptResolver::new(ua.v4_replacement, groups, 5),
        ));
        Ok(self)
    }

    /// Bulk loading of rules into the builder.
    pub fn push_all<I>(self, ua: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Parser>,
    {
        ua.into_iter().try_fold(self, |s, p| s.push(p))
    }
}

/// Compiled, ordered user agent rule list. Evaluating it against a UA
/// string is the job of a base resolver (linear or prefiltered), not
/// of this type itself — it only knows how to check and extract one
/// rule at a time.
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
        let (f, v1, v2, v3, v4) = &self.repl[idx];
        Value {
            family: f.resolve(c),
            major: v1.resolve(c),
            minor: v2.resolve(c),
            patch: v3.resolve(c),
            patch_minor: v4.resolve(c),
        }
    }

    /// Linear scan over the rules in order, applying the first one
    /// whose regex matches. Used by the basic (unfiltered) resolver.
    pub fn extract_linear(&self, ua: &str) -> Option<Value> {
        self.matcher
            .regexes()
            .iter()
            .enumerate()
            .find_map(|(idx, re)| re.captures(ua).map(|c| self.extract_at(idx, &c)))
    }

    /// Uses the multi-pattern prefilter to narrow down candidates
    /// before re-applying the winning rule's own regex to extract
    /// capture groups. Used by the regex-set resolver.
    pub fn extract_filtered(&self, ua: &str) -> Option<Value> {
        let (idx, re) = self.matcher.matching(ua).next()?;
        let c = re.captures(ua)?;
        Some(self.extract_at(idx, &c))
    }
}

/// Extracted user agent data.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Value {
    /// Client family, e.g. `"Chrome"`.
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
