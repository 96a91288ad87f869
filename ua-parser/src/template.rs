//! Template substitution helpers shared by the three matcher modules.
//!
//! A rule record supplies, per extractable field, either a literal
//! replacement (optionally containing `$1`-`$9` placeholders expanded
//! against the match's capture groups) or nothing, in which case a
//! default capture group is used instead. These small enums pick the
//! right strategy once, at load time, so matching is a flat dispatch
//! rather than a re-parse of the template on every call.

use regex::Captures;

fn get<'s>(c: &Captures<'s>, group: usize) -> Option<&'s str> {
    c.get(group).map(|g| g.as_str()).filter(|s| !s.is_empty())
}

// TODO: memchr-based scan if this shows up in profiles; rule sets are
// small enough today that it hasn't mattered.
fn has_substitution(s: &str) -> bool {
    std::iter::zip(s.as_bytes(), &s.as_bytes()[1..]).any(|(&d, n)| d == b'$' && n.is_ascii_digit())
}

/// Resolver with full templating: the template string can contain
/// `$1`-`$9` markers which get replaced by the corresponding captured
/// group.
///
/// - if there is a non-empty replacement template, it is expanded
///   against the capture groups, then trimmed; an empty result is
///   replaced by the empty string (never optional, see
///   [`OptResolver`] for the optional variant)
/// - otherwise falls back to a (possibly unmatched) capture group
/// - or the empty string (used when neither is available)
pub(crate) enum Resolver {
    Replacement(String),
    Capture(usize),
    Template(String),
}
impl Resolver {
    pub(crate) fn new(repl: Option<String>, groups: usize, idx: usize) -> Self {
        match repl.filter(|s| !s.trim().is_empty()) {
            Some(s) if has_substitution(&s) => Self::Template(s),
            Some(s) => Self::Replacement(s),
            None if groups >= idx => Self::Capture(idx),
            None => Self::Replacement(String::new()),
        }
    }

    pub(crate) fn resolve(&self, c: &Captures<'_>) -> String {
        match self {
            Self::Replacement(s) => s.clone(),
            Self::Capture(i) => get(c, *i).unwrap_or("").to_string(),
            Self::Template(t) => {
                let mut r = String::new();
                c.expand(t, &mut r);
                r.trim().to_string()
            }
        }
    }
}

/// Similar to [`Resolver`] but allows a [`None`] result (no fallback).
pub(crate) enum OptResolver {
    None,
    Replacement(String),
    Capture(usize),
    Template(String),
}
impl OptResolver {
    pub(crate) fn new(repl: Option<String>, groups: usize, idx: usize) -> Self {
        match repl.filter(|s| !s.trim().is_empty()) {
            Some(s) if has_substitution(&s) => Self::Template(s),
            Some(s) => Self::Replacement(s),
            None if groups >= idx => Self::Capture(idx),
            None => Self::None,
        }
    }

    pub(crate) fn resolve(&self, c: &Captures<'_>) -> Option<String> {
        match self {
            Self::None => None,
            Self::Replacement(s) => Some(s.clone()),
            Self::Capture(i) => get(c, *i).map(str::to_string),
            Self::Template(t) => {
                let mut r = String::new();
                c.expand(t, &mut r);
                let trimmed = r.trim();
                if trimmed.is_empty() {
                    None
                } else if trimmed.len() == r.len() {
                    Some(r)
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

/// Dedicated restrict-templated resolver for `UserAgent::family`:
/// supports templating in the replacement, but only for the `$1`
/// placeholder / group.
pub(crate) enum FamilyResolver {
    Capture,
    Replacement(String),
    Template(String),
}
impl FamilyResolver {
    pub(crate) fn new(repl: Option<String>, groups: usize) -> Result<Self, crate::Error> {
        match repl {
            Some(s) if s.contains("$1") => {
                if groups < 1 {
                    Err(crate::Error::MissingGroup(1))
                } else {
                    Ok(Self::Template(s))
                }
            }
            Some(s) if !s.is_empty() => Ok(Self::Replacement(s)),
            _ if groups >= 1 => Ok(Self::Capture),
            _ => Ok(Self::Replacement(String::new())),
        }
    }

    pub(crate) fn resolve(&self, c: &Captures<'_>) -> String {
        match self {
            Self::Capture => get(c, 1).unwrap_or("").to_string(),
            Self::Replacement(s) => s.clone(),
            Self::Template(t) => t.replace("$1", get(c, 1).unwrap_or("")),
        }
    }
}
