#![deny(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::empty_docs)]
#![doc = include_str!("../README.md")]

pub use regex_filtered::{BuildError, ParseError};

mod domain;
mod template;

pub mod cache;
pub mod device;
pub mod global;
pub mod os;
pub mod resolver;
pub mod result;
pub mod ruleset;
pub mod user_agent;

pub use cache::{Cache, CachingResolver};
pub use domain::Domain;
pub use resolver::{BasicResolver, RegexSetResolver, Resolver};
pub use result::{CompleteResult, PartialResult};
pub use ruleset::Ruleset;

/// Error produced while compiling a [`Regexes`] into a [`Ruleset`], or
/// any of its three facet builders individually.
#[derive(Debug)]
pub enum Error {
    /// One of the input regexes could not be parsed or processed.
    ParseError(ParseError),
    /// One of the prefilters could not be built.
    BuildError(BuildError),
    /// A replacement template requires a group missing from the regex.
    MissingGroup(usize),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ParseError(p) => Some(p),
            Error::BuildError(b) => Some(b),
            Error::MissingGroup(_) => None,
        }
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Self::ParseError(value)
    }
}
impl From<BuildError> for Error {
    fn from(value: BuildError) -> Self {
        Self::BuildError(value)
    }
}

/// Deserialization target for the three facets' rule lists, shaped to
/// load directly from a `regexes.yaml`-style document (or any
/// serde-compatible source built up programmatically).
///
/// Compile with [`Regexes::compile`] to get a [`Ruleset`] ready to
/// hand to a [`BasicResolver`] or [`RegexSetResolver`].
#[derive(serde::Deserialize, Default)]
pub struct Regexes {
    /// User agent rules, evaluated in order, first match wins.
    pub user_agent_parsers: Vec<user_agent::Parser>,
    /// OS rules, evaluated in order, first match wins.
    pub os_parsers: Vec<os::Parser>,
    /// Device rules, evaluated in order, first match wins.
    pub device_parsers: Vec<device::Parser>,
}

impl Regexes {
    /// Compiles every facet's rule list into a [`Ruleset`]. Fails on
    /// the first invalid regex, unbuildable prefilter, or template
    /// referencing a capture group its regex doesn't have.
    pub fn compile(self) -> Result<Ruleset, Error> {
        self.try_into()
    }
}

/// Rewrites a regex's character classes to ascii and bounded
/// repetitions to unbounded, the second to reduce regex memory
/// requirements, and the first for both that and to better match the
/// (inferred) semantics intended for ua-parser.
fn rewrite_regex(re: &str) -> std::borrow::Cow<'_, str> {
    let mut from = 0;
    let mut out = String::new();

    let mut it = re.char_indices();
    let mut escape = false;
    let mut inclass = 0;
    'main: while let Some((idx, c)) = it.next() {
        match c {
            '\\' if !escape => {
                escape = true;
                continue;
            }
            '{' if !escape && inclass == 0 => {
                if idx == 0 {
                    // we're repeating nothing, this regex is broken, bail
                    return re.into();
                }
                // we don't need to loop, we only want to replace {0, ...} and {1, ...}
                let Some((_, start)) = it.next() else {
                    continue;
                };
                if start != '0' && start != '1' {
                    continue;
                }

                if !matches!(it.next(), Some((_, ','))) {
                    continue;
                }

                let mut digits = 0;
                for (ri, rc) in it.by_ref() {
                    match rc {
                        '}' if digits > 2 => {
                            // here idx is the index of the start of
                            // the range and ri is the end of range
                            out.push_str(&re[from..idx]);
                            from = ri + 1;
                            out.push_str(if start == '0' { "*" } else { "+" });
                            break;
                        }
                        c if c.is_ascii_digit() => {
                            digits += 1;
                        }
                        _ => continue 'main,
                    }
                }
            }
            '[' if !escape => {
                inclass += 1;
            }
            ']' if !escape => {
                inclass += 1;
            }
            // no need for special cases because regex allows nesting
            // character classes, whereas js or python don't \o/
            'd' if escape => {
                // idx is d so idx-1 is \\, and we want to exclude it
                out.push_str(&re[from..idx - 1]);
                from = idx + 1;
                out.push_str("[0-9]");
            }
            'D' if escape => {
                out.push_str(&re[from..idx - 1]);
                from = idx + 1;
                out.push_str("[^0-9]");
            }
            'w' if escape => {
                out.push_str(&re[from..idx - 1]);
                from = idx + 1;
                out.push_str("[A-Za-z0-9_]");
            }
            'W' if escape => {
                out.push_str(&re[from..idx - 1]);
                from = idx + 1;
                out.push_str("[^A-Za-z0-9_]");
            }
            _ => (),
        }
        escape = false;
    }

    if from == 0 {
        re.into()
    } else {
        out.push_str(&re[from..]);
        out.into()
    }
}
