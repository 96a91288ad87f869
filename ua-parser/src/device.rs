//! Device matching.

use serde::Deserialize;

use crate::template::{OptResolver, Resolver};

/// Regex flags recognised on a device rule.
#[derive(Deserialize, PartialEq, Eq, Clone, Copy, Debug)]
pub enum Flag {
    /// Enables case-insensitive regex matching, deserializes from the
    /// string `"i"`. Affects pattern matching only, never template
    /// substitution.
    #[serde(rename = "i")]
    IgnoreCase,
}

/// Device rule record.
#[derive(Deserialize, Default, Clone)]
pub struct Parser {
    /// Regex pattern used for matching and extraction.
    pub regex: String,
    /// Regex flags, if any.
    pub regex_flag: Option<Flag>,
    /// Device replacement, fully templated. Must be present *or* the
    /// regex must have at least one capture group, used instead.
    pub device_replacement: Option<String>,
    /// Brand replacement, fully templated, optional; if missing there
    /// is no fallback (unlike the other fields, brand has no implicit
    /// capture-group default).
    pub brand_replacement: Option<String>,
    /// Model replacement, fully templated, optional; if missing falls
    /// back to the first capture group.
    pub model_replacement: Option<String>,
}

type Repl = (Resolver, OptResolver, OptResolver);

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

    /// Add a rule, fails if the regex is invalid.
    pub fn push(mut self, device: Parser) -> Result<Self, regex_filtered::ParseError> {
        self.builder = self.builder.push_opt(
            &crate::rewrite_regex(&device.regex),
            regex_filtered::Options::new()
                .case_insensitive(device.regex_flag == Some(Flag::IgnoreCase)),
        )?;
        let r = &self.builder.regexes()[self.builder.regexes().len() - 1];
        let groups = r.captures_len() - 1;
        self.repl.push((
            Resolver::new(device.device_replacement, groups, 1),
            // brand has no capture-group fallback (idx = 999 is never reachable)
            OptResolver::new(device.brand_replacement, 0, 999),
            OptResolver::new(device.model_replacement, groups, 1),
        ));
        Ok(self)
    }

    /// Bulk loading of rules into the builder.
    pub fn push_all<I>(self, device: I) -> Result<Self, regex_filtered::ParseError>
    where
        I: IntoIterator<Item = Parser>,
    {
        device.into_iter().try_fold(self, |s, p| s.push(p))
    }
}

/// Compiled, ordered device rule list.
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
        let (d, brand, model) = &self.repl[idx];
        Value {
            family: d.resolve(c),
            brand: brand.resolve(c),
            model: model.resolve(c),
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

    /// Prefiltered lookup, first candidate wins. The prefilter's case
    /// sensitivity follows each rule's own [`Flag::IgnoreCase`], set
    /// when the rule was pushed.
    pub fn extract_filtered(&self, ua: &str) -> Option<Value> {
        let (idx, re) = self.matcher.matching(ua).next()?;
        let c = re.captures(ua)?;
        Some(self.extract_at(idx, &c))
    }
}

/// Extracted device data.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Value {
    /// Device family, e.g. `"iPhone"`.
    pub family: String,
    /// Device brand, e.g. `"Apple"`.
    pub brand: Option<String>,
    /// Device model, e.g. `"iPhone"`.
    pub model: Option<String>,
}

impl Default for Value {
    /// The per-facet default sentinel used by [`crate::PartialResult::with_defaults`].
    fn default() -> Self {
        Self {
            family: "Other".to_string(),
            brand: None,
            model: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn case_insensitive_matches_but_templates_stay_verbatim() {
        let m = Builder::new()
            .push(Parser {
                regex: "iPhone".to_string(),
                regex_flag: Some(Flag::IgnoreCase),
                device_replacement: Some("iPhone".to_string()),
                brand_replacement: Some("Apple".to_string()),
                model_replacement: Some("iPhone".to_string()),
            })
            .unwrap()
            .build()
            .unwrap();

        let v = m.extract_filtered("iphone").unwrap();
        assert_eq!(v.family, "iPhone");
        assert_eq!(v.brand.as_deref(), Some("Apple"));
        assert_eq!(v.model.as_deref(), Some("iPhone"));
    }

    #[test]
    fn brand_has_no_capture_fallback() {
        let m = Builder::new()
            .push(Parser {
                regex: r"(Pixel \d+)".to_string(),
                ..Default::default()
            })
            .unwrap()
            .build()
            .unwrap();

        let v = m.extract_filtered("Pixel 8").unwrap();
        assert_eq!(v.family, "Pixel 8");
        assert_eq!(v.brand, None);
        assert_eq!(v.model.as_deref(), Some("Pixel 8"));
    }
}
