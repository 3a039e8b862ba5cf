//! Include/exclude rules and the predicate that evaluates them.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

/// A single selection rule.
#[derive(Clone)]
pub enum MatchRule {
    /// The name must equal this string.
    Exact(String),
    /// The name must match this regular expression.
    Pattern(Regex),
    /// The name must be one of these strings.
    Set(HashSet<String>),
    /// A configured rule whose shape was not understood. Never matches.
    Unrecognized(String),
}

impl MatchRule {
    pub fn exact(name: impl Into<String>) -> Self {
        MatchRule::Exact(name.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(MatchRule::Pattern)
    }

    pub fn set<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MatchRule::Set(names.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Exact(s) => f.debug_tuple("Exact").field(s).finish(),
            MatchRule::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            MatchRule::Set(set) => {
                let mut names: Vec<_> = set.iter().collect();
                names.sort();
                f.debug_tuple("Set").field(&names).finish()
            }
            MatchRule::Unrecognized(desc) => f.debug_tuple("Unrecognized").field(desc).finish(),
        }
    }
}

/// Whether `name` satisfies `rule`. An absent or unrecognized rule never matches.
pub fn matches(name: &str, rule: Option<&MatchRule>) -> bool {
    match rule {
        Some(MatchRule::Exact(expected)) => name == expected,
        Some(MatchRule::Pattern(re)) => re.is_match(name),
        Some(MatchRule::Set(names)) => names.contains(name),
        Some(MatchRule::Unrecognized(_)) | None => false,
    }
}
