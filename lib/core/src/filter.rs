// Keyword-triggered attribute filtering over the store catalog.
//
// Each rule pairs a keyword set with one equality-style condition. A rule
// fires when any keyword is a substring of the raw query (no token
// boundaries, so "광주" also fires inside "경기 광주"). Fired rules are
// applied left to right as a conjunction; rules that do not fire impose
// nothing.

use crate::candidate::Candidate;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

static DEFAULT_RULES: &str = include_str!("../rules/default_rules.toml");

/// Narrows the catalog for a raw query. Output is always a subset of the
/// input, in input order, and may be empty.
pub trait CandidateFilter: Send + Sync {
    fn filter<'a>(&self, query: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// `store_type` equals the value
    StoreType(String),
    /// Address contains the value as a substring
    AddressContains(String),
    /// Named boolean flag equals `equals`; a store without the flag fails
    Flag { field: String, equals: bool },
}

impl Condition {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        match self {
            Condition::StoreType(expected) => candidate.store_type == *expected,
            Condition::AddressContains(needle) => candidate.address.contains(needle.as_str()),
            Condition::Flag { field, equals } => candidate.flag(field) == Some(*equals),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub keywords: Vec<String>,
    pub condition: Condition,
}

impl FilterRule {
    pub fn new<I, S>(keywords: I, condition: Condition) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            condition,
        }
    }

    #[inline]
    pub fn is_triggered(&self, query: &str) -> bool {
        self.keywords.iter().any(|k| query.contains(k.as_str()))
    }
}

/// Ordered list of filter rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    rules: Vec<FilterRule>,
}

#[derive(Deserialize)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RawRule>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    keywords: Vec<String>,
    store_type: Option<String>,
    address_contains: Option<String>,
    field: Option<String>,
    equals: Option<bool>,
}

impl RawRule {
    fn into_rule(self, index: usize) -> Result<FilterRule> {
        let invalid = |reason: &str| Error::InvalidRule {
            index,
            reason: reason.to_string(),
        };

        if self.keywords.is_empty() {
            return Err(invalid("keywords must be non-empty"));
        }
        if self.keywords.iter().any(|k| k.is_empty()) {
            return Err(invalid("keywords must not contain empty strings"));
        }

        let condition = match (self.store_type, self.address_contains, self.field, self.equals) {
            (Some(value), None, None, None) => Condition::StoreType(value),
            (None, Some(value), None, None) if !value.is_empty() => {
                Condition::AddressContains(value)
            }
            (None, None, Some(field), Some(equals)) if !field.is_empty() => {
                Condition::Flag { field, equals }
            }
            _ => {
                return Err(invalid(
                    "exactly one of store_type, address_contains or field+equals is required",
                ))
            }
        };

        Ok(FilterRule {
            keywords: self.keywords,
            condition,
        })
    }
}

impl RuleTable {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self { rules }
    }

    /// Rule table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(raw)?;
        let rules = file
            .rules
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.into_rule(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules fired by `query`, in table order
    pub fn triggered<'r>(&'r self, query: &'r str) -> impl Iterator<Item = &'r FilterRule> + 'r {
        self.rules.iter().filter(move |r| r.is_triggered(query))
    }
}

impl CandidateFilter for RuleTable {
    fn filter<'a>(&self, query: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
        let mut working: Vec<&'a Candidate> = candidates.iter().collect();
        for rule in self.triggered(query) {
            working.retain(|c| rule.condition.matches(c));
            tracing::trace!(
                condition = ?rule.condition,
                remaining = working.len(),
                "Filter rule applied"
            );
        }
        working
    }
}
