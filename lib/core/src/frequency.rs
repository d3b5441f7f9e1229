//! Per-store token frequency tables.
//!
//! The catalog stores each table as a serialized mapping literal. Both the
//! single-quoted dict form (`{'커피': 3, '주차': 1}`) and JSON objects are
//! accepted. Counts must be non-negative integers.

use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ordered token -> occurrence count mapping.
///
/// Order is the order tokens appear in the source literal; a repeated key
/// keeps its first position and takes the last count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<(String, u32)>", into = "Vec<(String, u32)>")]
pub struct FrequencyTable {
    entries: Vec<(String, u32)>,
    /// token -> position in `entries`
    index: AHashMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `token` to `count`, replacing any earlier count.
    pub fn insert(&mut self, token: impl Into<String>, count: u32) {
        let token = token.into();
        match self.index.get(&token) {
            Some(&at) => self.entries[at].1 = count,
            None => {
                self.index.insert(token.clone(), self.entries.len());
                self.entries.push((token, count));
            }
        }
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).map(|&at| self.entries[at].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| u64::from(*c)).sum()
    }
}

impl PartialEq for FrequencyTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for FrequencyTable {}

impl<S: Into<String>> FromIterator<(S, u32)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (token, count) in iter {
            table.insert(token, count);
        }
        table
    }
}

impl From<Vec<(String, u32)>> for FrequencyTable {
    fn from(entries: Vec<(String, u32)>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<FrequencyTable> for Vec<(String, u32)> {
    fn from(table: FrequencyTable) -> Self {
        table.entries
    }
}

impl FromStr for FrequencyTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Parser::new(s).parse_table()
    }
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    src: &'a str,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            src,
        }
    }

    fn fail<T>(&self, what: impl Into<String>) -> Result<T> {
        Err(Error::MalformedFrequency(what.into()))
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        self.skip_ws();
        match self.chars.next() {
            Some((_, c)) if c == want => Ok(()),
            Some((at, c)) => {
                self.fail(format!("expected '{}' at byte {}, found '{}'", want, at, c))
            }
            None => self.fail(format!("expected '{}', found end of input", want)),
        }
    }

    fn parse_table(mut self) -> Result<FrequencyTable> {
        let mut table = FrequencyTable::new();
        self.expect('{')?;

        loop {
            self.skip_ws();
            match self.chars.peek() {
                Some((_, '}')) => {
                    self.chars.next();
                    break;
                }
                Some(_) => {}
                None => return self.fail("unterminated mapping"),
            }

            let key = self.parse_string()?;
            self.expect(':')?;
            let count = self.parse_count()?;
            table.insert(key, count);

            self.skip_ws();
            match self.chars.next() {
                Some((_, ',')) => continue,
                Some((_, '}')) => break,
                Some((at, c)) => {
                    return self.fail(format!("expected ',' or '}}' at byte {}, found '{}'", at, c))
                }
                None => return self.fail("unterminated mapping"),
            }
        }

        self.skip_ws();
        if let Some(&(at, _)) = self.chars.peek() {
            return self.fail(format!("trailing input at byte {}: {:?}", at, &self.src[at..]));
        }
        Ok(table)
    }

    fn parse_string(&mut self) -> Result<String> {
        self.skip_ws();
        let quote = match self.chars.next() {
            Some((_, q @ ('\'' | '"'))) => q,
            Some((at, c)) => {
                return self.fail(format!("expected quoted key at byte {}, found '{}'", at, c))
            }
            None => return self.fail("expected quoted key, found end of input"),
        };

        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == quote => return Ok(out),
                Some((_, '\\')) => out.push(self.parse_escape()?),
                Some((_, c)) => out.push(c),
                None => return self.fail("unterminated string"),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char> {
        match self.chars.next() {
            Some((_, 'n')) => Ok('\n'),
            Some((_, 't')) => Ok('\t'),
            Some((_, 'r')) => Ok('\r'),
            Some((_, c @ ('\\' | '\'' | '"' | '/'))) => Ok(c),
            Some((_, 'u')) => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .chars
                        .next()
                        .and_then(|(_, c)| c.to_digit(16));
                    match digit {
                        Some(d) => code = code * 16 + d,
                        None => return self.fail("invalid \\u escape"),
                    }
                }
                match char::from_u32(code) {
                    Some(c) => Ok(c),
                    None => self.fail(format!("invalid code point U+{:04X}", code)),
                }
            }
            Some((at, c)) => self.fail(format!("unknown escape '\\{}' at byte {}", c, at)),
            None => self.fail("dangling escape"),
        }
    }

    fn parse_count(&mut self) -> Result<u32> {
        self.skip_ws();
        let start = match self.chars.peek() {
            Some((at, _)) => *at,
            None => return self.fail("expected count, found end of input"),
        };
        let mut end = start;
        while let Some((at, c)) = self.chars.peek() {
            if c.is_ascii_digit() || *c == '-' || *c == '+' || *c == '.' {
                end = *at + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }

        let raw = &self.src[start..end];
        if raw.starts_with('-') {
            return self.fail(format!("negative count {}", raw));
        }
        match raw.parse::<u32>() {
            Ok(count) => Ok(count),
            Err(_) => self.fail(format!("invalid count {:?} at byte {}", raw, start)),
        }
    }
}
