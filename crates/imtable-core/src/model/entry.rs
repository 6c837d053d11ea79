use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One row of a lookup table: a key sequence mapped to a phrase.
///
/// The text form is tab-separated: `code<TAB>phrase<TAB>weight`, with an
/// optional fourth comment column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The key sequence typed to produce the phrase.
    pub code: String,

    /// The phrase (usually one or more CJK characters).
    pub phrase: String,

    /// Selection weight; higher sorts earlier among candidates.
    pub weight: i64,

    /// Trailing comment column, preserved verbatim when present.
    pub comment: Option<String>,
}

impl Entry {
    #[must_use]
    pub fn new(code: impl Into<String>, phrase: impl Into<String>, weight: i64) -> Self {
        Self {
            code: code.into(),
            phrase: phrase.into(),
            weight,
            comment: None,
        }
    }

    /// Parse a table row. `line_number` is used for error reporting only.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let mut columns = line.trim_end_matches(['\n', '\r']).split('\t');
        let code = columns
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::parse(line_number, "missing code column"))?;
        let phrase = columns
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::parse(line_number, "missing phrase column"))?;
        let weight = columns
            .next()
            .ok_or_else(|| Error::parse(line_number, "missing weight column"))?;
        let weight: i64 = weight.trim().parse().map_err(|_| {
            Error::parse(line_number, format!("weight is not an integer: {weight:?}"))
        })?;
        let comment = columns.next().filter(|c| !c.is_empty()).map(String::from);

        Ok(Self {
            code: code.to_string(),
            phrase: phrase.to_string(),
            weight,
            comment,
        })
    }

    /// Canonical table order: code ascending, weight descending, then
    /// phrase by code point ascending.
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.code
            .cmp(&other.code)
            .then_with(|| other.weight.cmp(&self.weight))
            .then_with(|| self.phrase.cmp(&other.phrase))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(comment) => write!(
                f,
                "{}\t{}\t{}\t{}",
                self.code, self.phrase, self.weight, comment
            ),
            None => write!(f, "{}\t{}\t{}", self.code, self.phrase, self.weight),
        }
    }
}
