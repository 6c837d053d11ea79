use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Definition, Entry};

/// Marker line opening the entry section.
pub const BEGIN_TABLE: &str = "BEGIN_TABLE";
/// Marker line closing the entry section.
pub const END_TABLE: &str = "END_TABLE";

/// A parsed table text: head lines, entries, tail lines.
///
/// The reader is a three-phase line scanner: everything up to and
/// including the `BEGIN_TABLE` line is head, rows up to `END_TABLE` are
/// entries, the rest is tail. A missing `END_TABLE` is tolerated (the
/// entries run to end of input and the tail is empty); a missing
/// `BEGIN_TABLE` is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    /// Head lines with their original line endings, `BEGIN_TABLE` included.
    pub head: Vec<String>,
    /// Table entries in source order.
    pub entries: Vec<Entry>,
    /// Tail lines with their original line endings, `END_TABLE` included.
    pub tail: Vec<String>,
    definition: Definition,
}

impl TableSource {
    /// Parse a full table text.
    ///
    /// Head and tail lines keep their original endings (LF or CRLF) so
    /// that `render` reproduces them verbatim; entry rows are re-rendered
    /// with LF.
    pub fn parse(text: &str) -> Result<Self> {
        let mut head = Vec::new();
        let mut entries = Vec::new();
        let mut tail = Vec::new();

        let mut reading_head = true;
        let mut reading_table = true;

        for (index, line) in text.split_inclusive('\n').enumerate() {
            let line_number = index + 1;
            if reading_head {
                head.push(line.to_string());
                if line.starts_with(BEGIN_TABLE) {
                    reading_head = false;
                }
                continue;
            }
            if reading_table {
                if line.starts_with(END_TABLE) {
                    reading_table = false;
                    tail.push(line.to_string());
                    continue;
                }
                if line.trim().is_empty() {
                    continue;
                }
                entries.push(Entry::parse(line, line_number)?);
                continue;
            }
            tail.push(line.to_string());
        }

        if reading_head {
            return Err(Error::InvalidTable(format!(
                "no {BEGIN_TABLE} marker found"
            )));
        }

        let definition = Definition::from_head_lines(head.iter().map(String::as_str));
        definition.validate()?;

        Ok(Self {
            head,
            entries,
            tail,
            definition,
        })
    }

    /// Read and parse a table file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// The definition block parsed from the head.
    #[must_use]
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Table name from the definition, falling back to `fallback`.
    #[must_use]
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.definition.name().unwrap_or(fallback)
    }

    /// Sort entries into canonical order (code asc, weight desc, phrase
    /// code point asc).
    pub fn canonicalize(&mut self) {
        self.entries.sort_by(Entry::canonical_cmp);
    }

    /// Render the table back to text, entries in their current order.
    /// Head and tail lines come out byte for byte as they were read.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.head {
            out.push_str(line);
        }
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        for line in &self.tail {
            out.push_str(line);
        }
        out
    }

    /// Render and write the table to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}
