use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The attribute block of a table head (`BEGIN_DEFINITION` … `END_DEFINITION`).
///
/// Attributes are `KEY = value` lines; keys may carry a locale suffix
/// (`NAME.zh_CN`). Source order and duplicates are preserved so that the
/// head can be re-rendered losslessly; typed accessors return the last
/// occurrence of a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    attributes: Vec<(String, String)>,
}

/// Marker lines of the definition block.
pub const BEGIN_DEFINITION: &str = "BEGIN_DEFINITION";
pub const END_DEFINITION: &str = "END_DEFINITION";

impl Definition {
    /// Extract the definition from head lines.
    ///
    /// Lines outside the `BEGIN_DEFINITION`/`END_DEFINITION` block and
    /// lines that are not `KEY = value` shaped are ignored; the head keeps
    /// them verbatim, the definition only indexes the attributes.
    #[must_use]
    pub fn from_head_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut attributes = Vec::new();
        let mut in_block = false;
        for line in lines {
            let line = line.trim_end_matches(['\n', '\r']);
            if line.starts_with(BEGIN_DEFINITION) {
                in_block = true;
                continue;
            }
            if line.starts_with(END_DEFINITION) {
                in_block = false;
                continue;
            }
            if !in_block {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    attributes.push((key.to_string(), value.trim().to_string()));
                }
            }
        }
        Self { attributes }
    }

    /// Last value recorded for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in source order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// The table's symbolic name (`NAME`, without locale suffix).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get("NAME")
    }

    /// Alphabet the codes may use (`VALID_INPUT_CHARS`).
    #[must_use]
    pub fn valid_input_chars(&self) -> Option<&str> {
        self.get("VALID_INPUT_CHARS")
    }

    /// Maximum code length (`MAX_KEY_LENGTH`).
    ///
    /// `None` when the attribute is absent. [`Definition::validate`]
    /// rejects values that are present but not integers.
    #[must_use]
    pub fn max_key_length(&self) -> Option<usize> {
        self.get("MAX_KEY_LENGTH").and_then(|v| v.parse().ok())
    }

    /// Check that numeric attributes are well-formed.
    ///
    /// `MAX_KEY_LENGTH`, when present, must parse as an unsigned integer.
    pub fn validate(&self) -> Result<()> {
        if let Some(raw) = self.get("MAX_KEY_LENGTH") {
            if raw.parse::<usize>().is_err() {
                return Err(Error::InvalidTable(format!(
                    "MAX_KEY_LENGTH is not an integer: {raw:?}"
                )));
            }
        }
        Ok(())
    }
}
