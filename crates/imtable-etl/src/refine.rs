//! Refinement transforms for table texts.
//!
//! Standalone clean-up passes applied to a table before it is shipped:
//! duplicate rows are merged keeping the highest weight, and codes that
//! are shadowed by an `x`-prefixed variant of themselves are demoted so
//! the longer, more precise code wins candidate ordering.

use std::collections::HashMap;
use std::path::Path;

use imtable_core::model::{Entry, TableSource};

use crate::error::EtlResult;

/// Weight assigned to a demoted entry.
pub const DEMOTED_WEIGHT: i64 = 900;

const DEFAULT_VALID_INPUT_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Counts of what a refinement pass changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefineReport {
    /// Duplicate (code, phrase) rows collapsed into one.
    pub merged_duplicates: usize,
    /// Entries whose weight was lowered to [`DEMOTED_WEIGHT`].
    pub demoted: usize,
}

/// Apply the refinement transforms in place and re-sort the entries into
/// canonical order.
pub fn refine(source: &mut TableSource) -> RefineReport {
    let mut report = RefineReport::default();
    merge_duplicates(source, &mut report);
    demote_shadowed(source, &mut report);
    source.canonicalize();
    report
}

/// Read a table file, refine it, and write the result to `output`.
pub fn refine_file(input: &Path, output: &Path) -> EtlResult<RefineReport> {
    let mut source = TableSource::read(input)?;
    let report = refine(&mut source);
    source.write(output)?;
    Ok(report)
}

/// Collapse rows sharing (code, phrase) into one row carrying the
/// maximum weight. The first row's comment is kept.
fn merge_duplicates(source: &mut TableSource, report: &mut RefineReport) {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut merged = Vec::with_capacity(source.entries.len());

    for entry in source.entries.drain(..) {
        let key = (entry.code.clone(), entry.phrase.clone());
        match index.get(&key) {
            Some(&at) => {
                let kept: &mut Entry = &mut merged[at];
                log::warn!(
                    "duplicate {} {} first weight={} second weight={}",
                    entry.code,
                    entry.phrase,
                    kept.weight,
                    entry.weight
                );
                kept.weight = kept.weight.max(entry.weight);
                report.merged_duplicates += 1;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(entry);
            }
        }
    }

    source.entries = merged;
}

/// For every entry whose code starts with `x`, demote the entries for the
/// same phrase reachable without the leading `x` — the bare shortened
/// code, and the shortened code extended by one valid input character
/// (while within the maximum key length).
fn demote_shadowed(source: &mut TableSource, report: &mut RefineReport) {
    let valid_chars = source
        .definition()
        .valid_input_chars()
        .unwrap_or(DEFAULT_VALID_INPUT_CHARS)
        .to_string();
    let max_key_length = source
        .definition()
        .max_key_length()
        .unwrap_or_else(|| {
            source
                .entries
                .iter()
                .map(|e| e.code.chars().count())
                .max()
                .unwrap_or(0)
        });

    let index: HashMap<(String, String), usize> = source
        .entries
        .iter()
        .enumerate()
        .map(|(at, e)| ((e.code.clone(), e.phrase.clone()), at))
        .collect();

    let mut to_demote = Vec::new();
    for entry in &source.entries {
        let Some(short) = entry.code.strip_prefix('x') else {
            continue;
        };
        if short.is_empty() {
            continue;
        }
        if let Some(&at) = index.get(&(short.to_string(), entry.phrase.clone())) {
            to_demote.push(at);
        }
        if short.chars().count() < max_key_length {
            for extra in valid_chars.chars() {
                let extended = format!("{short}{extra}");
                if let Some(&at) = index.get(&(extended, entry.phrase.clone())) {
                    to_demote.push(at);
                }
            }
        }
    }

    for at in to_demote {
        let entry = &mut source.entries[at];
        if entry.weight != DEMOTED_WEIGHT {
            log::info!(
                "demoting {} {} weight {} -> {DEMOTED_WEIGHT}",
                entry.code,
                entry.phrase,
                entry.weight
            );
            entry.weight = DEMOTED_WEIGHT;
            report.demoted += 1;
        }
    }
}
