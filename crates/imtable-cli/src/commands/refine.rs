use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use imtable_etl::refine::refine_file;

pub fn run_refine(table: &Path, output: Option<PathBuf>) -> Result<()> {
    // The original table scripts write <input>.new by default
    let output = output.unwrap_or_else(|| {
        let mut name = OsString::from(table.as_os_str());
        name.push(".new");
        PathBuf::from(name)
    });

    let report = refine_file(table, &output)?;
    println!(
        "✓ Refined {}: {} duplicate(s) merged, {} entry(ies) demoted",
        output.display(),
        report.merged_duplicates,
        report.demoted
    );
    Ok(())
}
