use anyhow::Result;
use std::path::{Path, PathBuf};

use imtable_etl::convert_table;

pub fn run_convert(table: &Path, output: Option<PathBuf>) -> Result<()> {
    let output = output.unwrap_or_else(|| table.with_extension("db"));
    let count = convert_table(table, &output)?;
    println!("✓ Converted {} entries into {}", count, output.display());
    Ok(())
}
