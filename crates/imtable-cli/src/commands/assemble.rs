use anyhow::Result;
use std::path::{Path, PathBuf};

use imtable_core::manifest::ResolvedFragments;
use imtable_etl::assemble_fragments;

pub fn run_assemble(
    head: PathBuf,
    body: Vec<PathBuf>,
    tail: PathBuf,
    output: &Path,
) -> Result<()> {
    let fragments = ResolvedFragments { head, body, tail };
    let bytes = assemble_fragments(&fragments, output)?;
    println!("✓ Assembled {} ({bytes} bytes)", output.display());
    Ok(())
}
