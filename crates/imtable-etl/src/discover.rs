use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use imtable_core::manifest::MANIFEST_FILE;

/// Find every table source directory under `root`.
///
/// A table source directory is one containing a `table.toml` manifest.
/// Results are sorted by path so build order is deterministic.
#[must_use]
pub fn discover_tables(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || path.file_name() != Some(MANIFEST_FILE.as_ref()) {
            continue;
        }
        if let Some(dir) = path.parent() {
            log::debug!("Found table source: {}", dir.display());
            dirs.push(dir.to_path_buf());
        }
    }

    dirs.sort();
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_finds_manifest_dirs() {
        let root = TempDir::new().unwrap();
        let wubi = root.path().join("wubi");
        let cangjie = root.path().join("nested").join("cangjie");
        fs::create_dir_all(&wubi).unwrap();
        fs::create_dir_all(&cangjie).unwrap();
        fs::write(wubi.join(MANIFEST_FILE), "name = \"wubi\"").unwrap();
        fs::write(cangjie.join(MANIFEST_FILE), "name = \"cangjie\"").unwrap();
        fs::create_dir_all(root.path().join("empty")).unwrap();

        let dirs = discover_tables(root.path());
        assert_eq!(dirs, vec![cangjie, wubi]);
    }

    #[test]
    fn test_discover_empty_root() {
        let root = TempDir::new().unwrap();
        assert!(discover_tables(root.path()).is_empty());
    }

    #[test]
    fn test_discover_ignores_other_toml_files() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("Cargo.toml"), "[package]").unwrap();
        assert!(discover_tables(root.path()).is_empty());
    }
}
