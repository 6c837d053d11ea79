use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the per-table build manifest file.
pub const MANIFEST_FILE: &str = "table.toml";

/// A table build manifest (`table.toml`), naming the fragments a table is
/// assembled from.
///
/// ```toml
/// name = "wubi-haifeng"
/// head = "wubi-haifeng.head"
/// body = ["wubi-haifeng86.body"]
/// tail = "wubi-haifeng.tail"
/// ```
///
/// Fragment paths are relative to the manifest's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Symbolic table name; names the intermediate text and the artifact.
    pub name: String,

    /// Head fragment: preamble + definition block, ending with `BEGIN_TABLE`.
    pub head: PathBuf,

    /// Body fragments, concatenated in order. Large tables split theirs.
    pub body: Vec<PathBuf>,

    /// Tail fragment, starting with `END_TABLE`.
    pub tail: PathBuf,
}

impl Manifest {
    /// Load a manifest from a `table.toml` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let manifest: Self = toml::from_str(&text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load the manifest from a table source directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(MANIFEST_FILE);
        if !path.exists() {
            return Err(Error::NotFound {
                entity: "manifest",
                name: path.display().to_string(),
            });
        }
        Self::load(path)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTable("manifest name is empty".to_string()));
        }
        if self.body.is_empty() {
            return Err(Error::InvalidTable(format!(
                "manifest for {:?} lists no body fragments",
                self.name
            )));
        }
        Ok(())
    }

    /// Fragment paths resolved against `base` (the manifest's directory).
    #[must_use]
    pub fn resolve(&self, base: &Path) -> ResolvedFragments {
        ResolvedFragments {
            head: base.join(&self.head),
            body: self.body.iter().map(|b| base.join(b)).collect(),
            tail: base.join(&self.tail),
        }
    }
}

/// Absolute fragment paths for one table build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFragments {
    pub head: PathBuf,
    pub body: Vec<PathBuf>,
    pub tail: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
name = "wubi-haifeng"
head = "wubi-haifeng.head"
body = ["wubi-haifeng86.body"]
tail = "wubi-haifeng.tail"
"#;

    #[test]
    fn test_load_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), MANIFEST).unwrap();

        let manifest = Manifest::load_dir(dir.path()).unwrap();
        assert_eq!(manifest.name, "wubi-haifeng");
        assert_eq!(manifest.body.len(), 1);
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = Manifest::load_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_empty_body_list_rejected() {
        let dir = TempDir::new().unwrap();
        let text = "name = \"t\"\nhead = \"h\"\nbody = []\ntail = \"t.tail\"\n";
        std::fs::write(dir.path().join(MANIFEST_FILE), text).unwrap();
        assert!(Manifest::load_dir(dir.path()).is_err());
    }

    #[test]
    fn test_resolve_joins_base() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        let resolved = manifest.resolve(Path::new("/tables/wubi"));
        assert_eq!(
            resolved.head,
            PathBuf::from("/tables/wubi/wubi-haifeng.head")
        );
        assert_eq!(
            resolved.body,
            vec![PathBuf::from("/tables/wubi/wubi-haifeng86.body")]
        );
    }
}
