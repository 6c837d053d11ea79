use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use treadle::WorkItem;

use imtable_core::manifest::{Manifest, ResolvedFragments};

/// One table build flowing through the pipeline.
///
/// This is the treadle `WorkItem` that flows through the
/// assemble → convert stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableJob {
    /// Symbolic table name; also the work item ID.
    name: String,
    /// Resolved fragment paths.
    pub fragments: ResolvedFragments,
    /// Directory receiving the intermediate text and the artifact.
    pub output_dir: PathBuf,
}

impl TableJob {
    #[must_use]
    pub fn new(name: impl Into<String>, fragments: ResolvedFragments, output_dir: PathBuf) -> Self {
        Self {
            name: name.into(),
            fragments,
            output_dir,
        }
    }

    /// Build a job from a manifest located in `source_dir`.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, source_dir: &Path, output_dir: PathBuf) -> Self {
        Self::new(
            manifest.name.clone(),
            manifest.resolve(source_dir),
            output_dir,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the assembled intermediate table text.
    #[must_use]
    pub fn intermediate_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.txt", self.name))
    }

    /// Path of the converted database artifact.
    #[must_use]
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.db", self.name))
    }
}

impl WorkItem for TableJob {
    fn id(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TableJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments() -> ResolvedFragments {
        ResolvedFragments {
            head: PathBuf::from("/tables/wubi/wubi-haifeng.head"),
            body: vec![PathBuf::from("/tables/wubi/wubi-haifeng86.body")],
            tail: PathBuf::from("/tables/wubi/wubi-haifeng.tail"),
        }
    }

    #[test]
    fn test_job_paths() {
        let job = TableJob::new("wubi-haifeng", fragments(), PathBuf::from("/build"));
        assert_eq!(job.id(), "wubi-haifeng");
        assert_eq!(
            job.intermediate_path(),
            PathBuf::from("/build/wubi-haifeng.txt")
        );
        assert_eq!(job.artifact_path(), PathBuf::from("/build/wubi-haifeng.db"));
    }

    #[test]
    fn test_job_display() {
        let job = TableJob::new("cangjie5", fragments(), PathBuf::from("/build"));
        assert_eq!(format!("{job}"), "cangjie5");
    }
}
