use std::path::Path;

use treadle::{Stage, StageContext, StageOutcome};

use imtable_core::model::{Definition, Entry, TableSource};
use imtable_core::schema::Database;

use crate::error::{EtlError, EtlResult};
use crate::work_item::TableJob;

/// Parse and validate the table text at `input`, then package it into a
/// database artifact at `output`. An existing artifact is replaced.
/// Returns the entry count.
pub fn convert_table(input: &Path, output: &Path) -> EtlResult<u64> {
    let source = TableSource::read(input)?;
    let definition = source.definition();

    for entry in &source.entries {
        validate_entry(entry, definition)?;
    }

    if output.exists() {
        std::fs::remove_file(output)?;
    }

    let db = Database::open(output)?;
    db.insert_attributes(
        definition
            .attributes()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str())),
    )?;
    db.insert_entries(&source.entries)?;

    Ok(source.entries.len() as u64)
}

fn validate_entry(entry: &Entry, definition: &Definition) -> EtlResult<()> {
    if let Some(valid_chars) = definition.valid_input_chars() {
        for ch in entry.code.chars() {
            if !valid_chars.contains(ch) {
                return Err(EtlError::Validation {
                    code: entry.code.clone(),
                    phrase: entry.phrase.clone(),
                    message: format!("code contains {ch:?}, not in VALID_INPUT_CHARS"),
                });
            }
        }
    }
    if let Some(max_len) = definition.max_key_length() {
        let len = entry.code.chars().count();
        if len > max_len {
            return Err(EtlError::Validation {
                code: entry.code.clone(),
                phrase: entry.phrase.clone(),
                message: format!("code length {len} exceeds MAX_KEY_LENGTH {max_len}"),
            });
        }
    }
    Ok(())
}

/// The Convert stage: package the intermediate table text into the
/// database artifact.
///
/// Entries are validated against the table's own definition before
/// anything is written; an existing artifact at the output path is
/// replaced. Attributes and entries land in the database in source order,
/// in one transaction each, so the artifact's logical content is a
/// deterministic function of the intermediate text.
#[derive(Debug)]
pub struct ConvertStage {
    job: TableJob,
}

impl ConvertStage {
    #[must_use]
    pub fn new(job: TableJob) -> Self {
        Self { job }
    }

    /// Parse, validate, and package the job's table. Returns the entry
    /// count.
    pub fn convert(&self) -> EtlResult<u64> {
        convert_table(&self.job.intermediate_path(), &self.job.artifact_path())
    }
}

#[async_trait::async_trait]
impl Stage for ConvertStage {
    fn name(&self) -> &str {
        "convert"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        _context: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        log::info!(
            "Converting {} into {}",
            self.job.intermediate_path().display(),
            self.job.artifact_path().display()
        );

        match self.convert() {
            Ok(count) => {
                log::info!("Convert complete: {count} entries packaged");
                Ok(StageOutcome::Complete)
            }
            Err(e) => Err(treadle::TreadleError::StageExecution(format!(
                "Convert failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imtable_core::manifest::ResolvedFragments;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TABLE: &str = "\
BEGIN_DEFINITION
NAME = Test
VALID_INPUT_CHARS = ab
MAX_KEY_LENGTH = 2
END_DEFINITION
BEGIN_TABLE
a\t日\t1000
ab\t明\t500
END_TABLE
";

    fn job_with_table(dir: &TempDir, table: &str) -> TableJob {
        let job = TableJob::new(
            "test",
            ResolvedFragments {
                head: PathBuf::new(),
                body: vec![],
                tail: PathBuf::new(),
            },
            dir.path().to_path_buf(),
        );
        fs::write(job.intermediate_path(), table).unwrap();
        job
    }

    #[test]
    fn test_convert_packages_attributes_and_entries() {
        let dir = TempDir::new().unwrap();
        let job = job_with_table(&dir, TABLE);
        let artifact = job.artifact_path();

        let count = ConvertStage::new(job).convert().unwrap();
        assert_eq!(count, 2);

        let db = Database::open(artifact).unwrap();
        assert_eq!(db.get_attribute("NAME").unwrap().as_deref(), Some("Test"));
        assert_eq!(db.phrase_count().unwrap(), 2);
        assert_eq!(db.lookup_exact("a").unwrap()[0].phrase, "日");
    }

    #[test]
    fn test_convert_rejects_invalid_code_character() {
        let dir = TempDir::new().unwrap();
        let table = TABLE.replace("ab\t明\t500", "az\t明\t500");
        let job = job_with_table(&dir, &table);

        let err = ConvertStage::new(job).convert().unwrap_err();
        assert!(err.to_string().contains("VALID_INPUT_CHARS"), "{err}");
        assert!(err.is_content_error());
    }

    #[test]
    fn test_convert_rejects_overlong_code() {
        let dir = TempDir::new().unwrap();
        let table = TABLE.replace("ab\t明\t500", "aba\t明\t500");
        let job = job_with_table(&dir, &table);

        let err = ConvertStage::new(job).convert().unwrap_err();
        assert!(err.to_string().contains("MAX_KEY_LENGTH"), "{err}");
    }

    #[test]
    fn test_convert_without_definition_limits_accepts_all() {
        let dir = TempDir::new().unwrap();
        let job = job_with_table(&dir, "BEGIN_TABLE\nxyzzy\t日\t1\nEND_TABLE\n");

        assert_eq!(ConvertStage::new(job).convert().unwrap(), 1);
    }

    #[test]
    fn test_convert_replaces_existing_artifact() {
        let dir = TempDir::new().unwrap();
        let job = job_with_table(&dir, TABLE);
        let artifact = job.artifact_path();
        let stage = ConvertStage::new(job);

        stage.convert().unwrap();
        stage.convert().unwrap();

        // entries must not accumulate across runs
        let db = Database::open(artifact).unwrap();
        assert_eq!(db.phrase_count().unwrap(), 2);
    }

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct TestItem {
        id: String,
    }

    impl treadle::WorkItem for TestItem {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn test_item() -> TestItem {
        TestItem {
            id: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_convert_stage_execute_completes() {
        let dir = TempDir::new().unwrap();
        let job = job_with_table(&dir, TABLE);
        let artifact = job.artifact_path();
        let stage = ConvertStage::new(job);
        let mut ctx = StageContext::new("convert".to_string());

        let outcome = stage.execute(&test_item(), &mut ctx).await.unwrap();
        assert_eq!(outcome, StageOutcome::Complete);
        assert!(artifact.exists());
    }

    #[tokio::test]
    async fn test_convert_stage_execute_reports_failure() {
        let dir = TempDir::new().unwrap();
        let table = TABLE.replace("ab\t明\t500", "az\t明\t500");
        let job = job_with_table(&dir, &table);
        let stage = ConvertStage::new(job);
        let mut ctx = StageContext::new("convert".to_string());

        let err = stage.execute(&test_item(), &mut ctx).await.unwrap_err();
        assert!(err.to_string().contains("Convert failed"), "{err}");
        assert!(err.to_string().contains("VALID_INPUT_CHARS"), "{err}");
    }

    #[test]
    fn test_convert_is_logically_deterministic() {
        let dir = TempDir::new().unwrap();
        let job = job_with_table(&dir, TABLE);
        let artifact = job.artifact_path();
        let stage = ConvertStage::new(job);

        stage.convert().unwrap();
        let db = Database::open(&artifact).unwrap();
        let first = (db.list_attributes().unwrap(), db.list_entries().unwrap());
        drop(db);

        stage.convert().unwrap();
        let db = Database::open(&artifact).unwrap();
        let second = (db.list_attributes().unwrap(), db.list_entries().unwrap());

        assert_eq!(first, second);
    }
}
