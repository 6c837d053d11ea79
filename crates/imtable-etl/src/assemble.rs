use std::path::Path;

use treadle::{Stage, StageContext, StageOutcome};

use imtable_core::manifest::ResolvedFragments;

use crate::error::{EtlError, EtlResult};
use crate::work_item::TableJob;

/// Concatenate head, body fragment(s), and tail into `target`.
/// Returns the number of bytes written.
pub fn assemble_fragments(fragments: &ResolvedFragments, target: &Path) -> EtlResult<u64> {
    let mut out = Vec::new();

    let head = read_fragment(&fragments.head)?;
    log::debug!(
        "head fragment {}: {} bytes",
        fragments.head.display(),
        head.len()
    );
    push_fragment(&mut out, head);

    for body_path in &fragments.body {
        let body = read_fragment(body_path)?;
        if let Err(e) = std::str::from_utf8(&body) {
            return Err(EtlError::Encoding {
                path: body_path.clone(),
                offset: e.valid_up_to(),
            });
        }
        log::debug!("body fragment {}: {} bytes", body_path.display(), body.len());
        push_fragment(&mut out, body);
    }

    let tail = read_fragment(&fragments.tail)?;
    log::debug!(
        "tail fragment {}: {} bytes",
        fragments.tail.display(),
        tail.len()
    );
    push_fragment(&mut out, tail);

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, &out)?;
    Ok(out.len() as u64)
}

fn read_fragment(path: &Path) -> EtlResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| EtlError::Fragment {
        path: path.to_path_buf(),
        source,
    })
}

fn push_fragment(out: &mut Vec<u8>, fragment: Vec<u8>) {
    let missing_newline = fragment.last().is_some_and(|b| *b != b'\n');
    out.extend_from_slice(&fragment);
    if missing_newline {
        out.push(b'\n');
    }
}

/// The Assemble stage: concatenate head, body fragment(s), and tail into
/// the intermediate table text.
///
/// The output is the byte concatenation of the fragments in (head, body…,
/// tail) order; the only normalization is ensuring each fragment ends with
/// a newline so fragments cannot run together on one line. Body fragments
/// must be valid UTF-8.
#[derive(Debug)]
pub struct AssembleStage {
    job: TableJob,
}

impl AssembleStage {
    #[must_use]
    pub fn new(job: TableJob) -> Self {
        Self { job }
    }

    /// Concatenate the job's fragments and write the intermediate file.
    /// Returns the number of bytes written.
    pub fn assemble(&self) -> EtlResult<u64> {
        assemble_fragments(&self.job.fragments, &self.job.intermediate_path())
    }
}

#[async_trait::async_trait]
impl Stage for AssembleStage {
    fn name(&self) -> &str {
        "assemble"
    }

    async fn execute(
        &self,
        _item: &dyn treadle::WorkItem,
        _context: &mut StageContext,
    ) -> treadle::Result<StageOutcome> {
        log::info!(
            "Assembling table {} into {}",
            self.job.name(),
            self.job.intermediate_path().display()
        );

        match self.assemble() {
            Ok(bytes) => {
                log::info!("Assemble complete: {bytes} bytes written");
                Ok(StageOutcome::Complete)
            }
            Err(e) => Err(treadle::TreadleError::StageExecution(format!(
                "Assemble failed: {e}"
            ))),
        }
    }
}
