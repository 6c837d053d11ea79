use treadle::Workflow;

use crate::{AssembleStage, ConvertStage, TableJob};

/// Build the assemble + convert pipeline for one table.
///
/// # Errors
/// Returns an error if the workflow cannot be built.
pub fn build_pipeline(job: &TableJob) -> treadle::Result<Workflow> {
    let assemble_stage = AssembleStage::new(job.clone());
    let convert_stage = ConvertStage::new(job.clone());

    Workflow::builder()
        .stage("assemble", assemble_stage)
        .stage("convert", convert_stage)
        .dependency("convert", "assemble")
        .build()
}
