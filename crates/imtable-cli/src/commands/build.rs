use anyhow::{Context, Result};
use std::path::Path;

use imtable_core::manifest::Manifest;
use imtable_etl::{build_pipeline, discover_tables, Config, TableJob};

/// Build one table source directory through the assemble → convert
/// pipeline.
pub async fn run_build(source_dir: &Path, config: &Config) -> Result<()> {
    let manifest = Manifest::load_dir(source_dir)
        .with_context(|| format!("no buildable table at {}", source_dir.display()))?;
    let job = TableJob::from_manifest(&manifest, source_dir, config.output_dir.clone());

    log::info!("Building table {} from {}", job.name(), source_dir.display());

    let workflow = build_pipeline(&job)?;

    std::fs::create_dir_all(&config.output_dir)?;
    let state_path = config.output_dir.join("pipeline.db");
    let mut store = treadle::SqliteStateStore::open(&state_path).await?;

    // Subscribe to events for progress display
    let mut events = workflow.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                treadle::WorkflowEvent::StageStarted { stage, .. } => {
                    println!("  ⏳ [{stage}] Starting...");
                }
                treadle::WorkflowEvent::StageCompleted { stage, .. } => {
                    println!("  ✓ [{stage}] Complete");
                }
                treadle::WorkflowEvent::StageFailed { stage, error, .. } => {
                    eprintln!("  ✗ [{stage}] FAILED: {error}");
                }
                _ => {}
            }
        }
    });

    workflow.advance(&job, &mut store).await?;

    if !config.keep_intermediate {
        let intermediate = job.intermediate_path();
        if intermediate.exists() {
            std::fs::remove_file(&intermediate)?;
            log::debug!("Removed intermediate {}", intermediate.display());
        }
    }

    println!("\n✓ Built {} -> {}", job.name(), job.artifact_path().display());
    Ok(())
}

/// Discover and build every table under `root`.
pub async fn run_build_all(root: &Path, config: &Config) -> Result<()> {
    let dirs = discover_tables(root);
    if dirs.is_empty() {
        println!("No table sources found under {}", root.display());
        return Ok(());
    }

    println!("Found {} table source(s)\n", dirs.len());
    for dir in dirs {
        run_build(&dir, config).await?;
    }
    Ok(())
}
