use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use imtable_etl::Config;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "imtable", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Build output directory (default: ~/.local/share/imtable/build)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Build a table from its source directory
    ///
    /// Reads the table.toml manifest in the given directory and runs the
    /// two-stage build pipeline:
    ///
    /// - Assemble: concatenates the head fragment, the UTF-8 body
    ///   fragment(s), and the tail fragment into a single intermediate
    ///   table text in the output directory
    /// - Convert: parses the intermediate text, validates every entry
    ///   against the table's own definition block (VALID_INPUT_CHARS,
    ///   MAX_KEY_LENGTH), and packages attributes and entries into a
    ///   SQLite artifact named after the table
    ///
    /// The build is deterministic: the same fragments produce the same
    /// intermediate text and an artifact with the same logical content.
    ///
    /// Output:
    /// - <output-dir>/<name>.txt — the assembled intermediate table
    /// - <output-dir>/<name>.db — the packaged lookup artifact
    ///
    /// Use 'imtable status' on the artifact to inspect the result.
    Build {
        /// Table source directory containing table.toml
        dir: PathBuf,
    },
    /// Discover and build every table under a root directory
    BuildAll {
        /// Root of the table source tree
        root: PathBuf,
    },
    /// Assemble head + body + tail into a table text (first stage only)
    Assemble {
        /// Head fragment (preamble + definition, ends with BEGIN_TABLE)
        #[arg(long)]
        head: PathBuf,
        /// Body fragment(s), concatenated in order
        #[arg(long, required = true, num_args = 1..)]
        body: Vec<PathBuf>,
        /// Tail fragment (starts with END_TABLE)
        #[arg(long)]
        tail: PathBuf,
        /// Output path for the assembled table text
        #[arg(long)]
        output: PathBuf,
    },
    /// Convert an assembled table text into a database artifact
    Convert {
        /// Assembled table text
        table: PathBuf,
        /// Artifact path (default: <table stem>.db next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Refine a table text (merge duplicates, demote shadowed codes)
    Refine {
        /// Table text to refine
        table: PathBuf,
        /// Output path (default: <input>.new)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Inspect a packaged table artifact
    Status {
        /// Path to the database artifact
        db: PathBuf,
        /// Emit machine-readable JSON instead of the summary
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Create the config file with defaults
    Init,
    /// Show the current effective configuration
    Show,
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.output_dir {
        Some(dir) => Config::load_with_output_dir(dir)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Build { dir } => {
            commands::run_build(&dir, &config).await?;
        }
        Commands::BuildAll { root } => {
            commands::run_build_all(&root, &config).await?;
        }
        Commands::Assemble {
            head,
            body,
            tail,
            output,
        } => {
            commands::run_assemble(head, body, tail, &output)?;
        }
        Commands::Convert { table, output } => {
            commands::run_convert(&table, output)?;
        }
        Commands::Refine { table, output } => {
            commands::run_refine(&table, output)?;
        }
        Commands::Status { db, json } => {
            commands::show_status(&db, json)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Show => commands::config::show_config()?,
            ConfigAction::Path => commands::config::show_path()?,
        },
    }

    Ok(())
}
