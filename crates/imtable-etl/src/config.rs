use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for imtable.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (IMT_* prefix)
/// 3. Config file (~/.config/imtable/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving intermediate table texts and artifacts.
    ///
    /// Can be set via:
    /// - CLI: --output-dir /path
    /// - ENV: IMT_OUTPUT_DIR
    /// - Config: output_dir = "/path"
    /// - Default: ~/.local/share/imtable/build
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Keep the intermediate table text after conversion.
    ///
    /// Can be set via:
    /// - ENV: IMT_KEEP_INTERMEDIATE
    /// - Config: keep_intermediate = false
    #[serde(default = "default_keep_intermediate")]
    pub keep_intermediate: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            keep_intermediate: default_keep_intermediate(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/imtable/config.toml
    /// Reads environment variables with IMT_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("imt");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with the output directory overridden.
    ///
    /// This is used when the --output-dir CLI flag is provided.
    pub fn load_with_output_dir(output_dir: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.output_dir = output_dir;
        Ok(config)
    }
}

/// Get the default build output directory.
fn default_output_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("imtable")
        .join("build")
}

const fn default_keep_intermediate() -> bool {
    true
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/imtable/config.toml
/// - macOS: ~/Library/Application Support/imtable/config.toml
/// - Windows: %APPDATA%\imtable\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("imtable")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Imtable Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (IMT_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory receiving intermediate table texts and database artifacts
#
# Can also be set via:
# - CLI: imtable --output-dir /custom/build build tables/wubi
# - Environment: IMT_OUTPUT_DIR=/custom/build
#
# Default: Platform-specific data directory
#output_dir = "/path/to/build"

# Keep the assembled intermediate table text after conversion
#keep_intermediate = true
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}
