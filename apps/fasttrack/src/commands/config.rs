//! Configuration commands for `fasttrack.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use fasttrack_generator::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (file plus environment overrides)
    Show {
        /// Directory containing fasttrack.json (defaults to current dir)
        #[arg(long)]
        manifest_dir: Option<PathBuf>,
    },

    /// Output the JSON Schema for fasttrack.json
    Schema,
}

pub fn execute(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show { manifest_dir } => cmd_show(manifest_dir),
        ConfigCommands::Schema => cmd_schema(),
    }
}

fn cmd_show(manifest_dir: Option<PathBuf>) -> Result<()> {
    let dir = match manifest_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    tracing::debug!(dir = %dir.display(), "showing config");
    let loaded = config::load(&dir)
        .with_context(|| format!("Failed to load config from {}", dir.display()))?;
    println!("{}", serde_json::to_string_pretty(&loaded)?);
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", config::schema_json_pretty()?);
    Ok(())
}
