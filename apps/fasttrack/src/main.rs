//! Fasttrack CLI.
//!
//! The `fasttrack` command runs the tool wrapper generator outside of a
//! build script: to inspect diagnostics, to write wrappers into a checked-in
//! directory, or to verify that such a directory is up to date.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fasttrack")]
#[command(about = "Generate MCP tool wrappers from marked Rust types")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write wrappers and the index into a directory
    Generate(commands::generate::GenerateArgs),

    /// Report diagnostics without writing anything
    Check(commands::check::CheckArgs),

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Config { command } => commands::config::execute(command),
    }
}
