pub mod check;
pub mod config;
pub mod generate;

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use fasttrack_generator::{Diagnostic, Generator, Severity};

/// Where the crate to scan lives.
#[derive(Args, Debug)]
pub struct CrateArgs {
    /// Directory containing Cargo.toml (defaults to current dir)
    #[arg(long, env = "FASTTRACK_MANIFEST_DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Source root (defaults to <manifest-dir>/src)
    #[arg(long)]
    pub src: Option<PathBuf>,
}

impl CrateArgs {
    pub fn generator(&self) -> anyhow::Result<Generator> {
        let dir = match &self.manifest_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let mut generator = Generator::new(dir);
        if let Some(src) = &self.src {
            generator = generator.src_dir(src);
        }
        Ok(generator)
    }
}

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        Severity::Error => "ERROR".red(),
        Severity::Warning => "WARN".yellow(),
        Severity::Info => "INFO".blue(),
        Severity::Hidden => "HIDDEN".dimmed(),
    };
    eprintln!(
        "{} [{}] {}",
        label,
        diagnostic.id.code(),
        diagnostic.message
    );
    if let Some(location) = &diagnostic.location {
        eprintln!("  --> {location}");
    }
}
