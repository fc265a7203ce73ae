//! `fasttrack check`: run the pipeline and print what it found.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use fasttrack_generator::Severity;

use super::{CrateArgs, print_diagnostic};

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub krate: CrateArgs,

    /// Also print hidden and informational diagnostics
    #[arg(long)]
    pub all: bool,
}

pub fn execute(args: CheckArgs) -> Result<()> {
    let generator = args.krate.generator()?;
    tracing::debug!(
        manifest_dir = %generator.manifest_dir().display(),
        source_root = %generator.source_root().display(),
        "running check"
    );
    let output = generator.check().with_context(|| {
        format!(
            "Failed to check crate at {}",
            generator.manifest_dir().display()
        )
    })?;

    for diagnostic in &output.diagnostics {
        if args.all || diagnostic.severity.is_surfaced() {
            print_diagnostic(diagnostic);
        }
    }
    for wrapper in &output.wrappers {
        println!(
            "{} {} from {}",
            "OK".green(),
            wrapper.artifact.name.cyan(),
            wrapper.source
        );
    }

    let errors = output
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("{errors} error(s) reported");
    }
    Ok(())
}
