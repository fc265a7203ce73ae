//! `fasttrack generate`: write wrappers into a directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{CrateArgs, print_diagnostic};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub krate: CrateArgs,

    /// Output directory for the wrappers and the index
    #[arg(long)]
    pub out: PathBuf,

    /// Write nothing; fail when the output directory is out of date
    #[arg(long)]
    pub check: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let generator = args.krate.generator()?.out_dir(&args.out).dry_run(args.check);
    tracing::debug!(
        manifest_dir = %generator.manifest_dir().display(),
        out = %args.out.display(),
        check = args.check,
        "running generate"
    );
    let report = generator.generate().with_context(|| {
        format!(
            "Failed to generate for crate at {}",
            generator.manifest_dir().display()
        )
    })?;

    for diagnostic in report.output.surfaced() {
        print_diagnostic(diagnostic);
    }

    if args.check {
        let stale = report.written.len() + report.removed.len();
        for path in &report.written {
            println!("{} {} is out of date", "WARN".yellow(), display(path));
        }
        for path in &report.removed {
            println!("{} {} is stale", "WARN".yellow(), display(path));
        }
        if stale > 0 {
            anyhow::bail!(
                "{stale} file(s) in {} need regenerating",
                args.out.display()
            );
        }
        println!(
            "{} {} file(s) up to date",
            "OK".green(),
            report.unchanged.len()
        );
        return Ok(());
    }

    for path in &report.written {
        println!("{} Wrote {}", "OK".green(), display(path));
    }
    for path in &report.removed {
        println!("{} Removed {}", "OK".green(), display(path));
    }
    println!(
        "{} wrapper(s), {} written, {} unchanged, {} removed",
        report.output.wrappers.len(),
        report.written.len(),
        report.unchanged.len(),
        report.removed.len()
    );
    Ok(())
}

fn display(path: &Path) -> colored::ColoredString {
    path.display().to_string().cyan()
}
