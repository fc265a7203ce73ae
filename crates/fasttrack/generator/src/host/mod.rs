//! Running the generator against a crate on disk.
//!
//! [`Generator`] ties the pure pipeline to the filesystem: it reads
//! `Cargo.toml` and `fasttrack.json`, parses the sources, runs
//! [`crate::generate`] and writes the artifacts into an output directory.

mod discover;
mod manifest;
mod writer;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub use discover::{DiscoveredSources, discover};
pub use manifest::Manifest;
pub use writer::{
    WriteStatus, is_generated, pending_status, prune_stale, stale_files, write_if_changed,
};

use crate::compilation::{Compilation, Reference};
use crate::config::{self, GeneratorConfig};
use crate::emitter::render_index;
use crate::error::{GeneratorError, Result};
use crate::pipeline::{GeneratorOutput, generate};

/// Subdirectory of `OUT_DIR` the build script writes into.
pub const OUT_SUBDIR: &str = "fasttrack";

/// Builder for one generation run over a crate.
#[derive(Debug, Clone)]
pub struct Generator {
    manifest_dir: PathBuf,
    src_dir: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    config: Option<GeneratorConfig>,
    dry_run: bool,
}

/// Result of [`Generator::generate`].
///
/// In a dry run `written` and `removed` list what a real run would change.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub output: GeneratorOutput,
    /// Source files that were read.
    pub sources: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

struct Prepared {
    config: GeneratorConfig,
    compilation: Compilation,
    sources: DiscoveredSources,
}

impl Generator {
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            src_dir: None,
            out_dir: None,
            config: None,
            dry_run: false,
        }
    }

    /// Configure from the environment cargo gives build scripts.
    pub fn from_build_env() -> Result<Self> {
        let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")
            .ok_or(GeneratorError::MissingEnv("CARGO_MANIFEST_DIR"))?;
        let out_dir = std::env::var_os("OUT_DIR").ok_or(GeneratorError::MissingEnv("OUT_DIR"))?;
        Ok(Self::new(manifest_dir).out_dir(PathBuf::from(out_dir).join(OUT_SUBDIR)))
    }

    /// Source root; defaults to `<manifest_dir>/src`.
    #[must_use]
    pub fn src_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.src_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Use `config` instead of loading `fasttrack.json`.
    #[must_use]
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Compare against the output directory without writing or removing.
    #[must_use]
    pub const fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn manifest_dir(&self) -> &Path {
        &self.manifest_dir
    }

    pub fn source_root(&self) -> PathBuf {
        self.src_dir
            .clone()
            .unwrap_or_else(|| self.manifest_dir.join("src"))
    }

    fn prepare(&self) -> Result<Prepared> {
        let config = match &self.config {
            Some(config) => {
                config.validate()?;
                config.clone()
            }
            None => config::load(&self.manifest_dir)?,
        };
        let manifest = Manifest::load(&self.manifest_dir)?;
        let mut references: Vec<Reference> = manifest
            .dependencies
            .iter()
            .filter(|dep| !config.references.iter().any(|r| &r.name == *dep))
            .map(|dep| Reference::opaque(dep.clone()))
            .collect();
        references.extend(config.references.iter().map(|r| Reference {
            name: r.name.clone(),
            exports: r.exports.as_ref().map(|e| e.iter().cloned().collect()),
        }));

        let mut sources = discover(&self.source_root())?;
        let files = std::mem::take(&mut sources.files);
        let compilation = Compilation::new(manifest.crate_name, files, references);
        tracing::debug!(
            krate = compilation.crate_name(),
            files = compilation.files().len(),
            "prepared compilation"
        );
        Ok(Prepared {
            config,
            compilation,
            sources,
        })
    }

    /// Run the pipeline without writing anything.
    ///
    /// Parse failures come first in the diagnostics, in file order.
    pub fn check(&self) -> Result<GeneratorOutput> {
        let prepared = self.prepare()?;
        run(&prepared)
    }

    /// Run the pipeline and write every artifact plus the index into the
    /// output directory. Unchanged files are left alone and stale generated
    /// files are removed.
    pub fn generate(&self) -> Result<GenerationReport> {
        let out_dir = self
            .out_dir
            .as_ref()
            .ok_or_else(|| GeneratorError::InvalidConfig("no output directory set".into()))?;
        let prepared = self.prepare()?;
        let output = run(&prepared)?;
        let index_name = &prepared.config.index_file;
        if output.wrappers.iter().any(|w| &w.artifact.name == index_name) {
            return Err(GeneratorError::InvalidConfig(format!(
                "index_file '{index_name}' collides with a generated wrapper"
            )));
        }
        let index = render_index(&output.wrappers).map_err(|e| GeneratorError::Render {
            name: index_name.clone(),
            message: e.to_string(),
        })?;

        let mut report = GenerationReport {
            sources: prepared.sources.paths.clone(),
            ..GenerationReport::default()
        };
        let files = output
            .wrappers
            .iter()
            .map(|w| (w.artifact.name.as_str(), w.artifact.text.as_str()))
            .chain(std::iter::once((index_name.as_str(), index.as_str())));
        let debug = std::env::var("FASTTRACK_DEBUG").is_ok();
        let mut keep = BTreeSet::new();
        for (name, text) in files {
            let path = out_dir.join(name);
            if debug {
                eprintln!("Generated {name}:\n{text}");
            }
            let status = if self.dry_run {
                pending_status(&path, text)
            } else {
                write_if_changed(&path, text)?
            };
            match status {
                WriteStatus::Written => report.written.push(path),
                WriteStatus::Unchanged => report.unchanged.push(path),
            }
            keep.insert(name.to_string());
        }
        report.removed = if self.dry_run {
            stale_files(out_dir, &keep)?
        } else {
            prune_stale(out_dir, &keep)?
        };
        tracing::info!(
            out_dir = %out_dir.display(),
            dry_run = self.dry_run,
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            "wrote artifacts"
        );
        report.output = output;
        Ok(report)
    }
}

fn run(prepared: &Prepared) -> Result<GeneratorOutput> {
    let mut output = generate(&prepared.compilation, &prepared.config)?;
    let mut diagnostics = prepared.sources.diagnostics.clone();
    diagnostics.append(&mut output.diagnostics);
    output.diagnostics = diagnostics;
    Ok(output)
}

/// Entry point for a consumer's `build.rs`.
///
/// Generates into `$OUT_DIR/fasttrack`, prints `cargo:rerun-if-changed`
/// lines for the inputs and one `cargo:warning` per warning or error.
///
/// ```no_run
/// fn main() {
///     fasttrack_generator::run_build_script().unwrap();
/// }
/// ```
pub fn run_build_script() -> Result<GenerationReport> {
    let generator = Generator::from_build_env()?;
    println!("cargo:rerun-if-changed={}", generator.source_root().display());
    println!(
        "cargo:rerun-if-changed={}",
        generator.manifest_dir().join("Cargo.toml").display()
    );
    let config_file = config::config_path(generator.manifest_dir());
    if config_file.exists() {
        println!("cargo:rerun-if-changed={}", config_file.display());
    }
    println!("cargo:rerun-if-env-changed=FASTTRACK_RECEIVER_NAMING");
    println!("cargo:rerun-if-env-changed=FASTTRACK_DEBUG");

    let report = generator.generate()?;
    for diagnostic in report.output.surfaced() {
        println!("cargo:warning={}", diagnostic.to_string().replace('\n', " "));
    }
    Ok(report)
}
