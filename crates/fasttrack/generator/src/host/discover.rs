//! Discovery and parsing of a crate's source files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::compilation::{SourceFile, module_for_file};
use crate::diagnostics::Diagnostic;
use crate::error::{GeneratorError, Result};

/// Parsed sources of one crate.
#[derive(Debug, Default)]
pub struct DiscoveredSources {
    pub files: Vec<SourceFile>,
    /// Every file read, parsed or not.
    pub paths: Vec<PathBuf>,
    /// One entry per file that failed to parse.
    pub diagnostics: Vec<Diagnostic>,
}

/// Read and parse every `.rs` file below `src_dir`.
///
/// `bin/` holds other crates and is skipped, as is `main.rs` when a
/// `lib.rs` sits next to it. Files are returned sorted by path.
pub fn discover(src_dir: &Path) -> Result<DiscoveredSources> {
    let has_lib = src_dir.join("lib.rs").is_file();
    let mut paths = Vec::new();
    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| GeneratorError::Io {
            path: e.path().unwrap_or(src_dir).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(src_dir) else {
            continue;
        };
        if relative.starts_with("bin") || (has_lib && relative == Path::new("main.rs")) {
            continue;
        }
        if relative.extension().is_some_and(|ext| ext == "rs") {
            paths.push(entry.path().to_path_buf());
        }
    }

    let mut sources = DiscoveredSources::default();
    for path in paths {
        let Some(module) = path
            .strip_prefix(src_dir)
            .ok()
            .and_then(module_for_file)
        else {
            tracing::debug!(path = %path.display(), "skipping file without a module path");
            continue;
        };
        let text = std::fs::read_to_string(&path).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;
        match SourceFile::parse(path.clone(), module, &text) {
            Ok(file) => sources.files.push(file),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to parse source file");
                sources.diagnostics.push(Diagnostic::source_parse_failed(&path, &err));
            }
        }
        sources.paths.push(path);
    }
    tracing::debug!(
        dir = %src_dir.display(),
        files = sources.files.len(),
        "discovered sources"
    );
    Ok(sources)
}
