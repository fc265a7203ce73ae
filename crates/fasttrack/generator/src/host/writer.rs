//! Writing generated files.
//!
//! Files are replaced atomically and only when their content changes, so
//! cargo does not see a fresh mtime and rebuild dependents for nothing.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomicwrites::{AllowOverwrite, AtomicFile};

use crate::emitter::GENERATED_HEADER;
use crate::error::{GeneratorError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    Written,
    Unchanged,
}

/// What [`write_if_changed`] would do, without touching the file.
pub fn pending_status(path: &Path, text: &str) -> WriteStatus {
    if std::fs::read_to_string(path).is_ok_and(|existing| existing == text) {
        WriteStatus::Unchanged
    } else {
        WriteStatus::Written
    }
}

/// Write `text` to `path` unless the file already holds exactly that text.
pub fn write_if_changed(path: &Path, text: &str) -> Result<WriteStatus> {
    if pending_status(path, text) == WriteStatus::Unchanged {
        return Ok(WriteStatus::Unchanged);
    }
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|source| GeneratorError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    AtomicFile::new(path, AllowOverwrite)
        .write(|f| f.write_all(text.as_bytes()))
        .map_err(|e| GeneratorError::Write {
            path: path.to_path_buf(),
            source: match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            },
        })?;
    Ok(WriteStatus::Written)
}

/// Whether `path` is a file this generator wrote.
pub fn is_generated(path: &Path) -> bool {
    std::fs::read_to_string(path).is_ok_and(|text| text.starts_with(GENERATED_HEADER))
}

/// Remove generated `.rs` files in `dir` whose names are not in `keep`.
/// Files without the generated header are never touched.
pub fn prune_stale(dir: &Path, keep: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let stale = stale_files(dir, keep)?;
    for path in &stale {
        std::fs::remove_file(path).map_err(|source| GeneratorError::Write {
            path: path.clone(),
            source,
        })?;
    }
    Ok(stale)
}

/// Generated `.rs` files in `dir` whose names are not in `keep`, sorted.
pub fn stale_files(dir: &Path, keep: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(GeneratorError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };
    let mut stale = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| GeneratorError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".rs") || keep.contains(name) || !is_generated(&path) {
            continue;
        }
        stale.push(path);
    }
    stale.sort();
    Ok(stale)
}
