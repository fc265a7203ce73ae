//! The parts of `Cargo.toml` the generator cares about.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::{GeneratorError, Result};

/// Crate identity and the crates it can name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Library crate name, underscores instead of hyphens.
    pub crate_name: String,
    /// Dependency names as written in paths.
    pub dependencies: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
    lib: Option<RawLib>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
    #[serde(default)]
    target: BTreeMap<String, RawTargetDeps>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLib {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTargetDeps {
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

impl Manifest {
    /// Read `Cargo.toml` from `manifest_dir`.
    pub fn load(manifest_dir: &Path) -> Result<Self> {
        let path = manifest_dir.join("Cargo.toml");
        let raw = std::fs::read_to_string(&path).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;
        Self::parse(&path, &raw)
    }

    pub fn parse(path: &Path, raw: &str) -> Result<Self> {
        let manifest: RawManifest = toml::from_str(raw).map_err(|e| GeneratorError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let lib_name = manifest.lib.and_then(|lib| lib.name);
        let Some(name) = lib_name.or_else(|| manifest.package.map(|p| p.name)) else {
            return Err(GeneratorError::Manifest {
                path: path.to_path_buf(),
                message: "no [package] name".into(),
            });
        };

        let dependencies = manifest
            .dependencies
            .keys()
            .chain(manifest.target.values().flat_map(|t| t.dependencies.keys()))
            .map(|name| crate_ident(name))
            .collect();

        Ok(Self {
            crate_name: crate_ident(&name),
            dependencies,
        })
    }
}

fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}
