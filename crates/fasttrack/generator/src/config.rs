//! Generator configuration.
//!
//! The configuration lives in an optional `fasttrack.json` next to the
//! crate's `Cargo.toml`. Every field has a default, so partial files work and
//! a missing file means "all defaults".
//!
//! # Precedence (lowest to highest)
//! 1. Default values
//! 2. `fasttrack.json`
//! 3. Environment variables
//!
//! # Environment Variables
//! - `FASTTRACK_RECEIVER_NAMING`: `first_lower` or `snake_case`

use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compilation::QualifiedPath;
use crate::error::{GeneratorError, Result};

/// Filename of the per-crate config.
pub const CONFIG_FILE: &str = "fasttrack.json";

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Optional JSON Schema URL for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Fully qualified paths of the two marker attributes.
    pub markers: MarkerConfig,

    /// Attributes emitted verbatim on the generated wrappers.
    pub host: HostMarkerConfig,

    /// Crates the compilation references in addition to the manifest's
    /// dependencies.
    pub references: Vec<ReferenceConfig>,

    /// How the implicit owner parameter is named.
    pub receiver_naming: ReceiverNaming,

    /// File name of the index artifact that includes every wrapper.
    pub index_file: String,
}

/// Paths the scanned sources use for the two markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker applied to a type, carrying the tool name.
    pub tool_name: String,

    /// Marker applied to a method, carrying its description.
    pub tool_description: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            tool_name: "fasttrack_markers::tool_name".into(),
            tool_description: "fasttrack_markers::tool_description".into(),
        }
    }
}

/// Attributes of the hosting tool framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HostMarkerConfig {
    /// Placed on every generated wrapper type.
    pub container: String,

    /// Placed on every generated wrapper method.
    pub tool: String,

    /// Placed on every generated wrapper method, carrying the description.
    pub description: String,
}

impl Default for HostMarkerConfig {
    fn default() -> Self {
        Self {
            container: "mcp_server_tool_type".into(),
            tool: "mcp_server_tool".into(),
            description: "description".into(),
        }
    }
}

/// An extra referenced crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceConfig {
    /// Crate name as written in paths (underscores, not hyphens).
    pub name: String,

    /// Items the crate exports. When absent every path below the crate is
    /// assumed to exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exports: Option<Vec<String>>,
}

/// Naming of the implicit owner parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverNaming {
    /// Lower-case the first character: `Greeting` becomes `greeting`.
    #[default]
    FirstLower,
    /// Convert to snake case: `CalculatorService` becomes `calculator_service`.
    SnakeCase,
}

impl std::str::FromStr for ReceiverNaming {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first_lower" => Ok(Self::FirstLower),
            "snake_case" => Ok(Self::SnakeCase),
            other => Err(GeneratorError::InvalidConfig(format!(
                "unknown receiver naming '{other}' (expected first_lower or snake_case)"
            ))),
        }
    }
}

/// Host attributes parsed into paths, ready for emission.
#[derive(Debug, Clone)]
pub struct HostMarkers {
    pub container: syn::Path,
    pub tool: syn::Path,
    pub description: syn::Path,
}

impl GeneratorConfig {
    /// Parse the configured host attribute paths.
    pub fn host_markers(&self) -> Result<HostMarkers> {
        Ok(HostMarkers {
            container: parse_attr_path("host.container", &self.host.container)?,
            tool: parse_attr_path("host.tool", &self.host.tool)?,
            description: parse_attr_path("host.description", &self.host.description)?,
        })
    }

    /// Check the configuration for values the generator cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("markers.tool_name", &self.markers.tool_name),
            ("markers.tool_description", &self.markers.tool_description),
        ] {
            if QualifiedPath::parse(value).is_none() {
                return Err(GeneratorError::InvalidConfig(format!(
                    "{field} must be a fully qualified path, got '{value}'"
                )));
            }
        }
        self.host_markers()?;

        let index = Path::new(&self.index_file);
        let is_plain_rs = index.extension().is_some_and(|ext| ext == "rs")
            && index.components().count() == 1;
        if !is_plain_rs {
            return Err(GeneratorError::InvalidConfig(format!(
                "index_file must be a plain .rs file name, got '{}'",
                self.index_file
            )));
        }
        for reference in &self.references {
            if syn::parse_str::<syn::Ident>(&reference.name).is_err() {
                return Err(GeneratorError::InvalidConfig(format!(
                    "reference name '{}' is not a crate identifier",
                    reference.name
                )));
            }
        }
        Ok(())
    }

    /// Last segment of the type marker path, used in messages.
    pub fn tool_name_marker_name(&self) -> &str {
        last_segment(&self.markers.tool_name)
    }

    /// Last segment of the member marker path, used in messages.
    pub fn tool_description_marker_name(&self) -> &str {
        last_segment(&self.markers.tool_description)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            schema: None,
            markers: MarkerConfig::default(),
            host: HostMarkerConfig::default(),
            references: Vec::new(),
            receiver_naming: ReceiverNaming::default(),
            index_file: "mod.rs".into(),
        }
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

fn parse_attr_path(field: &str, value: &str) -> Result<syn::Path> {
    syn::parse_str::<syn::Path>(value).map_err(|e| {
        GeneratorError::InvalidConfig(format!("{field} must be an attribute path, got '{value}': {e}"))
    })
}

/// Path of the config file for a crate directory.
pub fn config_path(manifest_dir: &Path) -> PathBuf {
    manifest_dir.join(CONFIG_FILE)
}

/// Load the configuration for a crate directory.
///
/// Reads `fasttrack.json` when present, applies env overrides and validates.
pub fn load(manifest_dir: &Path) -> Result<GeneratorConfig> {
    let path = config_path(manifest_dir);
    let mut cfg = if path.exists() {
        let raw = std::fs::read_to_string(&path).map_err(|source| GeneratorError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| GeneratorError::Config {
            path: path.clone(),
            source,
        })?
    } else {
        GeneratorConfig::default()
    };

    apply_env_overrides(&mut cfg)?;
    cfg.validate()?;
    tracing::debug!(path = %path.display(), "loaded generator config");
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut GeneratorConfig) -> Result<()> {
    if let Some(v) = env_trimmed("FASTTRACK_RECEIVER_NAMING") {
        cfg.receiver_naming = v.parse()?;
    }
    Ok(())
}

/// Helper to read and normalize an env var (trim + filter empty).
fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// JSON Schema for `fasttrack.json`, pretty printed.
pub fn schema_json_pretty() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(GeneratorConfig);
    serde_json::to_string_pretty(&schema)
}
