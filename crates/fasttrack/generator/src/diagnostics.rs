//! Structured diagnostics reported by the generation pipeline.
//!
//! Validation problems never abort generation. Each one becomes a
//! [`Diagnostic`] carrying a stable identifier, a severity, a message naming
//! the offending declaration and, when one exists, its source location.

use std::fmt;
use std::path::{Path, PathBuf};

/// Stable identifiers for every diagnostic the generator can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticId {
    /// A type declaration could not be resolved to a symbol.
    SymbolNotFound,
    /// The marker attributes are not known to the compilation.
    MarkerTypesUnresolved,
    /// A type declaration carries no type marker.
    MissingToolNameMarker,
    /// A marked type has no marked methods.
    NoQualifyingMembers,
    /// A marked type is declared at the crate root.
    MissingNamespace,
    /// A marked method has no `self` receiver to forward through.
    ReceiverlessMember,
    /// Two marked types produce the same wrapper name.
    DuplicateToolName,
    /// The tool name does not form a Rust identifier.
    InvalidToolName,
    /// A source file failed to parse.
    SourceParseFailed,
    /// The wrapper tokens could not be rendered into a file.
    EmissionFailed,
}

impl DiagnosticId {
    pub const fn code(self) -> &'static str {
        match self {
            Self::SymbolNotFound => "FTG100",
            Self::MarkerTypesUnresolved => "FTG101",
            Self::MissingToolNameMarker => "FTG102",
            Self::NoQualifyingMembers => "FTG103",
            Self::MissingNamespace => "FTG104",
            Self::ReceiverlessMember => "FTG105",
            Self::DuplicateToolName => "FTG106",
            Self::InvalidToolName => "FTG107",
            Self::SourceParseFailed => "FTG108",
            Self::EmissionFailed => "FTG109",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::SymbolNotFound => "Type symbol not found",
            Self::MarkerTypesUnresolved => "Marker types not found",
            Self::MissingToolNameMarker => "Tool marker missing",
            Self::NoQualifyingMembers => "No tool methods found",
            Self::MissingNamespace => "Missing namespace",
            Self::ReceiverlessMember => "Tool method without receiver",
            Self::DuplicateToolName => "Duplicate tool name",
            Self::InvalidToolName => "Invalid tool name",
            Self::SourceParseFailed => "Source file not parsed",
            Self::EmissionFailed => "Wrapper not rendered",
        }
    }
}

impl fmt::Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Severity level for diagnostics.
///
/// `Hidden` diagnostics are part of the structured output but are not
/// surfaced to the build log.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Whether a build script should print this as a `cargo:warning`.
    pub const fn is_surfaced(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => write!(f, "hidden"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A position inside a source file (1-based line, 1-based column).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Location of the start of `span` inside `file`.
    pub fn from_span(file: &Path, span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            file: file.to_path_buf(),
            line: start.line,
            column: start.column + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// One reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub severity: Severity,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    pub fn new(
        id: DiagnosticId,
        severity: Severity,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> Self {
        Self {
            id,
            severity,
            message: message.into(),
            location,
        }
    }

    pub fn symbol_not_found(name: &str, severity: Severity, location: Location) -> Self {
        Self::new(
            DiagnosticId::SymbolNotFound,
            severity,
            format!("Type symbol could not be resolved for '{name}'"),
            Some(location),
        )
    }

    pub fn marker_types_unresolved(missing: &[String]) -> Self {
        let list = missing
            .iter()
            .map(|m| format!("'{m}'"))
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            DiagnosticId::MarkerTypesUnresolved,
            Severity::Warning,
            format!("Required marker types could not be resolved: {list}"),
            None,
        )
    }

    pub fn missing_tool_name_marker(name: &str, marker: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::MissingToolNameMarker,
            Severity::Hidden,
            format!("Type '{name}' does not have the required #[{marker}] marker."),
            Some(location),
        )
    }

    pub fn no_qualifying_members(name: &str, marker: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::NoQualifyingMembers,
            Severity::Info,
            format!("Type '{name}' does not have any methods with the #[{marker}] marker."),
            Some(location),
        )
    }

    pub fn missing_namespace(name: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::MissingNamespace,
            Severity::Warning,
            format!("Type '{name}' does not have a valid namespace."),
            Some(location),
        )
    }

    pub fn receiverless_member(name: &str, method: &str, marker: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::ReceiverlessMember,
            Severity::Warning,
            format!(
                "Method '{name}::{method}' is marked with #[{marker}] but has no self receiver; it is skipped."
            ),
            Some(location),
        )
    }

    pub fn duplicate_tool_name(name: &str, wrapper: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::DuplicateToolName,
            Severity::Warning,
            format!("Type '{name}' would generate '{wrapper}', which an earlier type already generates."),
            Some(location),
        )
    }

    pub fn invalid_tool_name(name: &str, tool_name: &str, location: Location) -> Self {
        Self::new(
            DiagnosticId::InvalidToolName,
            Severity::Warning,
            format!("Tool name '{tool_name}' of type '{name}' does not form a valid identifier."),
            Some(location),
        )
    }

    pub fn source_parse_failed(file: &Path, err: &syn::Error) -> Self {
        Self::new(
            DiagnosticId::SourceParseFailed,
            Severity::Error,
            format!("Source file could not be parsed: {err}"),
            Some(Location::from_span(file, err.span())),
        )
    }

    pub fn emission_failed(name: &str, err: &syn::Error, location: Location) -> Self {
        Self::new(
            DiagnosticId::EmissionFailed,
            Severity::Error,
            format!("Wrapper for type '{name}' could not be rendered: {err}"),
            Some(location),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)?;
        if let Some(location) = &self.location {
            write!(f, "\n  --> {location}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DiagnosticId::SymbolNotFound.code(), "FTG100");
        assert_eq!(DiagnosticId::MarkerTypesUnresolved.code(), "FTG101");
        assert_eq!(DiagnosticId::MissingToolNameMarker.code(), "FTG102");
        assert_eq!(DiagnosticId::NoQualifyingMembers.code(), "FTG103");
        assert_eq!(DiagnosticId::MissingNamespace.code(), "FTG104");
    }

    #[test]
    fn display_includes_location() {
        let diag = Diagnostic::missing_namespace(
            "Greeting",
            Location {
                file: PathBuf::from("src/lib.rs"),
                line: 3,
                column: 1,
            },
        );
        assert_eq!(
            diag.to_string(),
            "warning[FTG104]: Type 'Greeting' does not have a valid namespace.\n  --> src/lib.rs:3:1"
        );
    }

    #[test]
    fn compilation_wide_diagnostic_has_no_location() {
        let diag = Diagnostic::marker_types_unresolved(&["fasttrack_markers::tool_name".into()]);
        assert!(diag.location.is_none());
        assert!(diag.to_string().contains("'fasttrack_markers::tool_name'"));
    }

    #[test]
    fn only_warnings_and_errors_surface() {
        assert!(!Severity::Hidden.is_surfaced());
        assert!(!Severity::Info.is_surfaced());
        assert!(Severity::Warning.is_surfaced());
        assert!(Severity::Error.is_surfaced());
    }
}
