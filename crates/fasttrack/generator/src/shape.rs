//! Final gates before emission.

use proc_macro2::Ident;

use crate::compilation::QualifiedPath;
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Location};
use crate::extractor::{ClassDraft, MethodInfo};

/// Everything the emitter needs for one wrapper.
///
/// Only built by [`check_shape`], so a value always has a namespace, at least
/// one method and a tool name that forms an identifier.
#[derive(Clone, Debug)]
pub struct ResolvedClassInfo {
    tool_name: String,
    class_name: String,
    namespace: String,
    source: QualifiedPath,
    methods: Vec<MethodInfo>,
    location: Location,
}

impl ResolvedClassInfo {
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Module path of the source type below the crate root.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn source(&self) -> &QualifiedPath {
        &self.source
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Name of the generated wrapper type.
    pub fn wrapper_name(&self) -> String {
        wrapper_name(&self.tool_name)
    }
}

pub fn wrapper_name(tool_name: &str) -> String {
    format!("{tool_name}Tools")
}

/// Gate a draft: it needs marked methods, a namespace and a usable name.
pub fn check_shape(draft: ClassDraft, config: &GeneratorConfig) -> Result<ResolvedClassInfo, Diagnostic> {
    if draft.methods.is_empty() {
        return Err(Diagnostic::no_qualifying_members(
            &draft.class_name,
            config.tool_description_marker_name(),
            draft.location,
        ));
    }
    let namespace = draft.symbol.module.namespace();
    if namespace.is_empty() {
        return Err(Diagnostic::missing_namespace(&draft.class_name, draft.location));
    }
    if syn::parse_str::<Ident>(&wrapper_name(&draft.tool_name)).is_err() {
        return Err(Diagnostic::invalid_tool_name(
            &draft.class_name,
            &draft.tool_name,
            draft.location,
        ));
    }
    Ok(ResolvedClassInfo {
        tool_name: draft.tool_name,
        class_name: draft.class_name,
        namespace,
        source: draft.symbol.path,
        methods: draft.methods,
        location: draft.location,
    })
}

#[cfg(test)]
pub(crate) fn resolved_for_tests(
    tool_name: &str,
    source: &str,
    methods: Vec<MethodInfo>,
) -> ResolvedClassInfo {
    let source = QualifiedPath::parse(source).unwrap();
    ResolvedClassInfo {
        tool_name: tool_name.into(),
        class_name: source.last().into(),
        namespace: source.parent().unwrap().namespace(),
        source,
        methods,
        location: Location {
            file: "src/lib.rs".into(),
            line: 1,
            column: 1,
        },
    }
}
