//! Marker symbol resolution and attribute identity checks.

use syn::Attribute;

use crate::compilation::{Compilation, QualifiedPath, Resolve};
use crate::config::MarkerConfig;
use crate::diagnostics::Diagnostic;

/// The two marker attributes, resolved once per compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkerSymbols {
    pub tool_name: QualifiedPath,
    pub tool_description: QualifiedPath,
}

impl MarkerSymbols {
    /// Resolve both markers. Fails with a single compilation-wide diagnostic
    /// naming every marker that is missing.
    pub fn resolve(compilation: &Compilation, markers: &MarkerConfig) -> Result<Self, Diagnostic> {
        let tool_name = compilation.type_by_metadata_name(&markers.tool_name);
        let tool_description = compilation.type_by_metadata_name(&markers.tool_description);
        match (tool_name, tool_description) {
            (Some(tool_name), Some(tool_description)) => Ok(Self {
                tool_name,
                tool_description,
            }),
            (tool_name, tool_description) => {
                let mut missing = Vec::new();
                if tool_name.is_none() {
                    missing.push(markers.tool_name.clone());
                }
                if tool_description.is_none() {
                    missing.push(markers.tool_description.clone());
                }
                Err(Diagnostic::marker_types_unresolved(&missing))
            }
        }
    }
}

/// First attribute in `attrs` that resolves, from `module`, to `marker`.
pub fn find_marker<'a>(
    compilation: &Compilation,
    module: &QualifiedPath,
    attrs: &'a [Attribute],
    marker: &QualifiedPath,
) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| {
        compilation
            .resolve_path(module, attr.path(), Resolve::Identity)
            .is_some_and(|resolved| &resolved == marker)
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::compilation::{Reference, SourceFile, module_for_file};

    fn compile(text: &str, references: Vec<Reference>) -> Compilation {
        let module = module_for_file(Path::new("calc.rs")).unwrap();
        let file = SourceFile::parse("calc.rs", module, text).unwrap();
        Compilation::new("demo", vec![file], references)
    }

    fn struct_attrs(c: &Compilation) -> &[Attribute] {
        match &c.files()[0].syntax.items[1] {
            syn::Item::Struct(s) => &s.attrs,
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn unresolved_markers_yield_one_diagnostic() {
        let c = compile("", vec![]);
        let err = MarkerSymbols::resolve(&c, &MarkerConfig::default()).unwrap_err();
        assert!(err.message.contains("fasttrack_markers::tool_name"));
        assert!(err.message.contains("fasttrack_markers::tool_description"));
    }

    #[test]
    fn marker_found_through_alias() {
        let c = compile(
            "use fasttrack_markers::tool_name as tool;\n#[derive(Debug)] #[tool(\"X\")] struct S;",
            vec![Reference::opaque("fasttrack_markers")],
        );
        let markers = MarkerSymbols::resolve(&c, &MarkerConfig::default()).unwrap();
        let module = QualifiedPath::parse("crate::calc").unwrap();
        let attr = find_marker(&c, &module, struct_attrs(&c), &markers.tool_name).unwrap();
        assert!(attr.path().is_ident("tool"));
    }

    #[test]
    fn lookalike_marker_is_ignored() {
        let c = compile(
            "use other::tool_name;\n#[tool_name(\"X\")] struct S;",
            vec![Reference::opaque("fasttrack_markers"), Reference::opaque("other")],
        );
        let markers = MarkerSymbols::resolve(&c, &MarkerConfig::default()).unwrap();
        let module = QualifiedPath::parse("crate::calc").unwrap();
        assert!(find_marker(&c, &module, struct_attrs(&c), &markers.tool_name).is_none());
    }
}
