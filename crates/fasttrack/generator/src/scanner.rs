//! Candidate discovery.
//!
//! Every struct, enum and union declaration in the compilation is a
//! candidate, including declarations that cannot be named from outside
//! (inside function bodies). Filtering happens later in the pipeline.

use std::path::Path;

use proc_macro2::Ident;
use syn::visit::{self, Visit};
use syn::{Attribute, Block, ItemEnum, ItemMod, ItemStruct, ItemUnion};

use crate::compilation::{Compilation, QualifiedPath};
use crate::diagnostics::Location;

/// The syntax node of a candidate declaration.
#[derive(Copy, Clone, Debug)]
pub enum DeclarationItem<'a> {
    Struct(&'a ItemStruct),
    Enum(&'a ItemEnum),
    Union(&'a ItemUnion),
}

impl<'a> DeclarationItem<'a> {
    pub fn ident(&self) -> &'a Ident {
        match self {
            Self::Struct(s) => &s.ident,
            Self::Enum(e) => &e.ident,
            Self::Union(u) => &u.ident,
        }
    }

    pub fn attrs(&self) -> &'a [Attribute] {
        match self {
            Self::Struct(s) => &s.attrs,
            Self::Enum(e) => &e.attrs,
            Self::Union(u) => &u.attrs,
        }
    }
}

/// A class-like declaration found in a source file.
#[derive(Clone, Debug)]
pub struct CandidateDeclaration<'a> {
    pub file: &'a Path,
    /// Enclosing module, `None` when declared inside a block.
    pub module: Option<QualifiedPath>,
    pub item: DeclarationItem<'a>,
}

impl CandidateDeclaration<'_> {
    pub fn name(&self) -> String {
        self.item.ident().to_string()
    }

    pub fn location(&self) -> Location {
        Location::from_span(self.file, self.item.ident().span())
    }

    /// Whether any attribute's last path segment is `name`, regardless of
    /// what it resolves to.
    pub fn mentions_attribute(&self, name: &str) -> bool {
        self.item.attrs().iter().any(|attr| {
            attr.path()
                .segments
                .last()
                .is_some_and(|seg| seg.ident == name)
        })
    }
}

/// All candidate declarations, in file order then source order.
pub fn scan(compilation: &Compilation) -> Vec<CandidateDeclaration<'_>> {
    let mut out = Vec::new();
    for file in compilation.files() {
        let mut scanner = Scanner {
            file: &file.path,
            module: file.module.clone(),
            block_depth: 0,
            out: Vec::new(),
        };
        scanner.visit_file(&file.syntax);
        out.append(&mut scanner.out);
    }
    tracing::trace!(candidates = out.len(), "scanned declarations");
    out
}

struct Scanner<'a> {
    file: &'a Path,
    module: QualifiedPath,
    block_depth: usize,
    out: Vec<CandidateDeclaration<'a>>,
}

impl<'a> Scanner<'a> {
    fn push(&mut self, item: DeclarationItem<'a>) {
        let module = (self.block_depth == 0).then(|| self.module.clone());
        self.out.push(CandidateDeclaration {
            file: self.file,
            module,
            item,
        });
    }
}

impl<'a> Visit<'a> for Scanner<'a> {
    fn visit_item_mod(&mut self, m: &'a ItemMod) {
        let outer = self.module.clone();
        self.module = outer.child(&m.ident.to_string());
        visit::visit_item_mod(self, m);
        self.module = outer;
    }

    fn visit_block(&mut self, b: &'a Block) {
        self.block_depth += 1;
        visit::visit_block(self, b);
        self.block_depth -= 1;
    }

    fn visit_item_struct(&mut self, s: &'a ItemStruct) {
        self.push(DeclarationItem::Struct(s));
        visit::visit_item_struct(self, s);
    }

    fn visit_item_enum(&mut self, e: &'a ItemEnum) {
        self.push(DeclarationItem::Enum(e));
        visit::visit_item_enum(self, e);
    }

    fn visit_item_union(&mut self, u: &'a ItemUnion) {
        self.push(DeclarationItem::Union(u));
        visit::visit_item_union(self, u);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::{SourceFile, module_for_file};

    fn compile(files: &[(&str, &str)]) -> Compilation {
        let files = files
            .iter()
            .map(|(name, text)| {
                let module = module_for_file(Path::new(name)).unwrap();
                SourceFile::parse(*name, module, text).unwrap()
            })
            .collect();
        Compilation::new("demo", files, [])
    }

    #[test]
    fn finds_every_class_like_declaration() {
        let c = compile(&[(
            "calc.rs",
            r"
            pub struct A;
            enum B { X }
            union C { x: u32 }
            mod inner { pub struct D; }
            fn f() { struct Hidden; }
            trait NotACandidate {}
            ",
        )]);
        let found: Vec<(String, Option<String>)> = scan(&c)
            .iter()
            .map(|c| (c.name(), c.module.as_ref().map(ToString::to_string)))
            .collect();
        assert_eq!(
            found,
            vec![
                ("A".into(), Some("crate::calc".into())),
                ("B".into(), Some("crate::calc".into())),
                ("C".into(), Some("crate::calc".into())),
                ("D".into(), Some("crate::calc::inner".into())),
                ("Hidden".into(), None),
            ]
        );
    }

    #[test]
    fn order_follows_file_paths() {
        let c = compile(&[("zeta.rs", "struct Z;"), ("alpha.rs", "struct A;")]);
        let names: Vec<String> = scan(&c).iter().map(CandidateDeclaration::name).collect();
        assert_eq!(names, vec!["A", "Z"]);
    }

    #[test]
    fn mentions_attribute_checks_last_segment() {
        let c = compile(&[("calc.rs", "#[other::tool_name] struct A;")]);
        let candidates = scan(&c);
        assert!(candidates[0].mentions_attribute("tool_name"));
        assert!(!candidates[0].mentions_attribute("tool_description"));
    }

    #[test]
    fn location_points_at_the_name() {
        let c = compile(&[("calc.rs", "\npub struct Calculator;")]);
        let location = scan(&c)[0].location();
        assert_eq!(location.line, 2);
        assert_eq!(location.column, 12);
    }
}
