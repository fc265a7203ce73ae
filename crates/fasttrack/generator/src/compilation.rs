//! Semantic model over the parsed sources of one crate.
//!
//! A [`Compilation`] knows which modules exist, what each module declares and
//! imports, which inherent `impl` blocks belong to which type, and which
//! crates are referenced. Paths written in the sources resolve against it to
//! [`QualifiedPath`]s, so two attributes are "the same marker" only when they
//! resolve to the same item, whatever name or alias they are written with.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use proc_macro2::{Ident, Span};
use syn::{Attribute, Item, UseTree};

/// First segment of every path local to the compiled crate.
pub const CRATE: &str = "crate";

/// Bound on import/re-export chains followed during resolution.
const MAX_DEPTH: usize = 16;

/// Absolute path of an item.
///
/// Local items start with `crate`; items of referenced crates start with the
/// crate name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedPath(Vec<String>);

impl QualifiedPath {
    pub fn crate_root() -> Self {
        Self(vec![CRATE.to_string()])
    }

    /// Parse a fully qualified path such as `fasttrack_markers::tool_name`.
    ///
    /// At least two segments are required and the path must not start with
    /// `self`, `super` or `Self`.
    pub fn parse(s: &str) -> Option<Self> {
        let path: syn::Path = syn::parse_str(s).ok()?;
        if path.segments.len() < 2 || path.segments.iter().any(|seg| !seg.arguments.is_none()) {
            return None;
        }
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if matches!(segments[0].as_str(), "self" | "super" | "Self") {
            return None;
        }
        Some(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    pub fn is_local(&self) -> bool {
        self.0.first().is_some_and(|s| s == CRATE)
    }

    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    pub fn join(&self, rest: &[String]) -> Self {
        let mut segments = self.0.clone();
        segments.extend(rest.iter().cloned());
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Module path below the crate root, `calc::ops` for `crate::calc::ops`.
    /// Empty for the crate root.
    pub fn namespace(&self) -> String {
        if self.is_local() {
            self.0[1..].join("::")
        } else {
            self.0.join("::")
        }
    }

    /// Path usable from anywhere in the crate: `crate::a::B` or `::dep::B`.
    pub fn to_syn_path(&self) -> syn::Path {
        let leading_colon = (!self.is_local()).then(Default::default);
        syn::Path {
            leading_colon,
            segments: self
                .0
                .iter()
                .map(|s| syn::PathSegment::from(make_ident(s)))
                .collect(),
        }
    }
}

impl fmt::Display for QualifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

/// Build an identifier from its textual form, honouring `r#` raw identifiers.
pub fn make_ident(s: &str) -> Ident {
    match s.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(s, Span::call_site()),
    }
}

/// The `#[cfg(...)]` attributes among `attrs`, as outer attributes.
pub fn cfg_attributes(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("cfg"))
        .map(|attr| Attribute {
            style: syn::AttrStyle::Outer,
            ..attr.clone()
        })
        .collect()
}

/// Module path contributed by a file, given its path relative to the source
/// root: `lib.rs` is the crate root, `a.rs` and `a/mod.rs` are `crate::a`.
pub fn module_for_file(relative: &Path) -> Option<QualifiedPath> {
    let mut segments = vec![CRATE.to_string()];
    let components: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    let (file, dirs) = components.split_last()?;
    let stem = file.strip_suffix(".rs")?;
    segments.extend(dirs.iter().map(|d| (*d).to_string()));
    match stem {
        "lib" | "main" if dirs.is_empty() => {}
        "mod" if !dirs.is_empty() => {}
        _ => segments.push(stem.to_string()),
    }
    Some(QualifiedPath(segments))
}

/// One parsed source file.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module: QualifiedPath,
    pub syntax: syn::File,
}

impl SourceFile {
    pub fn parse(path: impl Into<PathBuf>, module: QualifiedPath, text: &str) -> syn::Result<Self> {
        Ok(Self {
            path: path.into(),
            module,
            syntax: syn::parse_file(text)?,
        })
    }
}

/// A crate the compilation references.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub name: String,
    /// Exported item paths relative to the crate root (`tool_name`,
    /// `server::Tool`). `None` means every path is assumed to exist.
    pub exports: Option<BTreeSet<String>>,
}

impl Reference {
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: None,
        }
    }

    fn exports(&self, rest: &[String]) -> bool {
        match &self.exports {
            None => true,
            Some(_) if rest.is_empty() => true,
            Some(exports) => exports.contains(&rest.join("::")),
        }
    }
}

/// How glob imports and re-exports are treated during resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolve {
    /// Resolve to the canonical item, following re-exports and trusting glob
    /// imports of opaque crates. Used for symbol identity.
    Identity,
    /// Resolve only what is certain and keep paths as the source wrote them
    /// past the first segment. Used when rendering types.
    Qualify,
}

#[derive(Clone, Debug)]
struct UseTarget {
    leading_colon: bool,
    segments: Vec<String>,
}

#[derive(Debug, Default)]
struct ModuleScope {
    imports: BTreeMap<String, UseTarget>,
    globs: Vec<UseTarget>,
    /// Declarations in the type namespace, with their count.
    types: BTreeMap<String, usize>,
    /// Every named item, any namespace.
    items: BTreeSet<String>,
    /// `#[cfg]` attributes on the module's own declaration.
    cfgs: Vec<Attribute>,
    /// `#![cfg]` attributes at the top of the module's file.
    file_cfgs: Vec<Attribute>,
}

impl ModuleScope {
    fn declare_type(&mut self, ident: &Ident) {
        let name = ident.to_string();
        *self.types.entry(name.clone()).or_default() += 1;
        self.items.insert(name);
    }

    fn declare_value(&mut self, ident: &Ident) {
        self.items.insert(ident.to_string());
    }
}

/// An inherent `impl` block with the module it appears in.
#[derive(Debug)]
pub struct ImplBlock {
    pub file: PathBuf,
    pub module: QualifiedPath,
    pub item: syn::ItemImpl,
    owner: Option<QualifiedPath>,
}

/// Why a declaration did not resolve to a symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unresolved {
    /// Declared inside a function body or block.
    NotAddressable,
    /// More than one type-namespace item with the same path.
    Ambiguous,
}

/// A resolved type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSymbol {
    pub path: QualifiedPath,
    pub module: QualifiedPath,
    pub name: String,
}

/// The semantic model of one crate.
#[derive(Debug)]
pub struct Compilation {
    crate_name: String,
    files: Vec<SourceFile>,
    references: BTreeMap<String, Reference>,
    modules: BTreeMap<QualifiedPath, ModuleScope>,
    impls: Vec<ImplBlock>,
}

impl Compilation {
    /// Index `files` (sorted by path) against `references`.
    pub fn new(
        crate_name: impl Into<String>,
        mut files: Vec<SourceFile>,
        references: impl IntoIterator<Item = Reference>,
    ) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let mut compilation = Self {
            crate_name: crate_name.into(),
            files: Vec::new(),
            references: references
                .into_iter()
                .map(|r| (r.name.clone(), r))
                .collect(),
            modules: BTreeMap::new(),
            impls: Vec::new(),
        };
        compilation.modules.insert(QualifiedPath::crate_root(), ModuleScope::default());
        for file in &files {
            compilation
                .modules
                .entry(file.module.clone())
                .or_default()
                .file_cfgs
                .extend(cfg_attributes(&file.syntax.attrs));
            compilation.index_items(&file.path, &file.module, &file.syntax.items);
        }
        compilation.files = files;

        let owners: Vec<Option<QualifiedPath>> = compilation
            .impls
            .iter()
            .map(|block| compilation.impl_owner(block))
            .collect();
        for (block, owner) in compilation.impls.iter_mut().zip(owners) {
            block.owner = owner;
        }
        compilation
    }

    pub fn crate_name(&self) -> &str {
        &self.crate_name
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    fn index_items(&mut self, file: &Path, module: &QualifiedPath, items: &[Item]) {
        let mut nested = Vec::new();
        let mut gated = Vec::new();
        let scope = self.modules.entry(module.clone()).or_default();
        for item in items {
            match item {
                Item::Mod(m) => {
                    scope.declare_type(&m.ident);
                    let cfgs = cfg_attributes(&m.attrs);
                    if !cfgs.is_empty() {
                        gated.push((module.child(&m.ident.to_string()), cfgs));
                    }
                    if let Some((_, inner)) = &m.content {
                        nested.push((module.child(&m.ident.to_string()), inner));
                    }
                }
                Item::Struct(s) => scope.declare_type(&s.ident),
                Item::Enum(e) => scope.declare_type(&e.ident),
                Item::Union(u) => scope.declare_type(&u.ident),
                Item::Trait(t) => scope.declare_type(&t.ident),
                Item::TraitAlias(t) => scope.declare_type(&t.ident),
                Item::Type(t) => scope.declare_type(&t.ident),
                Item::Fn(f) => scope.declare_value(&f.sig.ident),
                Item::Const(c) => scope.declare_value(&c.ident),
                Item::Static(s) => scope.declare_value(&s.ident),
                Item::Macro(m) => {
                    if let Some(ident) = &m.ident {
                        scope.declare_value(ident);
                    }
                }
                Item::Use(u) => {
                    collect_use(&u.tree, Vec::new(), u.leading_colon.is_some(), scope);
                }
                Item::ExternCrate(e) => {
                    let name = e.rename.as_ref().map_or(&e.ident, |(_, rename)| rename);
                    let target = if e.ident == "self" {
                        UseTarget {
                            leading_colon: false,
                            segments: vec![CRATE.to_string()],
                        }
                    } else {
                        UseTarget {
                            leading_colon: true,
                            segments: vec![e.ident.to_string()],
                        }
                    };
                    scope.imports.insert(name.to_string(), target);
                }
                Item::Impl(i) if i.trait_.is_none() => self.impls.push(ImplBlock {
                    file: file.to_path_buf(),
                    module: module.clone(),
                    item: i.clone(),
                    owner: None,
                }),
                _ => {}
            }
        }
        for (child, cfgs) in gated {
            self.modules.entry(child).or_default().cfgs.extend(cfgs);
        }
        for (child, inner) in nested {
            self.index_items(file, &child, inner);
        }
    }

    fn impl_owner(&self, block: &ImplBlock) -> Option<QualifiedPath> {
        let syn::Type::Path(tp) = &*block.item.self_ty else {
            return None;
        };
        if tp.qself.is_some() {
            return None;
        }
        self.resolve_path(&block.module, &tp.path, Resolve::Identity)
    }

    /// Inherent impl blocks of `ty`, in compilation order.
    pub fn inherent_impls<'a>(&'a self, ty: &'a QualifiedPath) -> impl Iterator<Item = &'a ImplBlock> {
        self.impls
            .iter()
            .filter(move |block| block.owner.as_ref() == Some(ty))
    }

    /// `#[cfg]` attributes gating `module`, outermost module first.
    ///
    /// Covers `#[cfg] mod x;` declarations, inline modules and `#![cfg]`
    /// at the top of a module's file.
    pub fn module_cfgs(&self, module: &QualifiedPath) -> Vec<Attribute> {
        let mut chain = Vec::new();
        let mut current = Some(module.clone());
        while let Some(path) = current {
            current = path.parent();
            chain.push(path);
        }
        chain
            .iter()
            .rev()
            .filter_map(|path| self.modules.get(path))
            .flat_map(|scope| scope.cfgs.iter().chain(&scope.file_cfgs).cloned())
            .collect()
    }

    /// Resolve the declaration `name` in `module` to a type symbol.
    pub fn declared_type(
        &self,
        module: Option<&QualifiedPath>,
        name: &Ident,
    ) -> Result<TypeSymbol, Unresolved> {
        let module = module.ok_or(Unresolved::NotAddressable)?;
        let name = name.to_string();
        let count = self
            .modules
            .get(module)
            .and_then(|scope| scope.types.get(&name))
            .copied()
            .unwrap_or_default();
        match count {
            0 => Err(Unresolved::NotAddressable),
            1 => Ok(TypeSymbol {
                path: module.child(&name),
                module: module.clone(),
                name,
            }),
            _ => Err(Unresolved::Ambiguous),
        }
    }

    /// Resolve a fully qualified item name, as in "get type by metadata name".
    pub fn type_by_metadata_name(&self, name: &str) -> Option<QualifiedPath> {
        let path = QualifiedPath::parse(name)?;
        let path = self.canonicalize(path, 0)?;
        self.exists(&path, true).then_some(path)
    }

    /// Resolve `path` as written in `module`.
    pub fn resolve_path(
        &self,
        module: &QualifiedPath,
        path: &syn::Path,
        mode: Resolve,
    ) -> Option<QualifiedPath> {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        self.resolve_segments(module, path.leading_colon.is_some(), &segments, mode, 0)
    }

    /// Absolute replacement for the leading segments of `path` written in
    /// `module`, and how many segments it replaces.
    ///
    /// `None` when the path is already absolute or names something this
    /// compilation does not know (generic parameters, prelude, primitives).
    pub fn qualify_prefix(&self, module: &QualifiedPath, path: &syn::Path) -> Option<(QualifiedPath, usize)> {
        if path.leading_colon.is_some() {
            return None;
        }
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let (first, _) = segments.split_first()?;
        match first.as_str() {
            CRATE => None,
            "self" | "super" => {
                let mut base = module.clone();
                let mut consumed = 0;
                for seg in &segments {
                    match seg.as_str() {
                        "self" if consumed == 0 => {}
                        "super" => base = base.parent()?,
                        _ => break,
                    }
                    consumed += 1;
                }
                Some((base, consumed))
            }
            "Self" => None,
            name => self
                .lookup_name(module, name, Resolve::Qualify, 0)
                .map(|path| (path, 1)),
        }
    }

    fn resolve_segments(
        &self,
        module: &QualifiedPath,
        leading_colon: bool,
        segments: &[String],
        mode: Resolve,
        depth: usize,
    ) -> Option<QualifiedPath> {
        if depth > MAX_DEPTH {
            return None;
        }
        let (first, mut rest) = segments.split_first()?;
        let mut base = if leading_colon {
            QualifiedPath(vec![first.clone()])
        } else {
            match first.as_str() {
                CRATE => QualifiedPath::crate_root(),
                "self" => module.clone(),
                "super" => module.parent()?,
                "Self" => return None,
                name => self.lookup_name(module, name, mode, depth + 1)?,
            }
        };
        while let Some((seg, tail)) = rest.split_first() {
            if seg != "super" {
                break;
            }
            base = base.parent()?;
            rest = tail;
        }
        let joined = base.join(rest);
        match mode {
            Resolve::Identity => self.canonicalize(joined, depth + 1),
            Resolve::Qualify => Some(joined),
        }
    }

    fn lookup_name(
        &self,
        module: &QualifiedPath,
        name: &str,
        mode: Resolve,
        depth: usize,
    ) -> Option<QualifiedPath> {
        if depth > MAX_DEPTH {
            return None;
        }
        if let Some(scope) = self.modules.get(module) {
            if let Some(target) = scope.imports.get(name) {
                return self.resolve_use_target(module, target, mode, depth + 1);
            }
            if scope.items.contains(name) {
                return Some(module.child(name));
            }
            for glob in &scope.globs {
                let Some(prefix) = self.resolve_use_target(module, glob, mode, depth + 1) else {
                    continue;
                };
                let candidate = prefix.child(name);
                if self.exists(&candidate, mode == Resolve::Identity) {
                    return Some(candidate);
                }
            }
        }
        self.references
            .contains_key(name)
            .then(|| QualifiedPath(vec![name.to_string()]))
    }

    /// `use` paths that name nothing known refer to an external crate.
    fn resolve_use_target(
        &self,
        module: &QualifiedPath,
        target: &UseTarget,
        mode: Resolve,
        depth: usize,
    ) -> Option<QualifiedPath> {
        if target.leading_colon {
            let path = QualifiedPath(target.segments.clone());
            return match mode {
                Resolve::Identity => self.canonicalize(path, depth + 1),
                Resolve::Qualify => Some(path),
            };
        }
        let first = target.segments.first()?;
        let resolved = self.resolve_segments(module, false, &target.segments, mode, depth + 1);
        if resolved.is_some() || matches!(first.as_str(), CRATE | "self" | "super") {
            return resolved;
        }
        Some(QualifiedPath(target.segments.clone()))
    }

    /// Follow local re-exports until the path names the declaring module.
    fn canonicalize(&self, path: QualifiedPath, depth: usize) -> Option<QualifiedPath> {
        if depth > MAX_DEPTH {
            return None;
        }
        if !path.is_local() {
            return Some(path);
        }
        for i in 1..path.0.len() {
            let module = QualifiedPath(path.0[..i].to_vec());
            let Some(scope) = self.modules.get(&module) else {
                return Some(path);
            };
            let name = &path.0[i];
            if scope.items.contains(name) {
                continue;
            }
            let rest = &path.0[i + 1..];
            if let Some(target) = scope.imports.get(name) {
                let resolved = self.resolve_use_target(&module, target, Resolve::Identity, depth + 1)?;
                return self.canonicalize(resolved.join(rest), depth + 1);
            }
            for glob in &scope.globs {
                let Some(prefix) = self.resolve_use_target(&module, glob, Resolve::Identity, depth + 1)
                else {
                    continue;
                };
                let candidate = prefix.child(name);
                if self.exists(&candidate, true) {
                    return self.canonicalize(candidate.join(rest), depth + 1);
                }
            }
            return Some(path);
        }
        Some(path)
    }

    /// Whether `path` names a known item. Opaque references count only when
    /// `trust_opaque` is set.
    fn exists(&self, path: &QualifiedPath, trust_opaque: bool) -> bool {
        if path.is_local() {
            if self.modules.contains_key(path) {
                return true;
            }
            return path
                .parent()
                .and_then(|parent| self.modules.get(&parent))
                .is_some_and(|scope| scope.items.contains(path.last()));
        }
        let Some((krate, rest)) = path.0.split_first() else {
            return false;
        };
        self.references.get(krate).is_some_and(|reference| {
            (trust_opaque || reference.exports.is_some()) && reference.exports(rest)
        })
    }
}

fn collect_use(tree: &UseTree, prefix: Vec<String>, leading_colon: bool, scope: &mut ModuleScope) {
    match tree {
        UseTree::Path(p) => {
            let mut prefix = prefix;
            prefix.push(p.ident.to_string());
            collect_use(&p.tree, prefix, leading_colon, scope);
        }
        UseTree::Name(n) => {
            let (name, segments) = if n.ident == "self" {
                (prefix.last().cloned(), prefix)
            } else {
                let mut segments = prefix;
                segments.push(n.ident.to_string());
                (Some(n.ident.to_string()), segments)
            };
            if let Some(name) = name {
                scope.imports.insert(
                    name,
                    UseTarget {
                        leading_colon,
                        segments,
                    },
                );
            }
        }
        UseTree::Rename(r) => {
            if r.rename == "_" {
                return;
            }
            let mut segments = prefix;
            if r.ident != "self" {
                segments.push(r.ident.to_string());
            }
            scope.imports.insert(
                r.rename.to_string(),
                UseTarget {
                    leading_colon,
                    segments,
                },
            );
        }
        UseTree::Glob(_) => scope.globs.push(UseTarget {
            leading_colon,
            segments: prefix,
        }),
        UseTree::Group(g) => {
            for item in &g.items {
                collect_use(item, prefix.clone(), leading_colon, scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quote::ToTokens;

    use super::*;

    fn path(s: &str) -> QualifiedPath {
        QualifiedPath::parse(s).unwrap()
    }

    fn file(name: &str, text: &str) -> SourceFile {
        let module = module_for_file(Path::new(name)).unwrap();
        SourceFile::parse(name, module, text).unwrap()
    }

    fn compile(files: Vec<SourceFile>) -> Compilation {
        Compilation::new("demo", files, [Reference::opaque("fasttrack_markers")])
    }

    fn syn_path(s: &str) -> syn::Path {
        syn::parse_str(s).unwrap()
    }

    #[test]
    fn module_paths_follow_file_layout() {
        assert_eq!(module_for_file(Path::new("lib.rs")), Some(QualifiedPath::crate_root()));
        assert_eq!(module_for_file(Path::new("main.rs")), Some(QualifiedPath::crate_root()));
        assert_eq!(module_for_file(Path::new("calc.rs")), Some(path("crate::calc")));
        assert_eq!(module_for_file(Path::new("calc/mod.rs")), Some(path("crate::calc")));
        assert_eq!(module_for_file(Path::new("calc/ops.rs")), Some(path("crate::calc::ops")));
        assert_eq!(module_for_file(Path::new("calc/lib.rs")), Some(path("crate::calc::lib")));
        assert_eq!(module_for_file(Path::new("notes.txt")), None);
    }

    #[test]
    fn qualified_path_rejects_relative_forms() {
        assert!(QualifiedPath::parse("tool_name").is_none());
        assert!(QualifiedPath::parse("self::tool_name").is_none());
        assert!(QualifiedPath::parse("a::b<T>").is_none());
        assert_eq!(path("crate::calc::X").namespace(), "calc");
        assert_eq!(QualifiedPath::crate_root().namespace(), "");
    }

    #[test]
    fn resolves_imports_renames_and_groups() {
        let c = compile(vec![file(
            "calc.rs",
            r"
            use fasttrack_markers::{tool_name, tool_description as describe};
            use fasttrack_markers as ft;
            ",
        )]);
        let module = path("crate::calc");
        let resolve = |s: &str| c.resolve_path(&module, &syn_path(s), Resolve::Identity);
        assert_eq!(resolve("tool_name"), Some(path("fasttrack_markers::tool_name")));
        assert_eq!(resolve("describe"), Some(path("fasttrack_markers::tool_description")));
        assert_eq!(resolve("ft::tool_name"), Some(path("fasttrack_markers::tool_name")));
        assert_eq!(
            resolve("fasttrack_markers::tool_name"),
            Some(path("fasttrack_markers::tool_name"))
        );
        assert_eq!(resolve("unknown_attr"), None);
    }

    #[test]
    fn same_name_from_another_crate_is_a_different_symbol() {
        let c = Compilation::new(
            "demo",
            vec![file("calc.rs", "use other_markers::tool_name;")],
            [Reference::opaque("fasttrack_markers"), Reference::opaque("other_markers")],
        );
        let resolved = c.resolve_path(&path("crate::calc"), &syn_path("tool_name"), Resolve::Identity);
        assert_eq!(resolved, Some(path("other_markers::tool_name")));
        assert_ne!(resolved, c.type_by_metadata_name("fasttrack_markers::tool_name"));
    }

    #[test]
    fn follows_local_reexports() {
        let c = compile(vec![
            file("lib.rs", "mod prelude; mod calc;"),
            file("prelude.rs", "pub use fasttrack_markers::tool_name as name;"),
            file("calc.rs", "use crate::prelude::name;"),
        ]);
        let resolved = c.resolve_path(&path("crate::calc"), &syn_path("name"), Resolve::Identity);
        assert_eq!(resolved, Some(path("fasttrack_markers::tool_name")));
    }

    #[test]
    fn glob_imports_of_opaque_crates_only_count_for_identity() {
        let c = compile(vec![file("calc.rs", "use fasttrack_markers::*;")]);
        let module = path("crate::calc");
        assert_eq!(
            c.resolve_path(&module, &syn_path("tool_name"), Resolve::Identity),
            Some(path("fasttrack_markers::tool_name"))
        );
        assert_eq!(c.qualify_prefix(&module, &syn_path("String")), None);
    }

    #[test]
    fn metadata_name_requires_a_reference() {
        let c = Compilation::new("demo", vec![file("lib.rs", "")], []);
        assert_eq!(c.type_by_metadata_name("fasttrack_markers::tool_name"), None);

        let c = compile(vec![file("lib.rs", "")]);
        assert_eq!(
            c.type_by_metadata_name("fasttrack_markers::tool_name"),
            Some(path("fasttrack_markers::tool_name"))
        );
    }

    #[test]
    fn explicit_exports_are_checked() {
        let exports = ["tool_name".to_string()].into_iter().collect();
        let c = Compilation::new(
            "demo",
            vec![file("lib.rs", "")],
            [Reference {
                name: "fasttrack_markers".into(),
                exports: Some(exports),
            }],
        );
        assert!(c.type_by_metadata_name("fasttrack_markers::tool_name").is_some());
        assert!(c.type_by_metadata_name("fasttrack_markers::tool_description").is_none());
    }

    #[test]
    fn declared_types_resolve_unless_ambiguous() {
        let c = compile(vec![file(
            "calc.rs",
            r"
            pub struct Calculator;
            pub struct Twice;
            pub enum Twice { A }
            ",
        )]);
        let module = path("crate::calc");
        let ident = |s: &str| Ident::new(s, Span::call_site());
        assert_eq!(
            c.declared_type(Some(&module), &ident("Calculator")).map(|s| s.path),
            Ok(path("crate::calc::Calculator"))
        );
        assert_eq!(
            c.declared_type(Some(&module), &ident("Twice")),
            Err(Unresolved::Ambiguous)
        );
        assert_eq!(
            c.declared_type(None, &ident("Calculator")),
            Err(Unresolved::NotAddressable)
        );
    }

    #[test]
    fn module_cfgs_collect_every_enclosing_gate() {
        let c = compile(vec![
            file("lib.rs", "mod calc; #[cfg(feature = \"extra\")] mod extra;"),
            file(
                "calc.rs",
                "pub struct Calculator; #[cfg(test)] mod tests { pub mod inner {} }",
            ),
            file("extra.rs", "#![cfg(unix)] pub struct Extra;"),
        ]);
        let render = |m: &str| -> Vec<String> {
            c.module_cfgs(&path(m))
                .iter()
                .map(|attr| attr.to_token_stream().to_string())
                .collect()
        };
        assert!(render("crate::calc").is_empty());
        assert_eq!(render("crate::calc::tests::inner"), vec!["# [cfg (test)]"]);
        assert_eq!(
            render("crate::extra"),
            vec!["# [cfg (feature = \"extra\")]", "# [cfg (unix)]"]
        );
    }

    #[test]
    fn impl_blocks_attach_to_their_owner_across_modules() {
        let c = compile(vec![
            file("lib.rs", "mod calc; mod more;"),
            file("calc.rs", "pub struct Calculator; impl Calculator { fn a(&self) {} }"),
            file(
                "more.rs",
                r"
                use crate::calc::Calculator as Calc;
                impl Calc { fn b(&self) {} }
                impl Clone for Calc { fn clone(&self) -> Self { Calc } }
                ",
            ),
        ]);
        let owner = path("crate::calc::Calculator");
        let modules: Vec<String> = c
            .inherent_impls(&owner)
            .map(|block| block.module.to_string())
            .collect();
        assert_eq!(modules, vec!["crate::calc", "crate::more"]);
    }

    #[test]
    fn qualify_prefix_handles_relative_forms() {
        let c = compile(vec![
            file("lib.rs", "mod model; mod calc;"),
            file("model.rs", "pub struct Point;"),
            file(
                "calc/mod.rs",
                "use crate::model::Point; use serde_json::Value; mod inner;",
            ),
        ]);
        let module = path("crate::calc");
        let q = |s: &str| c.qualify_prefix(&module, &syn_path(s));
        assert_eq!(q("Point"), Some((path("crate::model::Point"), 1)));
        assert_eq!(q("Value"), Some((path("serde_json::Value"), 1)));
        assert_eq!(q("inner::Thing"), Some((path("crate::calc::inner"), 1)));
        assert_eq!(q("super::model::Point"), Some((QualifiedPath::crate_root(), 1)));
        assert_eq!(q("self::inner::Thing"), Some((path("crate::calc"), 1)));
        assert_eq!(q("Vec"), None);
        assert_eq!(q("crate::model::Point"), None);
    }

    #[test]
    fn syn_path_rendering() {
        let local = path("crate::calc::Calculator").to_syn_path();
        assert!(local.leading_colon.is_none());
        let external = path("serde_json::Value").to_syn_path();
        assert!(external.leading_colon.is_some());
        assert_eq!(external.segments.len(), 2);
    }
}
