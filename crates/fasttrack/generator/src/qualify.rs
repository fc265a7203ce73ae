//! Rewriting of types so they mean the same thing outside their module.
//!
//! Wrappers live in a different module than the type they forward to, so
//! every path a member signature mentions is rewritten to an absolute form
//! (`crate::…` or `::dep::…`). `Self` is replaced with the owner type.

use std::collections::BTreeSet;

use proc_macro2::Span;
use syn::visit_mut::{self, VisitMut};
use syn::{
    Expr, GenericParam, Generics, Lifetime, ParenthesizedGenericArguments, Path, PathSegment,
    ReturnType, TraitBound, Type, TypeBareFn, TypePath, TypeReference,
};

use crate::compilation::{Compilation, QualifiedPath};

/// Rewrites paths found in types to absolute form.
pub struct Qualifier<'a> {
    compilation: &'a Compilation,
    module: &'a QualifiedPath,
    generics: BTreeSet<String>,
    owner: Option<&'a Type>,
}

impl<'a> Qualifier<'a> {
    pub fn new(compilation: &'a Compilation, module: &'a QualifiedPath) -> Self {
        Self {
            compilation,
            module,
            generics: BTreeSet::new(),
            owner: None,
        }
    }

    /// Type and const parameters in scope are left untouched.
    pub fn with_generics(mut self, generics: &Generics) -> Self {
        for param in &generics.params {
            match param {
                GenericParam::Type(t) => {
                    self.generics.insert(t.ident.to_string());
                }
                GenericParam::Const(c) => {
                    self.generics.insert(c.ident.to_string());
                }
                GenericParam::Lifetime(_) => {}
            }
        }
        self
    }

    /// Replace `Self` with `owner`, which must already be qualified.
    pub fn with_owner(mut self, owner: &'a Type) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn qualify_type(&mut self, ty: &Type) -> Type {
        let mut ty = ty.clone();
        self.visit_type_mut(&mut ty);
        ty
    }

    pub fn qualify_return_type(&mut self, output: &ReturnType) -> ReturnType {
        let mut output = output.clone();
        self.visit_return_type_mut(&mut output);
        output
    }

    pub fn qualify_generics(&mut self, generics: &Generics) -> Generics {
        let mut generics = generics.clone();
        self.visit_generics_mut(&mut generics);
        generics
    }

    fn qualify_path(&self, path: &mut Path) {
        let Some(first) = path.segments.first() else {
            return;
        };
        if first.ident == "Self" {
            self.replace_self_prefix(path);
            return;
        }
        if path.leading_colon.is_none() && self.generics.contains(&first.ident.to_string()) {
            return;
        }
        let Some((prefix, consumed)) = self.compilation.qualify_prefix(self.module, path) else {
            return;
        };
        let mut qualified = prefix.to_syn_path();
        let mut original = std::mem::take(&mut path.segments).into_iter();
        let mut replaced: Vec<PathSegment> = original.by_ref().take(consumed).collect();
        // A single replaced segment keeps its generic arguments, `Alias<T>`.
        if let (Some(last), Some(seg)) = (qualified.segments.last_mut(), replaced.pop()) {
            if consumed == 1 {
                last.arguments = seg.arguments;
            }
        }
        qualified.segments.extend(original);
        *path = qualified;
    }

    fn replace_self_prefix(&self, path: &mut Path) {
        let Some(Type::Path(owner)) = self.owner else {
            return;
        };
        if owner.qself.is_some() || path.segments.len() < 2 {
            return;
        }
        let mut qualified = owner.path.clone();
        qualified
            .segments
            .extend(path.segments.iter().skip(1).cloned());
        *path = qualified;
    }
}

impl VisitMut for Qualifier<'_> {
    fn visit_type_mut(&mut self, ty: &mut Type) {
        if let (Some(owner), Type::Path(tp)) = (self.owner, &*ty) {
            if tp.qself.is_none() && tp.path.is_ident("Self") {
                *ty = owner.clone();
                return;
            }
        }
        visit_mut::visit_type_mut(self, ty);
    }

    fn visit_type_path_mut(&mut self, tp: &mut TypePath) {
        match &mut tp.qself {
            None => self.qualify_path(&mut tp.path),
            Some(qself) if qself.position > 0 => {
                // `<T as Trait>::Item`: segments before `position` name the trait.
                let mut segments = std::mem::take(&mut tp.path.segments).into_iter();
                let mut tr = Path {
                    leading_colon: tp.path.leading_colon.take(),
                    segments: segments.by_ref().take(qself.position).collect(),
                };
                self.qualify_path(&mut tr);
                qself.position = tr.segments.len();
                tr.segments.extend(segments);
                tp.path = tr;
            }
            Some(_) => {}
        }
        visit_mut::visit_type_path_mut(self, tp);
    }

    fn visit_trait_bound_mut(&mut self, bound: &mut TraitBound) {
        self.qualify_path(&mut bound.path);
        visit_mut::visit_trait_bound_mut(self, bound);
    }

    // Array lengths and const arguments stay as written.
    fn visit_expr_mut(&mut self, _: &mut Expr) {}
}

/// Name of the lifetime injected when an elided borrow of the owner flows
/// into the return type.
const OWNER_LIFETIME: &str = "owner";

/// Give the receiver borrow a named lifetime when the return type borrows
/// from it through elision.
///
/// `fn get(&self) -> &str` forwards as
/// `fn get<'owner>(this: &'owner Owner) -> &'owner str`. Without this the
/// wrapper would be rejected because elision cannot pick between inputs.
pub fn name_elided_lifetimes(receiver: &mut Type, output: &mut ReturnType, generics: &mut Generics) {
    let Type::Reference(reference) = receiver else {
        return;
    };
    if reference.lifetime.is_some() {
        return;
    }
    let mut probe = ElidedLifetimes::probe();
    probe.visit_return_type_mut(&mut output.clone());
    if !probe.found {
        return;
    }

    let lifetime = Lifetime::new(&format!("'{}", unused_lifetime(generics)), Span::call_site());
    reference.lifetime = Some(lifetime.clone());
    ElidedLifetimes::replace(lifetime.clone()).visit_return_type_mut(output);
    generics
        .params
        .insert(0, GenericParam::Lifetime(syn::LifetimeParam::new(lifetime)));
    if generics.lt_token.is_none() {
        generics.lt_token = Some(Default::default());
        generics.gt_token = Some(Default::default());
    }
}

fn unused_lifetime(generics: &Generics) -> String {
    let taken: BTreeSet<String> = generics
        .lifetimes()
        .map(|l| l.lifetime.ident.to_string())
        .collect();
    let mut name = OWNER_LIFETIME.to_string();
    let mut n = 1;
    while taken.contains(&name) {
        n += 1;
        name = format!("{OWNER_LIFETIME}{n}");
    }
    name
}

/// Finds (and optionally names) elided lifetimes, ignoring those scoped to
/// function pointer and `Fn(..)` signatures.
struct ElidedLifetimes {
    replacement: Option<Lifetime>,
    found: bool,
}

impl ElidedLifetimes {
    fn probe() -> Self {
        Self {
            replacement: None,
            found: false,
        }
    }

    fn replace(lifetime: Lifetime) -> Self {
        Self {
            replacement: Some(lifetime),
            found: false,
        }
    }
}

impl VisitMut for ElidedLifetimes {
    fn visit_type_reference_mut(&mut self, r: &mut TypeReference) {
        if r.lifetime.is_none() {
            self.found = true;
            if let Some(lifetime) = &self.replacement {
                r.lifetime = Some(lifetime.clone());
            }
        }
        visit_mut::visit_type_reference_mut(self, r);
    }

    fn visit_lifetime_mut(&mut self, l: &mut Lifetime) {
        if l.ident == "_" {
            self.found = true;
            if let Some(lifetime) = &self.replacement {
                *l = lifetime.clone();
            }
        }
    }

    fn visit_type_bare_fn_mut(&mut self, _: &mut TypeBareFn) {}

    fn visit_parenthesized_generic_arguments_mut(&mut self, _: &mut ParenthesizedGenericArguments) {}

    fn visit_expr_mut(&mut self, _: &mut Expr) {}
}
