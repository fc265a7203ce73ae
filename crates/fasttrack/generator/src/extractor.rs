//! Extraction of tool data from a marked type and its inherent impls.

use std::collections::BTreeSet;

use proc_macro2::Ident;
use quote::{ToTokens, format_ident};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{
    Attribute, Expr, ExprLit, FnArg, GenericParam, Generics, ImplItemFn, Lit, Meta, Pat,
    ReturnType, Token, Type, WhereClause,
};

use crate::compilation::{Compilation, ImplBlock, TypeSymbol};
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Location};
use crate::qualify::{Qualifier, name_elided_lifetimes};
use crate::validator::{MarkerSymbols, find_marker};

/// A parameter of a forwarded method, type already qualified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: Ident,
    pub ty: Type,
}

/// One marked method, ready for emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: Ident,
    pub description: String,
    /// Type of the implicit parameter standing in for the receiver.
    pub receiver: Type,
    pub parameters: Vec<Parameter>,
    pub output: ReturnType,
    /// Impl and method generics merged, lifetimes first.
    pub generics: Generics,
    /// The method's own type and const parameters, forwarded by turbofish.
    pub forwarded_generics: Vec<Ident>,
    pub is_async: bool,
    pub is_unsafe: bool,
}

/// Extraction result for one marked type, before shape checks.
#[derive(Clone, Debug)]
pub struct ClassDraft {
    pub tool_name: String,
    pub class_name: String,
    pub symbol: TypeSymbol,
    pub methods: Vec<MethodInfo>,
    pub location: Location,
}

/// Collect the tool name and every marked method of `symbol`.
///
/// Marked methods without a `self` receiver are reported and skipped.
pub fn extract(
    compilation: &Compilation,
    symbol: &TypeSymbol,
    type_marker: &Attribute,
    markers: &MarkerSymbols,
    config: &GeneratorConfig,
    location: Location,
    diagnostics: &mut Vec<Diagnostic>,
) -> ClassDraft {
    let tool_name = marker_argument(type_marker)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| symbol.name.clone());

    let mut methods = Vec::new();
    for block in compilation.inherent_impls(&symbol.path) {
        for item in &block.item.items {
            let syn::ImplItem::Fn(method) = item else {
                continue;
            };
            let Some(marker) = find_marker(
                compilation,
                &block.module,
                &method.attrs,
                &markers.tool_description,
            ) else {
                continue;
            };
            let description = marker_argument(marker).unwrap_or_default();
            if method.sig.receiver().is_none() {
                diagnostics.push(Diagnostic::receiverless_member(
                    &symbol.name,
                    &method.sig.ident.to_string(),
                    config.tool_description_marker_name(),
                    Location::from_span(&block.file, method.sig.ident.span()),
                ));
                continue;
            }
            methods.push(method_info(compilation, block, method, description));
        }
    }
    tracing::debug!(
        ty = %symbol.path,
        tool = %tool_name,
        methods = methods.len(),
        "extracted marked type"
    );

    ClassDraft {
        tool_name,
        class_name: symbol.name.clone(),
        symbol: symbol.clone(),
        methods,
        location,
    }
}

fn method_info(
    compilation: &Compilation,
    block: &ImplBlock,
    method: &ImplItemFn,
    description: String,
) -> MethodInfo {
    let sig = &method.sig;
    let merged = merge_generics(&block.item.generics, &sig.generics);
    let owner = Qualifier::new(compilation, &block.module)
        .with_generics(&merged)
        .qualify_type(&block.item.self_ty);
    let mut qualifier = Qualifier::new(compilation, &block.module)
        .with_generics(&merged)
        .with_owner(&owner);

    let mut taken: BTreeSet<String> = sig
        .inputs
        .iter()
        .filter_map(|input| match input {
            FnArg::Typed(typed) => match &*typed.pat {
                Pat::Ident(binding) => Some(binding.ident.unraw().to_string()),
                _ => None,
            },
            FnArg::Receiver(_) => None,
        })
        .collect();
    let mut receiver = None;
    let mut parameters = Vec::new();
    for (index, input) in sig.inputs.iter().enumerate() {
        match input {
            FnArg::Receiver(r) => receiver = Some(qualifier.qualify_type(&r.ty)),
            FnArg::Typed(typed) => parameters.push(Parameter {
                name: parameter_name(&typed.pat, index, &mut taken),
                ty: qualifier.qualify_type(&typed.ty),
            }),
        }
    }
    let mut receiver = receiver.unwrap_or_else(|| owner.clone());
    let mut output = qualifier.qualify_return_type(&sig.output);
    let mut generics = qualifier.qualify_generics(&merged);
    name_elided_lifetimes(&mut receiver, &mut output, &mut generics);

    let forwarded_generics = sig
        .generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(t) => Some(t.ident.clone()),
            GenericParam::Const(c) => Some(c.ident.clone()),
            GenericParam::Lifetime(_) => None,
        })
        .collect();

    MethodInfo {
        name: sig.ident.clone(),
        description,
        receiver,
        parameters,
        output,
        generics,
        forwarded_generics,
        is_async: sig.asyncness.is_some(),
        is_unsafe: sig.unsafety.is_some(),
    }
}

/// Name of a parameter. Patterns that bind no single name get `arg{index}`,
/// with trailing underscores while that name is in `taken`.
fn parameter_name(pat: &Pat, index: usize, taken: &mut BTreeSet<String>) -> Ident {
    if let Pat::Ident(binding) = pat {
        return binding.ident.clone();
    }
    let mut name = format!("arg{index}");
    while taken.contains(&name) {
        name.push('_');
    }
    taken.insert(name.clone());
    format_ident!("{}", name)
}

fn merge_generics(outer: &Generics, inner: &Generics) -> Generics {
    let (lifetimes, others): (Vec<&GenericParam>, Vec<&GenericParam>) = outer
        .params
        .iter()
        .chain(inner.params.iter())
        .partition(|param| matches!(param, GenericParam::Lifetime(_)));
    let params: Punctuated<GenericParam, Token![,]> =
        lifetimes.into_iter().chain(others).cloned().collect();

    let predicates: Punctuated<syn::WherePredicate, Token![,]> = outer
        .where_clause
        .iter()
        .chain(inner.where_clause.iter())
        .flat_map(|clause| clause.predicates.iter().cloned())
        .collect();

    let has_params = !params.is_empty();
    Generics {
        lt_token: has_params.then(Default::default),
        params,
        gt_token: has_params.then(Default::default),
        where_clause: (!predicates.is_empty()).then(|| WhereClause {
            where_token: Default::default(),
            predicates,
        }),
    }
}

/// First positional argument of a marker attribute, as text.
///
/// `#[m]` has none; `#[m("x")]` and `#[m = "x"]` carry `x`. Non-string
/// literals are taken by their source text.
pub fn marker_argument(attr: &Attribute) -> Option<String> {
    match &attr.meta {
        Meta::Path(_) => None,
        Meta::NameValue(nv) => literal_text(&nv.value),
        Meta::List(list) => {
            let args = list
                .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
                .ok()?;
            args.first().and_then(literal_text)
        }
    }
}

fn literal_text(expr: &Expr) -> Option<String> {
    let Expr::Lit(ExprLit { lit, .. }) = expr else {
        return None;
    };
    Some(match lit {
        Lit::Str(s) => s.value(),
        Lit::Char(c) => c.value().to_string(),
        Lit::Bool(b) => b.value.to_string(),
        other => other.to_token_stream().to_string(),
    })
}
