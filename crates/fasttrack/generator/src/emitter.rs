//! Rendering of wrapper and index files.
//!
//! Uses [`quote`] to build token streams and [`prettyplease`] to format them.
//! Output depends only on its inputs: no timestamps, no absolute paths.

use std::collections::BTreeMap;

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, LitStr};

use crate::compilation::{QualifiedPath, make_ident};
use crate::config::{HostMarkers, ReceiverNaming};
use crate::extractor::{MethodInfo, Parameter};
use crate::shape::ResolvedClassInfo;

/// First line of every generated file. The host only ever removes files that
/// start with it.
pub const GENERATED_HEADER: &str = "// @generated by fasttrack-generator. Do not edit.";

/// Settings the emitter needs from the configuration.
#[derive(Clone, Debug)]
pub struct EmitSettings {
    pub host: HostMarkers,
    pub receiver_naming: ReceiverNaming,
}

/// A generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// File name, unique within one generation run.
    pub name: String,
    pub text: String,
}

/// A rendered wrapper together with what it was rendered from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedWrapper {
    pub source: QualifiedPath,
    pub tool_name: String,
    pub namespace: String,
    /// `#[cfg]` gates of the source type and its modules, repeated on the
    /// wrapper's `include!` in the index.
    pub cfg: Vec<Attribute>,
    pub artifact: Artifact,
}

/// File name of the wrapper generated for `tool_name`.
pub fn artifact_name(tool_name: &str) -> String {
    format!("{tool_name}Tools.rs")
}

/// Render the wrapper for one resolved type.
pub fn emit(info: &ResolvedClassInfo, settings: &EmitSettings) -> syn::Result<EmittedWrapper> {
    let text = render_wrapper(info, settings)?;
    Ok(EmittedWrapper {
        source: info.source().clone(),
        tool_name: info.tool_name().to_string(),
        namespace: info.namespace().to_string(),
        cfg: Vec::new(),
        artifact: Artifact {
            name: artifact_name(info.tool_name()),
            text,
        },
    })
}

fn render_wrapper(info: &ResolvedClassInfo, settings: &EmitSettings) -> syn::Result<String> {
    let wrapper: Ident = syn::parse_str(&info.wrapper_name())?;
    let container = &settings.host.container;
    let doc = format!(" Tool wrappers forwarding to `{}`.", info.source());
    let methods = info
        .methods()
        .iter()
        .map(|method| emit_method(info.class_name(), method, settings));
    let allow = matches!(settings.receiver_naming, ReceiverNaming::FirstLower)
        .then(|| quote!(#[allow(non_snake_case)]));

    let tokens = quote! {
        #[doc = #doc]
        #[#container]
        pub struct #wrapper;

        #allow
        impl #wrapper {
            #(#methods)*
        }
    };
    let file: syn::File = syn::parse2(tokens)?;
    Ok(format!(
        "{GENERATED_HEADER}\n// Source: {}\n\n{}",
        info.source(),
        prettyplease::unparse(&file)
    ))
}

fn emit_method(class_name: &str, method: &MethodInfo, settings: &EmitSettings) -> TokenStream {
    let HostMarkers {
        tool, description, ..
    } = &settings.host;
    let name = &method.name;
    let text = LitStr::new(&method.description, Span::call_site());
    let param = receiver_param_name(class_name, settings.receiver_naming, &method.parameters);
    let receiver = &method.receiver;
    let names: Vec<&Ident> = method.parameters.iter().map(|p| &p.name).collect();
    let types = method.parameters.iter().map(|p| &p.ty);
    let generics = &method.generics;
    let where_clause = &method.generics.where_clause;
    let output = &method.output;

    let turbofish = if method.forwarded_generics.is_empty() {
        quote!()
    } else {
        let forwarded = &method.forwarded_generics;
        quote!(::<#(#forwarded),*>)
    };
    let mut call = quote!(#param.#name #turbofish (#(#names),*));
    if method.is_async {
        call = quote!(#call.await);
    }
    if method.is_unsafe {
        call = quote!(unsafe { #call });
    }
    let asyncness = method.is_async.then(|| quote!(async));
    let unsafety = method.is_unsafe.then(|| quote!(unsafe));

    quote! {
        #[#tool]
        #[#description(#text)]
        pub #asyncness #unsafety fn #name #generics (#param: #receiver, #(#names: #types),*) #output #where_clause {
            #call
        }
    }
}

/// Name of the implicit parameter that stands in for the receiver.
///
/// Keywords become raw identifiers; a clash with an explicit parameter gets
/// trailing underscores until it is unique.
pub fn receiver_param_name(class_name: &str, naming: ReceiverNaming, parameters: &[Parameter]) -> Ident {
    let mut name = match naming {
        ReceiverNaming::FirstLower => first_lower(class_name),
        ReceiverNaming::SnakeCase => to_snake_case(class_name),
    };
    if matches!(name.as_str(), "self" | "super" | "crate" | "_") {
        name.push('_');
    }
    while parameters.iter().any(|p| p.name.unraw() == name) {
        name.push('_');
    }
    match syn::parse_str::<Ident>(&name) {
        Ok(ident) => ident,
        Err(_) => Ident::new_raw(&name, Span::call_site()),
    }
}

/// `CalculatorService` becomes `calculatorService`.
pub fn first_lower(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `CalculatorService` becomes `calculator_service`, `HTTPServer` becomes
/// `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Render the index file: every wrapper included inside nested `pub mod`
/// blocks mirroring its namespace.
pub fn render_index(wrappers: &[EmittedWrapper]) -> syn::Result<String> {
    let mut root = ModuleTree::default();
    for wrapper in wrappers {
        let mut node = &mut root;
        for segment in wrapper.namespace.split("::").filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.includes
            .push((wrapper.artifact.name.clone(), wrapper.cfg.clone()));
    }
    let file: syn::File = syn::parse2(root.tokens())?;
    let body = prettyplease::unparse(&file);
    if body.is_empty() {
        Ok(format!("{GENERATED_HEADER}\n"))
    } else {
        Ok(format!("{GENERATED_HEADER}\n\n{body}"))
    }
}

#[derive(Default)]
struct ModuleTree {
    includes: Vec<(String, Vec<Attribute>)>,
    children: BTreeMap<String, ModuleTree>,
}

impl ModuleTree {
    fn tokens(&self) -> TokenStream {
        let mut includes = self.includes.clone();
        includes.sort_by(|a, b| a.0.cmp(&b.0));
        let includes = includes
            .iter()
            .map(|(file, cfg)| quote!(#(#cfg)* include!(#file);));
        let children = self.children.iter().map(|(name, tree)| {
            let ident = make_ident(name);
            let inner = tree.tokens();
            quote!(pub mod #ident { #inner })
        });
        quote! {
            #(#includes)*
            #(#children)*
        }
    }
}
