use proc_macro2::TokenStream;
use syn::parse::{ParseStream, Parser};
use syn::spanned::Spanned;
use syn::{Attribute, ImplItemFn, Item, LitStr, Result};

/// Marker arguments: nothing, or one string literal.
fn marker_args(input: ParseStream) -> Result<Option<LitStr>> {
    if input.is_empty() {
        return Ok(None);
    }
    let value: LitStr = input
        .parse()
        .map_err(|e| syn::Error::new(e.span(), "expected a single string literal"))?;
    if !input.is_empty() {
        return Err(input.error("expected a single string literal"));
    }
    Ok(Some(value))
}

pub fn expand_tool_name(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    marker_args.parse2(attr)?;
    let parsed: Item = syn::parse2(item.clone())?;
    let attrs = match &parsed {
        Item::Struct(s) => &s.attrs,
        Item::Enum(e) => &e.attrs,
        Item::Union(u) => &u.attrs,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[tool_name] applies to structs, enums and unions",
            ));
        }
    };
    reject_repeat(attrs, "tool_name")?;
    Ok(item)
}

pub fn expand_tool_description(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    marker_args.parse2(attr)?;
    let method: ImplItemFn = syn::parse2(item.clone())
        .map_err(|e| syn::Error::new(e.span(), "#[tool_description] applies to methods"))?;
    reject_repeat(&method.attrs, "tool_description")?;
    Ok(item)
}

fn reject_repeat(attrs: &[Attribute], name: &str) -> Result<()> {
    match attrs
        .iter()
        .find(|attr| attr.path().segments.last().is_some_and(|seg| seg.ident == name))
    {
        Some(repeat) => Err(syn::Error::new(
            repeat.span(),
            format!("#[{name}] may appear only once per item"),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    #[test]
    fn tool_name_passes_item_through() {
        let item = quote! { pub struct CalculatorService; };
        let out = expand_tool_name(quote! { "Calculator" }, item.clone()).unwrap();
        assert_eq!(out.to_string(), item.to_string());
    }

    #[test]
    fn tool_name_without_argument() {
        assert!(expand_tool_name(quote! {}, quote! { enum Mode { A } }).is_ok());
    }

    #[test]
    fn tool_name_rejects_non_string() {
        let err = expand_tool_name(quote! { Calculator }, quote! { struct S; }).unwrap_err();
        assert!(err.to_string().contains("string literal"));
    }

    #[test]
    fn tool_name_rejects_extra_arguments() {
        assert!(expand_tool_name(quote! { "a", "b" }, quote! { struct S; }).is_err());
    }

    #[test]
    fn tool_name_rejects_functions() {
        let err = expand_tool_name(quote! {}, quote! { fn f() {} }).unwrap_err();
        assert!(err.to_string().contains("structs, enums and unions"));
    }

    #[test]
    fn tool_name_rejects_repeats() {
        let item = quote! {
            #[fasttrack_markers::tool_name("Other")]
            struct S;
        };
        let err = expand_tool_name(quote! { "A" }, item).unwrap_err();
        assert!(err.to_string().contains("only once"));
    }

    #[test]
    fn tool_description_on_method() {
        let item = quote! { pub fn add(&self, a: i32, b: i32) -> i32 { a + b } };
        let out = expand_tool_description(quote! { "Adds two numbers" }, item.clone()).unwrap();
        assert_eq!(out.to_string(), item.to_string());
    }

    #[test]
    fn tool_description_rejects_structs() {
        assert!(expand_tool_description(quote! { "x" }, quote! { struct S; }).is_err());
    }
}
