//! Marker attributes for `fasttrack-generator`.
//!
//! Both attributes leave the item untouched. They only check their own
//! arguments so mistakes show up at the attribute rather than as a missing
//! wrapper. The generator reads them from source at build time.

mod marker;

use proc_macro::TokenStream;

/// Mark a struct, enum or union as a tool source.
///
/// # Usage
///
/// ```ignore
/// use fasttrack_markers::tool_name;
///
/// #[tool_name("Calculator")]
/// pub struct CalculatorService;
/// ```
///
/// The optional string names the generated `{Name}Tools` wrapper. Without
/// it the type's own name is used.
#[proc_macro_attribute]
pub fn tool_name(attr: TokenStream, item: TokenStream) -> TokenStream {
    marker::expand_tool_name(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Mark a method as a tool, with a human-readable description.
///
/// # Usage
///
/// ```ignore
/// use fasttrack_markers::tool_description;
///
/// impl CalculatorService {
///     #[tool_description("Adds two numbers")]
///     pub fn add(&self, a: i32, b: i32) -> i32 {
///         a + b
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn tool_description(attr: TokenStream, item: TokenStream) -> TokenStream {
    marker::expand_tool_description(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
