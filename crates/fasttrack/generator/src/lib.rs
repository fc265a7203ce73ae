//! Build-time generator of tool wrappers for MCP servers.
//!
//! Types opt in with two marker attributes from `fasttrack-markers`:
//!
//! ```ignore
//! use fasttrack_markers::{tool_description, tool_name};
//!
//! #[tool_name("Calculator")]
//! pub struct CalculatorService;
//!
//! impl CalculatorService {
//!     #[tool_description("Adds two numbers")]
//!     pub fn add(&self, a: i32, b: i32) -> i32 {
//!         a + b
//!     }
//! }
//! ```
//!
//! For every marked type with at least one marked method the generator
//! writes a `{ToolName}Tools` wrapper: a unit struct carrying the host
//! framework's container attribute and one associated function per marked
//! method. Each function takes the instance as an explicit first parameter
//! and forwards to the original method.
//!
//! # Build script
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     fasttrack_generator::run_build_script().unwrap();
//! }
//! ```
//!
//! ```ignore
//! // lib.rs
//! pub mod tools {
//!     include!(concat!(env!("OUT_DIR"), "/fasttrack/mod.rs"));
//! }
//! ```
//!
//! The index nests each wrapper in `pub mod` blocks that mirror the source
//! type's module path, so `crate::calc::CalculatorService` yields
//! `crate::tools::calc::CalculatorTools`. Wrapped types must be visible from
//! there (`pub(crate)` or wider). A wrapper file can also be included directly
//! inside the source module, since every path it contains is absolute.
//!
//! Problems in the sources never fail the build script. They are reported as
//! [`Diagnostic`]s; warnings and errors surface as `cargo:warning` lines.

pub mod compilation;
pub mod config;
pub mod diagnostics;
pub mod emitter;
pub mod error;
pub mod extractor;
pub mod host;
pub mod pipeline;
mod qualify;
pub mod scanner;
pub mod shape;
pub mod validator;

pub use compilation::{Compilation, QualifiedPath, Reference, SourceFile};
pub use config::{GeneratorConfig, ReceiverNaming};
pub use diagnostics::{Diagnostic, DiagnosticId, Location, Severity};
pub use emitter::{Artifact, EmittedWrapper, GENERATED_HEADER};
pub use error::{GeneratorError, Result};
pub use host::{GenerationReport, Generator, run_build_script};
pub use pipeline::{GeneratorOutput, generate};
