//! The per-declaration generation pipeline.
//!
//! Each candidate runs through resolve, marker lookup, extraction, shape
//! checks and emission independently of every other candidate. The only
//! compilation-wide steps are marker resolution, which happens once up
//! front, and the duplicate wrapper name check, which runs over the results
//! in deterministic order.

use std::collections::BTreeMap;

use crate::compilation::{Compilation, QualifiedPath, cfg_attributes};
use crate::config::GeneratorConfig;
use crate::diagnostics::{Diagnostic, Severity};
use crate::emitter::{EmitSettings, EmittedWrapper, emit};
use crate::error::Result;
use crate::extractor::extract;
use crate::scanner::{CandidateDeclaration, scan};
use crate::shape::check_shape;
use crate::validator::{MarkerSymbols, find_marker};

/// Everything one generation run produced.
#[derive(Clone, Debug, Default)]
pub struct GeneratorOutput {
    pub wrappers: Vec<EmittedWrapper>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratorOutput {
    /// Diagnostics a build should print.
    pub fn surfaced(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_surfaced())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Result of processing one candidate.
#[derive(Clone, Debug, Default)]
pub struct DeclarationOutcome {
    pub wrapper: Option<EmittedWrapper>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Inputs shared by every candidate of one run.
pub struct DeclarationContext<'a> {
    pub compilation: &'a Compilation,
    pub markers: &'a MarkerSymbols,
    pub config: &'a GeneratorConfig,
    pub emit: &'a EmitSettings,
}

/// Run the pipeline over every candidate in `compilation`.
///
/// Fails only on an invalid configuration. When the marker attributes cannot
/// be resolved the output carries a single diagnostic and nothing else.
pub fn generate(compilation: &Compilation, config: &GeneratorConfig) -> Result<GeneratorOutput> {
    config.validate()?;
    let emit_settings = EmitSettings {
        host: config.host_markers()?,
        receiver_naming: config.receiver_naming,
    };

    let markers = match MarkerSymbols::resolve(compilation, &config.markers) {
        Ok(markers) => markers,
        Err(diagnostic) => {
            tracing::warn!("{}", diagnostic.message);
            return Ok(GeneratorOutput {
                wrappers: Vec::new(),
                diagnostics: vec![diagnostic],
            });
        }
    };

    let ctx = DeclarationContext {
        compilation,
        markers: &markers,
        config,
        emit: &emit_settings,
    };

    let mut output = GeneratorOutput::default();
    let mut claimed: BTreeMap<String, QualifiedPath> = BTreeMap::new();
    for candidate in scan(compilation) {
        let outcome = process_declaration(&ctx, &candidate);
        for diagnostic in outcome.diagnostics.iter().filter(|d| d.severity.is_surfaced()) {
            tracing::warn!(code = diagnostic.id.code(), "{}", diagnostic.message);
        }
        output.diagnostics.extend(outcome.diagnostics);
        let Some(wrapper) = outcome.wrapper else {
            continue;
        };
        if let Some(first) = claimed.get(&wrapper.artifact.name) {
            tracing::debug!(
                wrapper = %wrapper.artifact.name,
                kept = %first,
                dropped = %wrapper.source,
                "duplicate wrapper name"
            );
            output.diagnostics.push(Diagnostic::duplicate_tool_name(
                &candidate.name(),
                &wrapper.artifact.name,
                candidate.location(),
            ));
            continue;
        }
        claimed.insert(wrapper.artifact.name.clone(), wrapper.source.clone());
        output.wrappers.push(wrapper);
    }

    tracing::info!(
        wrappers = output.wrappers.len(),
        diagnostics = output.diagnostics.len(),
        "generation finished"
    );
    Ok(output)
}

/// Process one candidate declaration. Pure: the outcome depends only on the
/// candidate and the shared context.
pub fn process_declaration(ctx: &DeclarationContext<'_>, candidate: &CandidateDeclaration<'_>) -> DeclarationOutcome {
    let mut diagnostics = Vec::new();
    let wrapper = run(ctx, candidate, &mut diagnostics);
    DeclarationOutcome {
        wrapper,
        diagnostics,
    }
}

fn run(
    ctx: &DeclarationContext<'_>,
    candidate: &CandidateDeclaration<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<EmittedWrapper> {
    let name = candidate.name();
    let location = candidate.location();

    let symbol = match ctx
        .compilation
        .declared_type(candidate.module.as_ref(), candidate.item.ident())
    {
        Ok(symbol) => symbol,
        Err(reason) => {
            let severity = if candidate.mentions_attribute(ctx.config.tool_name_marker_name()) {
                Severity::Warning
            } else {
                Severity::Hidden
            };
            tracing::debug!(%name, ?reason, "declaration not resolvable");
            diagnostics.push(Diagnostic::symbol_not_found(&name, severity, location));
            return None;
        }
    };

    let Some(type_marker) = find_marker(
        ctx.compilation,
        &symbol.module,
        candidate.item.attrs(),
        &ctx.markers.tool_name,
    ) else {
        diagnostics.push(Diagnostic::missing_tool_name_marker(
            &name,
            ctx.config.tool_name_marker_name(),
            location,
        ));
        return None;
    };

    let draft = extract(
        ctx.compilation,
        &symbol,
        type_marker,
        ctx.markers,
        ctx.config,
        location.clone(),
        diagnostics,
    );
    let info = match check_shape(draft, ctx.config) {
        Ok(info) => info,
        Err(diagnostic) => {
            diagnostics.push(diagnostic);
            return None;
        }
    };

    match emit(&info, ctx.emit) {
        Ok(mut wrapper) => {
            wrapper.cfg = ctx.compilation.module_cfgs(&symbol.module);
            wrapper.cfg.extend(cfg_attributes(candidate.item.attrs()));
            tracing::debug!(ty = %symbol.path, file = %wrapper.artifact.name, "emitted wrapper");
            Some(wrapper)
        }
        Err(err) => {
            diagnostics.push(Diagnostic::emission_failed(&name, &err, location));
            None
        }
    }
}
