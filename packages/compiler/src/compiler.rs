//! Compiler Main Module
//!
//! The compile pipeline: template text is parsed, lowered into a program
//! and printed as an ES module. Batches compile in parallel; each
//! component's outcome is independent of the others.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::error::Result;
use crate::output::{emit_program, Program};
use crate::template_parser::{TemplateNode, TemplateParser};
use crate::transform::{default_resolver, lower, ComponentInfo};

/// A component to compile: where it lives and its template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSource {
    pub info: ComponentInfo,
    pub template: String,
}

impl ComponentSource {
    pub fn new(info: ComponentInfo, template: impl Into<String>) -> Self {
        ComponentSource {
            info,
            template: template.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledComponent {
    pub name: String,
    pub ast: Vec<TemplateNode>,
    pub program: Program,
    /// The program printed as an ES module
    pub code: String,
}

/// Parses template text. The template path is used as the source URL in
/// error locations.
pub fn parse(source: &ComponentSource) -> Result<Vec<TemplateNode>> {
    Ok(TemplateParser::new(&source.template, &source.info.template).parse()?)
}

/// Compiles one component; child components are imported from the module
/// [`default_resolver`] names.
pub fn compile_component(
    source: &ComponentSource,
    siblings: &IndexMap<String, ComponentInfo>,
    config: &CompilerConfig,
) -> Result<CompiledComponent> {
    compile_component_with(source, siblings, &default_resolver, config)
}

pub fn compile_component_with(
    source: &ComponentSource,
    siblings: &IndexMap<String, ComponentInfo>,
    resolver: &dyn Fn(&ComponentInfo) -> String,
    config: &CompilerConfig,
) -> Result<CompiledComponent> {
    let name = source.info.name.as_str();

    debug!(component = name, "parsing template");
    let ast = parse(source)?;

    debug!(component = name, nodes = ast.len(), "lowering template");
    let program = lower(&ast, &source.info, siblings, resolver, config)?;

    debug!(component = name, statements = program.body.len(), "emitting program");
    let code = emit_program(&program, config.indent);

    Ok(CompiledComponent {
        name: source.info.name.clone(),
        ast,
        program,
        code,
    })
}

/// Compiles every component in parallel. Each source sees all the others
/// as siblings; results come back in input order.
pub fn compile_all(sources: &[ComponentSource], config: &CompilerConfig) -> Vec<Result<CompiledComponent>> {
    compile_all_with(sources, &default_resolver, config)
}

pub fn compile_all_with(
    sources: &[ComponentSource],
    resolver: &(dyn Fn(&ComponentInfo) -> String + Sync),
    config: &CompilerConfig,
) -> Vec<Result<CompiledComponent>> {
    let siblings: IndexMap<String, ComponentInfo> = sources
        .iter()
        .map(|source| (source.info.name.clone(), source.info.clone()))
        .collect();

    let results: Vec<Result<CompiledComponent>> = sources
        .par_iter()
        .map(|source| compile_component_with(source, &siblings, resolver, config))
        .collect();

    let failed = results.iter().filter(|result| result.is_err()).count();
    info!(
        compiled = results.len() - failed,
        failed,
        "compiled component batch"
    );
    results
}
