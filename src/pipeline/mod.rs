//! The compile pipeline: parse, resolve extensions, group, compile.

pub(crate) mod compiler;
pub(crate) mod grouping;
pub(crate) mod preprocess;

use crate::config::RendererOptions;
use crate::error::CompileError;
use crate::extensions::ExtensionRegistry;
use crate::stylesheet::CompiledStylesheet;
use indexmap::IndexMap;
use log::info;
use mapstyle_expr::{EvalError, Evaluator, FunctionNamespace};
use mapstyle_parser::{flatten, parse_stylesheet};

pub(crate) async fn compile(
    source: &str,
    options: &RendererOptions,
    extensions: &ExtensionRegistry,
) -> Result<CompiledStylesheet, CompileError> {
    let sheet = parse_stylesheet(source)?;
    let definitions = flatten(&sheet);
    if definitions.is_empty() {
        return Err(CompileError::NoRulesFound);
    }
    info!("Compiling {} rule definitions", definitions.len());

    // Each compile gets its own namespace so concurrent renders stay isolated.
    let namespace = FunctionNamespace::new();
    let calls = preprocess::discover_calls(&definitions, extensions);
    preprocess::resolve_extensions(calls, extensions, &namespace, options.extension_timeout).await?;

    let evaluator = Evaluator::new(&sheet.variables, namespace)
        .with_strict_properties(options.strict_properties);
    let grouping = grouping::group(&definitions, &evaluator)?;

    let map_properties = sheet
        .map_properties
        .iter()
        .map(|decl| Ok((decl.name.clone(), evaluator.constant_value(&decl.value)?)))
        .collect::<Result<IndexMap<_, _>, EvalError>>()?;

    let layers = compiler::compile_layers(grouping.layers, options.debug);
    info!("Compiled {} layers", layers.len());
    Ok(CompiledStylesheet::new(layers, grouping.image_urls, map_properties))
}
