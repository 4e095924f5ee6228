#![allow(dead_code)]

use mapstyle::{CompileError, CompiledStylesheet, FeatureProperties, Renderer, RendererOptions};
use serde_json::Value;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Compile a stylesheet with debug logging enabled
pub async fn compile(style: &str) -> Result<CompiledStylesheet, CompileError> {
    let _ = env_logger::builder().is_test(true).try_init();
    Renderer::new(RendererOptions::new().with_debug(true))
        .render(style)
        .await
}

/// Build feature properties from a `json!` object literal
pub fn props(value: Value) -> FeatureProperties {
    match value {
        Value::Object(map) => map,
        other => panic!("feature properties must be a JSON object, got {}", other),
    }
}

pub fn no_props() -> FeatureProperties {
    FeatureProperties::new()
}
