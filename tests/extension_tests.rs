mod common;

use common::{TestResult, props};
use mapstyle::{
    CompileError, ExtensionFunction, RenderContext, Renderer, RendererOptions, StyleValue, ValueNode,
};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn first_argument() -> ExtensionFunction {
    ExtensionFunction::new(|args| args.first().cloned().unwrap_or_default())
}

#[tokio::test]
async fn test_extension_resolves_before_compilation() -> TestResult {
    let mut renderer = Renderer::new(RendererOptions::new().with_debug(true));
    renderer.add_function("testing", |_args: Vec<ValueNode>| async {
        tokio::task::yield_now().await;
        first_argument()
    });

    let stylesheet = renderer.render("#test { marker-width: testing([prop]); }").await?;
    let layer = &stylesheet.get_layers()[0];
    let style = layer.get_style(&props(json!({ "prop": 1 })), &RenderContext::new(0, 10));
    assert_eq!(style["marker-width"], StyleValue::Number(1.0));
    assert!(layer.is_variable());
    Ok(())
}

#[tokio::test]
async fn test_extension_receives_call_arguments() -> TestResult {
    let mut renderer = Renderer::default();
    renderer.add_function("scale", |args: Vec<ValueNode>| {
        let factor = match args.get(1) {
            Some(ValueNode::Number(n)) => *n,
            _ => 1.0,
        };
        async move {
            ExtensionFunction::new(move |values| match values.first().and_then(StyleValue::as_number) {
                Some(n) => StyleValue::Number(n * factor),
                None => StyleValue::Null,
            })
        }
    });

    let stylesheet = renderer.render("#a { line-width: scale([w], 3); }").await?;
    let style = stylesheet.get_layers()[0].get_style(&props(json!({ "w": 2 })), &RenderContext::default());
    assert_eq!(style["line-width"], StyleValue::Number(6.0));
    Ok(())
}

#[tokio::test]
async fn test_every_call_site_is_awaited() -> TestResult {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut renderer = Renderer::default();
    renderer.add_function("testing", move |_args: Vec<ValueNode>| {
        let counter = counter.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            first_argument()
        }
    });

    let style = "#a { marker-width: testing([a]); } #b { marker-width: testing([b]); [zoom = 2] { marker-width: testing(4); } }";
    let stylesheet = renderer.render(style).await?;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(stylesheet.get_layers().len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_renders_without_extensions_do_not_wait() -> TestResult {
    let mut renderer = Renderer::default();
    renderer.add_function("never", |_args: Vec<ValueNode>| async {
        std::future::pending::<()>().await;
        first_argument()
    });
    // `never` is registered but not referenced, so nothing is awaited.
    let stylesheet = renderer.render("#a { line-width: 1; }").await?;
    assert_eq!(stylesheet.get_layers()[0].eval("line-width"), StyleValue::Number(1.0));
    Ok(())
}

#[tokio::test]
async fn test_extension_timeout() {
    let mut renderer = Renderer::new(
        RendererOptions::new().with_extension_timeout(Duration::from_millis(20)),
    );
    renderer.add_function("never", |_args: Vec<ValueNode>| async {
        std::future::pending::<()>().await;
        first_argument()
    });

    let result = renderer.render("#a { line-width: never(1); }").await;
    assert!(matches!(result, Err(CompileError::ExtensionTimeout(_))));
}

#[tokio::test]
async fn test_renderer_is_reusable() -> TestResult {
    let mut renderer = Renderer::default();
    renderer.add_function("testing", |_args: Vec<ValueNode>| async { first_argument() });
    for value in [1, 2] {
        let stylesheet = renderer.render("#a { marker-width: testing([v]); }").await?;
        let style = stylesheet.get_layers()[0].get_style(&props(json!({ "v": value })), &RenderContext::default());
        assert_eq!(style["marker-width"], StyleValue::Number(value as f64));
    }
    Ok(())
}
