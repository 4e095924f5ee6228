//! Stylesheet compilation and per-feature evaluation benchmarks
//!
//! Measures:
//! - Compiling stylesheets with a growing number of layers (1, 10, 100)
//! - Compiling with an async extension call per layer
//! - Evaluating a compiled layer against feature batches
//!
//! Run benchmarks: `cargo bench --bench compile_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use mapstyle::{
    ExtensionFunction, FeatureProperties, RenderContext, Renderer, RendererOptions, ValueNode,
};
use serde_json::{Value, json};
use std::hint::black_box;
use tokio::runtime::Runtime;

/// A layer with a zoom cascade, data filters and an animated frame
fn layer_block(i: usize) -> String {
    format!(
        r#"#layer{i} {{
    marker-width: 2;
    marker-fill: #FEE391;
    comp-op: "lighten";
    [zoom > 10] {{ marker-width: 4; }}
    [value > 2] {{ marker-width: [value] * 2; marker-fill: darken(#FEE391, 20%); }}
    [frame-offset = 1] {{ marker-width: 6; marker-fill-opacity: 0.5; }}
}}
"#
    )
}

fn generate_stylesheet(layers: usize) -> String {
    let mut style = String::from("@base: 3;\nMap { -torque-frame-count: 128; }\n");
    for i in 0..layers {
        style.push_str(&layer_block(i));
    }
    style
}

fn generate_features(count: usize) -> Vec<FeatureProperties> {
    (0..count)
        .filter_map(|i| match json!({ "value": i % 5, "name": format!("Feature {}", i) }) {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn benchmark_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let renderer = Renderer::new(RendererOptions::default());

    for layers in [1, 10, 100] {
        group.throughput(Throughput::Elements(layers as u64));
        let style = generate_stylesheet(layers);

        group.bench_with_input(BenchmarkId::new("layers", layers), &style, |b, style| {
            b.iter(|| {
                rt.block_on(async {
                    renderer
                        .render(black_box(style))
                        .await
                        .expect("Failed to compile stylesheet")
                })
            });
        });
    }

    group.finish();
}

fn benchmark_compile_with_extensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_with_extensions");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");

    let mut renderer = Renderer::new(RendererOptions::default());
    renderer.add_function("scaled", |_args: Vec<ValueNode>| async {
        tokio::task::yield_now().await;
        ExtensionFunction::new(|args| args.first().cloned().unwrap_or_default())
    });

    for layers in [1, 10, 100] {
        group.throughput(Throughput::Elements(layers as u64));
        let style: String = (0..layers)
            .map(|i| format!("#ext{i} {{ line-width: scaled([width]); }}\n"))
            .collect();

        group.bench_with_input(BenchmarkId::new("calls", layers), &style, |b, style| {
            b.iter(|| {
                rt.block_on(async {
                    renderer
                        .render(black_box(style))
                        .await
                        .expect("Failed to compile stylesheet")
                })
            });
        });
    }

    group.finish();
}

fn benchmark_get_style(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_style");
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    let renderer = Renderer::new(RendererOptions::default());
    let stylesheet = rt
        .block_on(renderer.render(&generate_stylesheet(1)))
        .expect("Failed to compile stylesheet");
    let layer = &stylesheet.get_layers()[0];

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count as u64));
        let features = generate_features(count);

        group.bench_with_input(BenchmarkId::new("features", count), &features, |b, features| {
            b.iter(|| {
                for (i, props) in features.iter().enumerate() {
                    let ctx = RenderContext::new((i % 20) as u32, (i % 2) as i64);
                    black_box(layer.get_style(props, &ctx));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compile,
    benchmark_compile_with_extensions,
    benchmark_get_style
);
criterion_main!(benches);
