//! Turns accumulators into immutable layers.

use super::grouping::LayerAccumulator;
use crate::layer::{CompiledProperty, Layer, PropertyEvaluator};
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;

/// Compiles accumulators in the order given, which is emission order.
pub(crate) fn compile_layers(
    accumulators: IndexMap<String, LayerAccumulator>,
    debug: bool,
) -> Vec<Layer> {
    accumulators
        .into_iter()
        .map(|(key, accumulator)| {
            if debug {
                debug!("Layer {} (zoom {})", key, accumulator.zoom);
            }
            compile_layer(accumulator, debug)
        })
        .collect()
}

fn compile_layer(accumulator: LayerAccumulator, debug: bool) -> Layer {
    let symbolizers = accumulator
        .properties
        .values()
        .filter_map(|property| property.symbolizer)
        .unique()
        .collect();
    let frames = accumulator.frames.into_iter().unique().collect();

    let properties = accumulator
        .properties
        .into_iter()
        .map(|(name, property)| {
            if debug {
                for fragment in &property.fragments {
                    debug!("  {}: {}", name, fragment);
                }
            }
            let compiled = CompiledProperty {
                evaluator: PropertyEvaluator::new(property.fragments),
                symbolizer: property.symbolizer,
                index: property.max_index,
                constant: property.constant,
                filtered: property.filtered,
            };
            (name, compiled)
        })
        .collect();

    Layer::new(
        accumulator.element,
        accumulator.attachment,
        accumulator.zoom,
        symbolizers,
        frames,
        properties,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::grouping::group;
    use mapstyle_expr::{Evaluator, FunctionNamespace};
    use mapstyle_parser::{flatten, parse_stylesheet};
    use mapstyle_types::{FeatureProperties, RenderContext, StyleValue, Symbolizer};

    fn compile(source: &str) -> Vec<Layer> {
        let defs = flatten(&parse_stylesheet(source).unwrap());
        let evaluator = Evaluator::new(&[], FunctionNamespace::new());
        compile_layers(group(&defs, &evaluator).unwrap().layers, true)
    }

    #[test]
    fn test_symbolizers_follow_property_order() {
        let layers = compile("#test { polygon-fill: red; line-color: red; polygon-opacity: 0.5; comp-op: multiply; }");
        assert_eq!(layers[0].get_symbolizers(), [Symbolizer::Polygon, Symbolizer::Line]);
    }

    #[test]
    fn test_conditional_after_base_overrides() {
        let layers = compile("#a [zoom = 3] { line-width: 3; } #a { line-width: 1; }");
        let props = FeatureProperties::new();
        assert_eq!(layers.len(), 1);
        assert_eq!(
            layers[0].get_style(&props, &RenderContext::new(3, 0))["line-width"],
            StyleValue::Number(3.0)
        );
        assert_eq!(
            layers[0].get_style(&props, &RenderContext::new(4, 0))["line-width"],
            StyleValue::Number(1.0)
        );
    }
}
