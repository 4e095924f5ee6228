//! Groups definitions into per-layer accumulators.
//!
//! Two orderings are derived from the same parse-ordered definition list:
//!
//! - the **emission pass** walks definitions in parse order and fixes layer
//!   order, property order, zoom masks, frames and image URLs;
//! - the **cascade pass** walks unconditioned definitions before conditioned
//!   ones (each in parse order) and appends fragments, so that the last
//!   satisfied fragment is always the most specific one.

use indexmap::IndexMap;
use log::debug;
use mapstyle_expr::{Contribution, EvalError, Evaluator, Fragment};
use mapstyle_parser::Definition;
use mapstyle_types::{Symbolizer, ZoomMask};

/// Properties whose literal URL values are reported as image assets.
const IMAGE_PROPERTIES: &[&str] = &["marker-file", "point-file"];

#[derive(Debug, Clone)]
pub(crate) struct PropertyAccumulator {
    pub fragments: Vec<Fragment>,
    pub symbolizer: Option<Symbolizer>,
    pub max_index: usize,
    pub constant: bool,
    pub filtered: bool,
}

impl PropertyAccumulator {
    fn new() -> Self {
        Self {
            fragments: Vec::new(),
            symbolizer: None,
            max_index: 0,
            constant: true,
            filtered: false,
        }
    }

    fn merge(&mut self, contribution: Contribution) {
        if self.fragments.is_empty() {
            self.symbolizer = contribution.symbolizer;
        }
        self.max_index = self.max_index.max(contribution.index);
        self.constant &= contribution.constant;
        self.filtered |= contribution.filtered;
        self.fragments.push(contribution.fragment);
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LayerAccumulator {
    pub element: String,
    pub attachment: String,
    pub zoom: ZoomMask,
    /// Frame offsets in first-seen order, without duplicates.
    pub frames: Vec<i64>,
    pub properties: IndexMap<String, PropertyAccumulator>,
}

impl LayerAccumulator {
    fn new(def: &Definition) -> Self {
        Self {
            element: def.element().to_string(),
            attachment: def.attachment.clone(),
            zoom: ZoomMask::NONE,
            frames: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Grouping {
    /// Accumulators by `element::attachment`, in emission order.
    pub layers: IndexMap<String, LayerAccumulator>,
    pub image_urls: Vec<String>,
}

pub(crate) fn group(defs: &[Definition], evaluator: &Evaluator) -> Result<Grouping, EvalError> {
    let mut grouping = emission_pass(defs);
    cascade_pass(&mut grouping, defs, evaluator)?;
    debug!(
        "Grouped {} definitions into {} layers",
        defs.len(),
        grouping.layers.len()
    );
    Ok(grouping)
}

pub(crate) fn emission_pass(defs: &[Definition]) -> Grouping {
    let mut grouping = Grouping::default();
    for def in defs {
        let layer = grouping
            .layers
            .entry(def.key())
            .or_insert_with(|| LayerAccumulator::new(def));
        layer.zoom |= def.zoom;
        if !layer.frames.contains(&def.frame_offset) {
            layer.frames.push(def.frame_offset);
        }
        for rule in &def.rules {
            layer
                .properties
                .entry(rule.name.clone())
                .or_insert_with(PropertyAccumulator::new);
            if IMAGE_PROPERTIES.contains(&rule.name.as_str())
                && let Some(url) = rule.value.literal_url()
            {
                grouping.image_urls.push(url.to_string());
            }
        }
    }
    grouping
}

/// Unconditioned definitions first, then conditioned ones, each in parse order.
pub(crate) fn cascade_order(defs: &[Definition]) -> Vec<&Definition> {
    let (base, conditioned): (Vec<&Definition>, Vec<&Definition>) =
        defs.iter().partition(|def| !def.is_conditioned());
    base.into_iter().chain(conditioned).collect()
}

fn cascade_pass(
    grouping: &mut Grouping,
    defs: &[Definition],
    evaluator: &Evaluator,
) -> Result<(), EvalError> {
    for def in cascade_order(defs) {
        let Some(layer) = grouping.layers.get_mut(&def.key()) else {
            continue;
        };
        for rule in &def.rules {
            let contribution = evaluator.contribute(def, rule)?;
            layer
                .properties
                .entry(rule.name.clone())
                .or_insert_with(PropertyAccumulator::new)
                .merge(contribution);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstyle_expr::FunctionNamespace;
    use mapstyle_parser::{flatten, parse_stylesheet};

    fn definitions(source: &str) -> Vec<Definition> {
        flatten(&parse_stylesheet(source).unwrap())
    }

    #[test]
    fn test_emission_order_and_frames() {
        let defs = definitions(
            "#world { line-width: 2; line-color: #f00; [frame-offset = 1] { line-width: 3; } [frame-offset = 2] { line-width: 3; } }\n#world2[frame-offset = 10] { line-width: 4; }",
        );
        let grouping = emission_pass(&defs);
        let keys: Vec<&String> = grouping.layers.keys().collect();
        assert_eq!(keys, ["#world::__default__", "#world2::__default__"]);
        assert_eq!(grouping.layers[0].frames, vec![0, 1, 2]);
        assert_eq!(grouping.layers[1].frames, vec![10]);
        let props: Vec<&String> = grouping.layers[0].properties.keys().collect();
        assert_eq!(props, ["line-width", "line-color"]);
    }

    #[test]
    fn test_cascade_order_is_a_stable_partition() {
        let defs = definitions("#a[zoom = 1] { line-width: 1; } #a { line-width: 2; } #a[zoom = 2] { line-width: 3; }");
        let order: Vec<usize> = cascade_order(&defs).iter().map(|d| d.index).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn test_zoom_union_and_images() {
        let defs = definitions(
            "#a[zoom = 1] { marker-file: url(a.svg); } #a[zoom = 3] { marker-file: url(a.svg); point-file: 'b.png'; }",
        );
        let grouping = emission_pass(&defs);
        let levels: Vec<u32> = grouping.layers[0].zoom.levels().collect();
        assert_eq!(levels, vec![1, 3]);
        assert_eq!(grouping.image_urls, vec!["a.svg", "a.svg", "b.png"]);
    }

    #[test]
    fn test_property_merge() {
        let defs = definitions("#a { marker-width: 1; [frame-offset = 1] { marker-width: [w]; } }");
        let evaluator = Evaluator::new(&[], FunctionNamespace::new());
        let grouping = group(&defs, &evaluator).unwrap();
        let width = &grouping.layers[0].properties["marker-width"];
        assert_eq!(width.fragments.len(), 2);
        assert_eq!(width.max_index, 1);
        assert!(!width.constant);
        assert!(!width.filtered);
        assert_eq!(width.symbolizer, Some(Symbolizer::Marker));
    }
}
