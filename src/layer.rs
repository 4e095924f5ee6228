//! Compiled layers, the read-only objects a map renderer styles features with.

use indexmap::IndexMap;
use mapstyle_expr::Fragment;
use mapstyle_types::{FeatureProperties, RenderContext, StyleValue, Symbolizer, ZoomMask};
use serde_json::Value;

/// Property name → resolved value, in declaration order.
pub type StyleMap = IndexMap<String, StyleValue>;

/// Evaluates one property: the value of the last fragment whose guard holds,
/// or `Null` if none does.
#[derive(Debug, Clone)]
pub struct PropertyEvaluator {
    fragments: Vec<Fragment>,
}

impl PropertyEvaluator {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    pub fn evaluate(&self, props: &FeatureProperties, ctx: &RenderContext) -> StyleValue {
        // Fragments are pure, so scanning from the end gives the same result
        // as applying every one in order.
        self.fragments
            .iter()
            .rev()
            .find_map(|fragment| fragment.apply(props, ctx))
            .unwrap_or_default()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// A property of a compiled layer.
#[derive(Debug, Clone)]
pub struct CompiledProperty {
    pub evaluator: PropertyEvaluator,
    pub symbolizer: Option<Symbolizer>,
    /// The highest specificity index among the property's declarations.
    pub index: usize,
    /// True when no value expression reads feature data.
    pub constant: bool,
    /// True when some declaration is selected by a data filter.
    pub filtered: bool,
}

#[derive(Debug, Clone)]
pub struct Layer {
    full_name: String,
    name: String,
    attachment: String,
    zoom: ZoomMask,
    symbolizers: Vec<Symbolizer>,
    frames: Vec<i64>,
    properties: IndexMap<String, CompiledProperty>,
}

impl Layer {
    pub(crate) fn new(
        name: String,
        attachment: String,
        zoom: ZoomMask,
        symbolizers: Vec<Symbolizer>,
        frames: Vec<i64>,
        properties: IndexMap<String, CompiledProperty>,
    ) -> Self {
        Self {
            full_name: format!("{}::{}", name, attachment),
            name,
            attachment,
            zoom,
            symbolizers,
            frames,
            properties,
        }
    }

    /// Computes every property for one feature.
    pub fn get_style(&self, props: &FeatureProperties, ctx: &RenderContext) -> StyleMap {
        self.properties
            .iter()
            .map(|(name, property)| (name.clone(), property.evaluator.evaluate(props, ctx)))
            .collect()
    }

    /// Draw order of the layer's symbolizers.
    pub fn get_symbolizers(&self) -> &[Symbolizer] {
        &self.symbolizers
    }

    /// True if any property value reads feature data.
    pub fn is_variable(&self) -> bool {
        self.properties.values().any(|property| !property.constant)
    }

    /// True if any declaration is selected by a data filter. When neither
    /// this nor [`is_variable`](Layer::is_variable) holds, one `get_style`
    /// result can be reused for every feature at a zoom and frame.
    pub fn is_filtered(&self) -> bool {
        self.properties.values().any(|property| property.filtered)
    }

    /// Cheap pre-check: does any property resolve to a truthy value for this
    /// feature? `feature_type` is visible to `mapnik::geometry_type` filters.
    pub fn filter(&self, feature_type: &str, props: &FeatureProperties, ctx: &RenderContext) -> bool {
        let ctx = ctx.clone().with_geometry_type(feature_type);
        self.properties
            .values()
            .any(|property| property.evaluator.evaluate(props, &ctx).is_truthy())
    }

    pub fn frames(&self) -> &[i64] {
        &self.frames
    }

    pub fn transform_geometry<'a>(&self, geometry_type: &'a str) -> &'a str {
        geometry_type
    }

    pub fn transform_geometries(&self, geojson: Value) -> Value {
        geojson
    }

    /// `element::attachment`, unique within a stylesheet.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attachment(&self) -> &str {
        &self.attachment
    }

    /// Zoom levels at which any definition of this layer applies.
    pub fn zoom(&self) -> ZoomMask {
        self.zoom
    }

    /// Evaluates a single property without feature data at zoom 0, frame 0.
    pub fn eval(&self, property: &str) -> StyleValue {
        self.properties
            .get(property)
            .map(|p| p.evaluator.evaluate(&FeatureProperties::new(), &RenderContext::default()))
            .unwrap_or_default()
    }

    pub fn property(&self, name: &str) -> Option<&CompiledProperty> {
        self.properties.get(name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapstyle_expr::{Expr, Guard};
    use mapstyle_types::Comparison;
    use serde_json::json;

    fn literal(n: f64) -> Expr {
        Expr::Literal(StyleValue::Number(n))
    }

    fn zoom_guard(level: u32) -> Guard {
        Guard {
            zoom: ZoomMask::from_comparison(Comparison::Eq, level),
            ..Guard::always()
        }
    }

    #[test]
    fn test_last_satisfied_fragment_wins() {
        let evaluator = PropertyEvaluator::new(vec![
            Fragment::new(Guard::always(), literal(10.0)),
            Fragment::new(zoom_guard(1), literal(1.0)),
            Fragment::new(zoom_guard(2), literal(2.0)),
        ]);
        let props = FeatureProperties::new();
        assert_eq!(evaluator.evaluate(&props, &RenderContext::new(0, 0)), StyleValue::Number(10.0));
        assert_eq!(evaluator.evaluate(&props, &RenderContext::new(1, 0)), StyleValue::Number(1.0));
        assert_eq!(evaluator.evaluate(&props, &RenderContext::new(2, 0)), StyleValue::Number(2.0));
    }

    #[test]
    fn test_no_fragment_yields_null() {
        let evaluator = PropertyEvaluator::new(vec![Fragment::new(zoom_guard(5), literal(1.0))]);
        assert_eq!(
            evaluator.evaluate(&FeatureProperties::new(), &RenderContext::default()),
            StyleValue::Null
        );
    }

    #[test]
    fn test_identity_hooks() {
        let layer = Layer::new(
            "#a".into(),
            "__default__".into(),
            ZoomMask::ALL,
            Vec::new(),
            vec![0],
            IndexMap::new(),
        );
        assert_eq!(layer.full_name(), "#a::__default__");
        assert_eq!(layer.transform_geometry("polygon"), "polygon");
        let geojson = json!({ "type": "Point", "coordinates": [1, 2] });
        assert_eq!(layer.transform_geometries(geojson.clone()), geojson);
        assert_eq!(layer.eval("missing"), StyleValue::Null);
    }
}
