//! Conditions under which a fragment applies.

use crate::expr::lookup_field;
use mapstyle_parser::{Definition, Filter, FilterKey, FilterOperand};
use mapstyle_types::{FeatureProperties, RenderContext, StyleValue, ZoomMask};

/// The condition derived from a definition's zoom, frame and data filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub zoom: ZoomMask,
    /// `None` matches every frame.
    pub frame_offset: Option<i64>,
    pub filters: Vec<Filter>,
}

impl Default for Guard {
    fn default() -> Self {
        Self::always()
    }
}

impl Guard {
    /// A guard that every feature and context satisfies.
    pub fn always() -> Self {
        Self {
            zoom: ZoomMask::ALL,
            frame_offset: None,
            filters: Vec::new(),
        }
    }

    pub fn from_definition(def: &Definition) -> Self {
        Self {
            zoom: def.zoom,
            frame_offset: (def.frame_offset != 0).then_some(def.frame_offset),
            filters: def.filters.clone(),
        }
    }

    pub fn is_always(&self) -> bool {
        self.zoom.is_all() && self.frame_offset.is_none() && self.filters.is_empty()
    }

    /// Whether the guard depends on per-feature input.
    pub fn reads_data(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn matches(&self, props: &FeatureProperties, ctx: &RenderContext) -> bool {
        if !self.zoom.contains(ctx.zoom) {
            return false;
        }
        if self.frame_offset.is_some_and(|offset| offset != ctx.frame_offset) {
            return false;
        }
        self.filters.iter().all(|filter| filter_matches(filter, props, ctx))
    }
}

fn filter_matches(filter: &Filter, props: &FeatureProperties, ctx: &RenderContext) -> bool {
    match &filter.key {
        FilterKey::Field(path) => {
            let lhs = lookup_field(props, path);
            let rhs = match &filter.value {
                FilterOperand::Number(n) => StyleValue::Number(*n),
                FilterOperand::Str(s) => StyleValue::String(s.clone()),
                FilterOperand::Field(other) => lookup_field(props, other),
            };
            filter.op.test(&lhs, &rhs)
        }
        FilterKey::GeometryType => {
            let geometry = ctx.geometry_type.as_deref().map(str::to_ascii_lowercase);
            let (lhs, rhs) = match &filter.value {
                FilterOperand::Number(n) => (
                    geometry.map(|g| StyleValue::Number(geometry_code(&g))).unwrap_or_default(),
                    StyleValue::Number(*n),
                ),
                FilterOperand::Str(s) => (
                    geometry.map(StyleValue::String).unwrap_or_default(),
                    StyleValue::String(s.to_ascii_lowercase()),
                ),
                FilterOperand::Field(path) => (
                    geometry.map(StyleValue::String).unwrap_or_default(),
                    StyleValue::String(path.to_string().to_ascii_lowercase()),
                ),
            };
            filter.op.test(&lhs, &rhs)
        }
    }
}

/// Numeric geometry codes used by `[mapnik::geometry_type = 3]` style filters.
fn geometry_code(geometry: &str) -> f64 {
    match geometry {
        "point" | "multipoint" => 1.0,
        "linestring" | "multilinestring" => 2.0,
        "polygon" | "multipolygon" => 3.0,
        _ => 4.0,
    }
}
