//! The table of supported style properties and the symbolizer each feeds.

use mapstyle_types::Symbolizer;

/// What the reference knows about a property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyInfo {
    /// `None` for layer-level properties such as `comp-op` or `image-filters`.
    pub symbolizer: Option<Symbolizer>,
    /// False when the name was not in the table and the symbolizer was
    /// guessed from its prefix.
    pub known: bool,
}

const LAYER_PROPERTIES: &[&str] = &[
    "comp-op",
    "direct-image-filters",
    "image-filters",
    "image-filters-inflate",
    "opacity",
];

const POLYGON: &[&str] = &[
    "fill", "opacity", "gamma", "gamma-method", "clip", "simplify", "simplify-algorithm",
    "smooth", "geometry-transform", "comp-op",
];

const POLYGON_PATTERN: &[&str] = &[
    "file", "alignment", "gamma", "opacity", "clip", "simplify", "simplify-algorithm",
    "smooth", "geometry-transform", "comp-op",
];

const LINE: &[&str] = &[
    "color", "width", "opacity", "join", "cap", "gamma", "gamma-method", "dasharray",
    "dash-offset", "miterlimit", "clip", "simplify", "simplify-algorithm", "smooth", "offset",
    "rasterizer", "geometry-transform", "comp-op",
];

const LINE_PATTERN: &[&str] = &[
    "file", "clip", "simplify", "simplify-algorithm", "smooth", "offset", "geometry-transform",
    "comp-op",
];

const MARKER: &[&str] = &[
    "file", "opacity", "fill-opacity", "line-color", "line-width", "line-opacity", "placement",
    "multi-policy", "type", "width", "height", "fill", "allow-overlap", "ignore-placement",
    "spacing", "max-error", "transform", "clip", "simplify", "simplify-algorithm", "smooth",
    "geometry-transform", "comp-op",
];

const POINT: &[&str] = &[
    "file", "allow-overlap", "ignore-placement", "opacity", "placement", "transform", "comp-op",
];

const TEXT: &[&str] = &[
    "name", "face-name", "size", "ratio", "wrap-width", "wrap-before", "wrap-character",
    "spacing", "character-spacing", "line-spacing", "label-position-tolerance",
    "max-char-angle-delta", "fill", "opacity", "halo-fill", "halo-radius", "dx", "dy",
    "vertical-alignment", "avoid-edges", "min-distance", "min-padding", "min-path-length",
    "allow-overlap", "orientation", "placement", "placement-type", "placements", "transform",
    "horizontal-alignment", "align", "clip", "comp-op",
];

const SHIELD: &[&str] = &[
    "name", "file", "face-name", "size", "fill", "placement", "avoid-edges", "allow-overlap",
    "min-distance", "spacing", "halo-fill", "halo-radius", "dx", "dy", "opacity",
    "text-opacity", "text-dx", "text-dy", "wrap-width", "clip", "comp-op",
];

const BUILDING: &[&str] = &["fill", "fill-opacity", "height"];

const RASTER: &[&str] = &["opacity", "filter-factor", "scaling", "mesh-size", "comp-op"];

/// Longest prefixes first so `line-pattern-*` is not taken for `line-*`.
const SYMBOLIZERS: &[(&str, Symbolizer, &[&str])] = &[
    ("polygon-pattern-", Symbolizer::PolygonPattern, POLYGON_PATTERN),
    ("line-pattern-", Symbolizer::LinePattern, LINE_PATTERN),
    ("polygon-", Symbolizer::Polygon, POLYGON),
    ("line-", Symbolizer::Line, LINE),
    ("marker-", Symbolizer::Marker, MARKER),
    ("point-", Symbolizer::Point, POINT),
    ("text-", Symbolizer::Text, TEXT),
    ("shield-", Symbolizer::Shield, SHIELD),
    ("building-", Symbolizer::Building, BUILDING),
    ("raster-", Symbolizer::Raster, RASTER),
];

/// Looks up a property name. Returns `None` only when neither the table nor
/// a symbolizer prefix recognises it.
pub fn lookup_property(name: &str) -> Option<PropertyInfo> {
    if LAYER_PROPERTIES.contains(&name) {
        return Some(PropertyInfo {
            symbolizer: None,
            known: true,
        });
    }
    SYMBOLIZERS
        .iter()
        .find_map(|(prefix, symbolizer, suffixes)| {
            name.strip_prefix(prefix).map(|suffix| PropertyInfo {
                symbolizer: Some(*symbolizer),
                known: suffixes.contains(&suffix),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_properties() {
        let info = lookup_property("polygon-fill").unwrap();
        assert_eq!(info.symbolizer, Some(Symbolizer::Polygon));
        assert!(info.known);
        assert_eq!(
            lookup_property("line-pattern-file").unwrap().symbolizer,
            Some(Symbolizer::LinePattern)
        );
        assert_eq!(lookup_property("comp-op").unwrap().symbolizer, None);
        assert_eq!(
            lookup_property("marker-file").unwrap().symbolizer,
            Some(Symbolizer::Marker)
        );
    }

    #[test]
    fn test_misspelled_property_keeps_prefix_symbolizer() {
        let info = lookup_property("line-witdh").unwrap();
        assert_eq!(info.symbolizer, Some(Symbolizer::Line));
        assert!(!info.known);
        assert!(lookup_property("frobnicate").is_none());
    }
}
