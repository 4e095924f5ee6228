use serde::{Deserialize, Serialize};
use std::fmt;

/// A rendering primitive a style property contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symbolizer {
    Polygon,
    PolygonPattern,
    Line,
    LinePattern,
    Marker,
    Point,
    Text,
    Shield,
    Building,
    Raster,
}

impl Symbolizer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbolizer::Polygon => "polygon",
            Symbolizer::PolygonPattern => "polygon-pattern",
            Symbolizer::Line => "line",
            Symbolizer::LinePattern => "line-pattern",
            Symbolizer::Marker => "marker",
            Symbolizer::Point => "point",
            Symbolizer::Text => "text",
            Symbolizer::Shield => "shield",
            Symbolizer::Building => "building",
            Symbolizer::Raster => "raster",
        }
    }
}

impl fmt::Display for Symbolizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
