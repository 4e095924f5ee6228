use serde::{Deserialize, Serialize};

/// Per-feature attribute data handed to evaluators by the renderer.
pub type FeatureProperties = serde_json::Map<String, serde_json::Value>;

/// Rendering state that conditional declarations are keyed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Current integer zoom level.
    #[serde(default)]
    pub zoom: u32,
    /// Animation frame offset being drawn.
    #[serde(default, rename = "frame-offset")]
    pub frame_offset: i64,
    /// Geometry type of the feature being drawn (`point`, `linestring`, `polygon`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_type: Option<String>,
}

impl RenderContext {
    pub fn new(zoom: u32, frame_offset: i64) -> Self {
        Self {
            zoom,
            frame_offset,
            geometry_type: None,
        }
    }

    pub fn with_zoom(mut self, zoom: u32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_frame_offset(mut self, frame_offset: i64) -> Self {
        self.frame_offset = frame_offset;
        self
    }

    pub fn with_geometry_type(mut self, geometry_type: impl Into<String>) -> Self {
        self.geometry_type = Some(geometry_type.into());
        self
    }
}
