use crate::layer::Layer;
use indexmap::IndexMap;
use mapstyle_parser::DEFAULT_ATTACHMENT;
use mapstyle_types::StyleValue;

/// The result of compiling a stylesheet: ordered layers plus metadata.
#[derive(Debug, Clone)]
pub struct CompiledStylesheet {
    layers: Vec<Layer>,
    image_urls: Vec<String>,
    map_properties: IndexMap<String, StyleValue>,
}

/// Attribute match for [`CompiledStylesheet::find_layer_by`]. Unset fields
/// match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerQuery {
    pub name: Option<String>,
    pub attachment: Option<String>,
    pub full_name: Option<String>,
}

impl LayerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    pub fn full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn matches(&self, layer: &Layer) -> bool {
        self.name.as_deref().is_none_or(|n| n == layer.name())
            && self.attachment.as_deref().is_none_or(|a| a == layer.attachment())
            && self.full_name.as_deref().is_none_or(|f| f == layer.full_name())
    }
}

impl CompiledStylesheet {
    pub(crate) fn new(
        layers: Vec<Layer>,
        image_urls: Vec<String>,
        map_properties: IndexMap<String, StyleValue>,
    ) -> Self {
        Self {
            layers,
            image_urls,
            map_properties,
        }
    }

    pub fn get_layers(&self) -> &[Layer] {
        &self.layers
    }

    /// The first layer without a named attachment.
    pub fn get_default(&self) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.attachment() == DEFAULT_ATTACHMENT)
    }

    pub fn find_layer<P>(&self, predicate: P) -> Option<&Layer>
    where
        P: Fn(&Layer) -> bool,
    {
        self.layers.iter().find(|layer| predicate(layer))
    }

    pub fn find_layer_by(&self, query: &LayerQuery) -> Option<&Layer> {
        self.find_layer(|layer| query.matches(layer))
    }

    /// Literal `marker-file`/`point-file` URLs in scan order, duplicates kept.
    pub fn get_image_urls(&self) -> &[String] {
        &self.image_urls
    }

    /// Properties of the `Map { ... }` block, e.g. `-torque-frame-count`.
    pub fn map_properties(&self) -> &IndexMap<String, StyleValue> {
        &self.map_properties
    }
}
