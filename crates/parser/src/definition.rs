//! Flattens nested rulesets into one definition per selector.

use crate::ast::{Declaration, Filter, ParsedStylesheet, Ruleset, Selector, SelectorFilter};
use mapstyle_types::ZoomMask;

/// The attachment name used when a selector does not name one.
pub const DEFAULT_ATTACHMENT: &str = "__default__";

/// A flat selector together with the declarations it guards.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub elements: Vec<String>,
    pub attachment: String,
    pub zoom: ZoomMask,
    /// `0` means the definition applies to the base frame only.
    pub frame_offset: i64,
    pub filters: Vec<Filter>,
    pub rules: Vec<Declaration>,
    /// Position of the definition in parse order.
    pub index: usize,
}

impl Definition {
    fn from_selector(selector: &Selector, rules: &[Declaration], index: usize) -> Self {
        let mut zoom = ZoomMask::ALL;
        let mut frame_offset = 0;
        let mut filters = Vec::new();
        for filter in &selector.filters {
            match filter {
                SelectorFilter::Zoom(op, level) => zoom = zoom & ZoomMask::from_comparison(*op, *level),
                SelectorFilter::FrameOffset(offset) => frame_offset = *offset,
                SelectorFilter::Data(data) => filters.push(data.clone()),
            }
        }
        Definition {
            elements: selector.elements.clone(),
            attachment: selector
                .attachment
                .clone()
                .unwrap_or_else(|| DEFAULT_ATTACHMENT.to_string()),
            zoom,
            frame_offset,
            filters,
            rules: rules.to_vec(),
            index,
        }
    }

    /// The outermost element, e.g. `#world`.
    pub fn element(&self) -> &str {
        self.elements.first().map(String::as_str).unwrap_or_default()
    }

    /// The grouping key `element::attachment`.
    pub fn key(&self) -> String {
        format!("{}::{}", self.element(), self.attachment)
    }

    /// Whether any zoom, frame or data condition narrows this definition.
    pub fn is_conditioned(&self) -> bool {
        !self.zoom.is_all() || self.frame_offset != 0 || !self.filters.is_empty()
    }
}

/// Produces definitions in textual order, each parent before its nested children.
pub fn flatten(sheet: &ParsedStylesheet) -> Vec<Definition> {
    let mut out = Vec::new();
    for ruleset in &sheet.rulesets {
        for selector in &ruleset.selectors {
            flatten_into(ruleset, selector, &mut out);
        }
    }
    out
}

fn flatten_into(ruleset: &Ruleset, selector: &Selector, out: &mut Vec<Definition>) {
    if !ruleset.declarations.is_empty() {
        let index = out.len();
        out.push(Definition::from_selector(selector, &ruleset.declarations, index));
    }
    for child in &ruleset.children {
        for child_selector in &child.selectors {
            flatten_into(child, &selector.nest(child_selector), out);
        }
    }
}
