pub mod color;
pub mod context;
pub mod symbolizer;
pub mod value;
pub mod zoom;

pub use color::Color;
pub use context::{FeatureProperties, RenderContext};
pub use symbolizer::Symbolizer;
pub use value::{Comparison, StyleValue};
pub use zoom::ZoomMask;
