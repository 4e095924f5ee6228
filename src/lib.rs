//! Compiles CartoCSS-style map stylesheets into layers of per-feature style
//! evaluators.
//!
//! # Example
//!
//! ```ignore
//! use mapstyle::{Renderer, RendererOptions, RenderContext, FeatureProperties};
//!
//! let renderer = Renderer::new(RendererOptions::default());
//! let stylesheet = renderer.render("#roads { line-width: 2; [zoom > 12] { line-width: 4; } }").await?;
//! let layer = &stylesheet.get_layers()[0];
//! let style = layer.get_style(&FeatureProperties::new(), &RenderContext::new(14, 0));
//! ```

pub mod config;
pub mod error;
pub mod extensions;
pub mod layer;
mod pipeline;
pub mod renderer;
pub mod stylesheet;

pub use config::RendererOptions;
pub use error::CompileError;
pub use extensions::{Extension, ExtensionFuture, ExtensionRegistry};
pub use layer::{CompiledProperty, Layer, PropertyEvaluator, StyleMap};
pub use renderer::Renderer;
pub use stylesheet::{CompiledStylesheet, LayerQuery};

pub use mapstyle_expr::{EvalError, ExtensionFunction};
pub use mapstyle_parser::{DEFAULT_ATTACHMENT, SyntaxError, ValueNode};
pub use mapstyle_types::{Color, FeatureProperties, RenderContext, StyleValue, Symbolizer, ZoomMask};
