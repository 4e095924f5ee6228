use crate::config::RendererOptions;
use crate::error::CompileError;
use crate::extensions::{Extension, ExtensionRegistry};
use crate::pipeline;
use crate::stylesheet::CompiledStylesheet;

/// Compiles stylesheets. Extensions registered here are available to every
/// subsequent [`render`](Renderer::render) call.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RendererOptions,
    extensions: ExtensionRegistry,
}

impl Renderer {
    pub fn new(options: RendererOptions) -> Self {
        Self {
            options,
            extensions: ExtensionRegistry::new(),
        }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Registers an extension function. It must be registered before
    /// `render` is called for its call sites to be discovered.
    pub fn add_function(&mut self, name: impl Into<String>, extension: impl Extension + 'static) -> &mut Self {
        self.extensions.register(name, extension);
        self
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    pub async fn render(&self, source: &str) -> Result<CompiledStylesheet, CompileError> {
        pipeline::compile(source, &self.options, &self.extensions).await
    }
}
