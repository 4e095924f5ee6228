//! Caller-registered extension functions.
//!
//! An extension is named in a stylesheet like any other function, e.g.
//! `marker-width: testing([prop]);`. Before compiling, every declaration whose
//! value is a single call to a registered extension hands its unevaluated
//! arguments to the extension, which asynchronously produces the
//! [`ExtensionFunction`] evaluated per feature.

use mapstyle_expr::ExtensionFunction;
use mapstyle_parser::ValueNode;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ExtensionFuture = Pin<Box<dyn Future<Output = ExtensionFunction> + Send + 'static>>;

/// Prepares an evaluator for one call site of a named extension function.
pub trait Extension: Send + Sync {
    fn prepare(&self, args: Vec<ValueNode>) -> ExtensionFuture;
}

impl<F, Fut> Extension for F
where
    F: Fn(Vec<ValueNode>) -> Fut + Send + Sync,
    Fut: Future<Output = ExtensionFunction> + Send + 'static,
{
    fn prepare(&self, args: Vec<ValueNode>) -> ExtensionFuture {
        Box::pin(self(args))
    }
}

/// Extensions registered with a renderer, by function name.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    extensions: HashMap<String, Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `extension` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: impl Into<String>, extension: impl Extension + 'static) {
        self.extensions.insert(name.into(), Arc::new(extension));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.extensions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ExtensionRegistry").field("extensions", &names).finish()
    }
}
