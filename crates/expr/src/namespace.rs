//! The per-compile table of resolved extension functions.

use log::debug;
use mapstyle_types::StyleValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// An evaluator produced by a caller-registered extension. It receives the
/// evaluated call arguments for one feature and returns the property value.
#[derive(Clone)]
pub struct ExtensionFunction(Arc<dyn Fn(&[StyleValue]) -> StyleValue + Send + Sync>);

impl ExtensionFunction {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[StyleValue]) -> StyleValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[StyleValue]) -> StyleValue {
        (self.0)(args)
    }
}

impl fmt::Debug for ExtensionFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExtensionFunction(..)")
    }
}

/// Name → resolved extension function. Cloning shares the underlying table,
/// so concurrently resolving extensions can each hold a handle. Inserts under
/// the same name overwrite: the last writer wins.
#[derive(Debug, Clone, Default)]
pub struct FunctionNamespace {
    functions: Arc<RwLock<HashMap<String, ExtensionFunction>>>,
}

impl FunctionNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, function: ExtensionFunction) {
        let name = name.into();
        let mut functions = match self.functions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if functions.insert(name.clone(), function).is_some() {
            debug!("Extension '{}' resolved more than once; keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<ExtensionFunction> {
        let functions = match self.functions.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        functions.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        match self.functions.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_insert_wins() {
        let ns = FunctionNamespace::new();
        ns.insert("f", ExtensionFunction::new(|_| StyleValue::Number(1.0)));
        let handle = ns.clone();
        handle.insert("f", ExtensionFunction::new(|_| StyleValue::Number(2.0)));
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("f").unwrap().call(&[]), StyleValue::Number(2.0));
        assert!(ns.get("g").is_none());
    }
}
