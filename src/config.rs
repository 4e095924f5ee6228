use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options controlling a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererOptions {
    /// Log every compiled layer and its fragments at `debug` level.
    pub debug: bool,
    /// Upper bound on extension pre-processing. `None` waits indefinitely.
    pub extension_timeout: Option<Duration>,
    /// Fail on property names missing from the reference table.
    pub strict_properties: bool,
}

impl RendererOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_extension_timeout(mut self, timeout: Duration) -> Self {
        self.extension_timeout = Some(timeout);
        self
    }

    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_from_json() {
        let options: RendererOptions = serde_json::from_value(json!({
            "strictProperties": true,
            "extensionTimeout": { "secs": 2, "nanos": 0 }
        }))
        .unwrap();
        assert_eq!(
            options,
            RendererOptions::new()
                .with_strict_properties(true)
                .with_extension_timeout(Duration::from_secs(2))
        );
        assert!(!options.debug);
    }
}
