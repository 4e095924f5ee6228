use crate::expr::Expr;
use crate::guard::Guard;
use mapstyle_types::{FeatureProperties, RenderContext, StyleValue};
use std::fmt;

/// One declaration's guarded assignment to a property.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub guard: Guard,
    pub value: Expr,
}

impl Fragment {
    pub fn new(guard: Guard, value: Expr) -> Self {
        Self { guard, value }
    }

    /// Evaluates the value if the guard holds.
    pub fn apply(&self, props: &FeatureProperties, ctx: &RenderContext) -> Option<StyleValue> {
        self.guard
            .matches(props, ctx)
            .then(|| self.value.eval(props, ctx))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if zoom in {}", self.guard.zoom)?;
        if let Some(offset) = self.guard.frame_offset {
            write!(f, " && frame-offset = {}", offset)?;
        }
        if !self.guard.filters.is_empty() {
            write!(f, " && {} data filter(s)", self.guard.filters.len())?;
        }
        match self.value.as_literal() {
            Some(value) => write!(f, " => {}", value),
            None if self.value.reads_data() => write!(f, " => <data expression>"),
            None => write!(f, " => <expression>"),
        }
    }
}
