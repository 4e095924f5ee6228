//! Executable value expressions.

use crate::functions::BuiltinFunction;
use crate::namespace::ExtensionFunction;
use mapstyle_parser::{ArithmeticOperator, FieldPath};
use mapstyle_types::{FeatureProperties, RenderContext, StyleValue};
use serde_json::Value;

/// A compiled declaration value. Variables are already substituted and
/// function names resolved, so evaluation cannot fail.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(StyleValue),
    /// Reads a (possibly nested) attribute of the feature being styled.
    Field(FieldPath),
    Binary {
        op: ArithmeticOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    List(Vec<Expr>),
    Builtin {
        func: BuiltinFunction,
        args: Vec<Expr>,
    },
    Extension {
        name: String,
        func: ExtensionFunction,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn eval(&self, props: &FeatureProperties, ctx: &RenderContext) -> StyleValue {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::Field(path) => lookup_field(props, path),
            Expr::Binary { op, left, right } => {
                arithmetic(*op, left.eval(props, ctx), right.eval(props, ctx))
            }
            Expr::Negate(inner) => match inner.eval(props, ctx).as_number() {
                Some(n) => StyleValue::Number(-n),
                None => StyleValue::Null,
            },
            Expr::List(items) => {
                StyleValue::List(items.iter().map(|item| item.eval(props, ctx)).collect())
            }
            Expr::Builtin { func, args } => {
                func.apply(args.iter().map(|arg| arg.eval(props, ctx)).collect())
            }
            Expr::Extension { func, args, .. } => {
                let args: Vec<StyleValue> = args.iter().map(|arg| arg.eval(props, ctx)).collect();
                func.call(&args)
            }
        }
    }

    /// Whether the expression reads feature data anywhere, including inside
    /// function arguments.
    pub fn reads_data(&self) -> bool {
        match self {
            Expr::Literal(_) => false,
            Expr::Field(_) => true,
            Expr::Binary { left, right, .. } => left.reads_data() || right.reads_data(),
            Expr::Negate(inner) => inner.reads_data(),
            Expr::List(items) => items.iter().any(Expr::reads_data),
            Expr::Builtin { args, .. } | Expr::Extension { args, .. } => {
                args.iter().any(Expr::reads_data)
            }
        }
    }

    pub fn as_literal(&self) -> Option<&StyleValue> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Walks a dotted path through nested feature objects. Missing keys read as `Null`.
pub fn lookup_field(props: &FeatureProperties, path: &FieldPath) -> StyleValue {
    let mut segments = path.segments().iter();
    let Some(first) = segments.next() else {
        return StyleValue::Null;
    };
    let mut current = match props.get(first) {
        Some(value) => value,
        None => return StyleValue::Null,
    };
    for segment in segments {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return StyleValue::Null,
            },
            _ => return StyleValue::Null,
        };
    }
    StyleValue::from(current)
}

/// Applies an arithmetic operator. `+` concatenates when either side is text;
/// non-numeric operands or non-finite results give `Null`.
pub fn arithmetic(op: ArithmeticOperator, left: StyleValue, right: StyleValue) -> StyleValue {
    if op == ArithmeticOperator::Add
        && (matches!(left, StyleValue::String(_)) || matches!(right, StyleValue::String(_)))
        && (left.as_number().is_none() || right.as_number().is_none())
    {
        return StyleValue::String(format!("{}{}", left, right));
    }
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return StyleValue::Null;
    };
    let result = match op {
        ArithmeticOperator::Add => a + b,
        ArithmeticOperator::Subtract => a - b,
        ArithmeticOperator::Multiply => a * b,
        ArithmeticOperator::Divide => a / b,
    };
    if result.is_finite() {
        StyleValue::Number(result)
    } else {
        StyleValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> FeatureProperties {
        match value {
            Value::Object(map) => map,
            _ => panic!("test properties must be an object"),
        }
    }

    #[test]
    fn test_nested_field_lookup() {
        let data = props(json!({ "prop": 1, "test": { "a": 2 } }));
        assert_eq!(lookup_field(&data, &FieldPath::new("prop")), StyleValue::Number(1.0));
        assert_eq!(lookup_field(&data, &FieldPath::new("test.a")), StyleValue::Number(2.0));
        assert_eq!(lookup_field(&data, &FieldPath::new("test.b")), StyleValue::Null);
        assert_eq!(lookup_field(&data, &FieldPath::new("prop.x")), StyleValue::Null);
    }

    #[test]
    fn test_eval_arithmetic_with_fields() {
        let expr = Expr::Binary {
            op: ArithmeticOperator::Multiply,
            left: Box::new(Expr::Field(FieldPath::new("size"))),
            right: Box::new(Expr::Literal(StyleValue::Number(2.0))),
        };
        let ctx = RenderContext::default();
        assert!(expr.reads_data());
        assert_eq!(expr.eval(&props(json!({ "size": 4 })), &ctx), StyleValue::Number(8.0));
        assert_eq!(expr.eval(&props(json!({})), &ctx), StyleValue::Null);
    }

    #[test]
    fn test_string_concatenation_and_division_by_zero() {
        assert_eq!(
            arithmetic(ArithmeticOperator::Add, "km ".into(), StyleValue::Number(3.0)),
            StyleValue::String("km 3".into())
        );
        assert_eq!(
            arithmetic(ArithmeticOperator::Divide, 1.0.into(), 0.0.into()),
            StyleValue::Null
        );
    }
}
