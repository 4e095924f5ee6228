//! Runtime style values and comparison operators.

use crate::color::Color;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A resolved style value, the output of every property evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum StyleValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Color(Color),
    Url(String),
    Keyword(String),
    List(Vec<StyleValue>),
    /// A named call carried through to the renderer, e.g. an image filter.
    Function { name: String, args: Vec<StyleValue> },
}

impl StyleValue {
    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    /// Truthiness used by layer filtering.
    pub fn is_truthy(&self) -> bool {
        match self {
            StyleValue::Null => false,
            StyleValue::Bool(b) => *b,
            StyleValue::Number(n) => *n != 0.0 && !n.is_nan(),
            StyleValue::String(s) | StyleValue::Keyword(s) => !s.is_empty(),
            StyleValue::List(items) => !items.is_empty(),
            StyleValue::Color(_) | StyleValue::Url(_) | StyleValue::Function { .. } => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            StyleValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) | StyleValue::Keyword(s) | StyleValue::Url(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            StyleValue::Color(c) => Some(*c),
            StyleValue::String(s) | StyleValue::Keyword(s) => {
                Color::from_name(s).or_else(|| Color::parse_hex(s).ok())
            }
            _ => None,
        }
    }

    /// Orders two values the way filters compare them: numerically when both
    /// sides read as numbers, textually otherwise.
    pub fn compare(&self, other: &StyleValue) -> Option<Ordering> {
        if self.is_null() || other.is_null() {
            return if self.is_null() && other.is_null() {
                Some(Ordering::Equal)
            } else {
                None
            };
        }
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.partial_cmp(&b);
        }
        match (self, other) {
            (StyleValue::Color(a), StyleValue::Color(b)) => (a == b).then_some(Ordering::Equal),
            _ => Some(self.to_string().cmp(&other.to_string())),
        }
    }
}

impl From<&Value> for StyleValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => StyleValue::Null,
            Value::Bool(b) => StyleValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(StyleValue::Number).unwrap_or_default(),
            Value::String(s) => StyleValue::String(s.clone()),
            Value::Array(items) => StyleValue::List(items.iter().map(StyleValue::from).collect()),
            Value::Object(_) => StyleValue::String(value.to_string()),
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::String(s.to_string())
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        StyleValue::Color(c)
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Null => write!(f, "null"),
            StyleValue::Bool(b) => write!(f, "{}", b),
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::String(s) | StyleValue::Keyword(s) => write!(f, "{}", s),
            StyleValue::Color(c) => write!(f, "{}", c),
            StyleValue::Url(u) => write!(f, "url({})", u),
            StyleValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            StyleValue::Function { name, args } => {
                let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
                write!(f, "{}({})", name, parts.join(", "))
            }
        }
    }
}

/// A comparison operator as written in a selector filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// Whether an ordering `lhs.cmp(rhs)` satisfies this operator.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        }
    }

    /// Applies the operator to two style values. Incomparable values only
    /// satisfy `!=`.
    pub fn test(&self, lhs: &StyleValue, rhs: &StyleValue) -> bool {
        match lhs.compare(rhs) {
            Some(ordering) => self.holds(ordering),
            None => *self == Comparison::Ne,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(StyleValue::from(&json!(2)), StyleValue::Number(2.0));
        assert_eq!(StyleValue::from(&json!("a")), StyleValue::String("a".into()));
        assert_eq!(StyleValue::from(&json!(null)), StyleValue::Null);
        assert_eq!(
            StyleValue::from(&json!([1, true])),
            StyleValue::List(vec![StyleValue::Number(1.0), StyleValue::Bool(true)])
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!StyleValue::Null.is_truthy());
        assert!(!StyleValue::Number(0.0).is_truthy());
        assert!(StyleValue::Number(3.0).is_truthy());
        assert!(!StyleValue::String(String::new()).is_truthy());
        assert!(StyleValue::Color(Color::rgb(1, 2, 3)).is_truthy());
    }

    #[test]
    fn test_filter_comparisons() {
        let three = StyleValue::Number(3.0);
        assert!(Comparison::Gt.test(&three, &StyleValue::Number(2.0)));
        assert!(Comparison::Eq.test(&StyleValue::String("3".into()), &three));
        assert!(Comparison::Eq.test(&StyleValue::from("park"), &StyleValue::from("park")));
        assert!(!Comparison::Eq.test(&StyleValue::Null, &three));
        assert!(Comparison::Ne.test(&StyleValue::Null, &three));
    }

    #[test]
    fn test_serialize_untagged() {
        let value = StyleValue::List(vec![StyleValue::Number(1.0), StyleValue::Keyword("butt".into())]);
        assert_eq!(serde_json::to_value(&value).unwrap(), json!([1.0, "butt"]));
    }
}
