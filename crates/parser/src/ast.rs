//! Defines the syntax tree produced by the stylesheet parser.

use mapstyle_types::{Color, Comparison};
use std::fmt;

/// A property value expression as written in the stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    Number(f64),
    Str(String),
    Color(Color),
    Keyword(String),
    Url(String),
    /// A bracketed reference to feature data, e.g. `[population]`.
    Field(FieldPath),
    /// A stylesheet variable reference, e.g. `@base`.
    Variable(String),
    Call {
        name: String,
        args: Vec<ValueNode>,
    },
    Binary {
        op: ArithmeticOperator,
        left: Box<ValueNode>,
        right: Box<ValueNode>,
    },
    Negate(Box<ValueNode>),
    List(Vec<ValueNode>),
}

impl ValueNode {
    /// Returns the call name and arguments if the value is a single function call.
    pub fn as_call(&self) -> Option<(&str, &[ValueNode])> {
        match self {
            ValueNode::Call { name, args } => Some((name, args)),
            _ => None,
        }
    }

    /// Returns the literal URL of a `url(...)` or quoted string value.
    pub fn literal_url(&self) -> Option<&str> {
        match self {
            ValueNode::Url(url) | ValueNode::Str(url) => Some(url),
            _ => None,
        }
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueNode::Number(n) => write!(f, "{}", n),
            ValueNode::Str(s) => write!(f, "\"{}\"", s),
            ValueNode::Color(c) => write!(f, "{}", c),
            ValueNode::Keyword(k) => write!(f, "{}", k),
            ValueNode::Url(u) => write!(f, "url({})", u),
            ValueNode::Field(path) => write!(f, "[{}]", path),
            ValueNode::Variable(name) => write!(f, "@{}", name),
            ValueNode::Call { name, args } => {
                let parts: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, parts.join(", "))
            }
            ValueNode::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            ValueNode::Negate(inner) => write!(f, "-{}", inner),
            ValueNode::List(items) => {
                let parts: Vec<String> = items.iter().map(|a| a.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
        };
        f.write_str(symbol)
    }
}

/// A dotted path into feature data, e.g. `test.a`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(path: &str) -> Self {
        FieldPath(path.split('.').map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// A single `name: value;` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: ValueNode,
    /// Global source order of the declaration within the stylesheet.
    pub index: usize,
    pub line: usize,
}

/// The left-hand side of a data filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterKey {
    Field(FieldPath),
    GeometryType,
}

/// The right-hand side of a data filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOperand {
    Number(f64),
    Str(String),
    Field(FieldPath),
}

/// A filter on feature data, e.g. `[population > 1000]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub key: FilterKey,
    pub op: Comparison,
    pub value: FilterOperand,
}

/// One bracketed condition of a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorFilter {
    Zoom(Comparison, u32),
    FrameOffset(i64),
    Data(Filter),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selector {
    /// Element names such as `#world` or `.roads`, outermost first.
    pub elements: Vec<String>,
    pub attachment: Option<String>,
    pub filters: Vec<SelectorFilter>,
}

impl Selector {
    /// Combines a parent selector with a nested child selector.
    pub fn nest(&self, child: &Selector) -> Selector {
        let attachment = match (&self.attachment, &child.attachment) {
            (Some(parent), Some(own)) => Some(format!("{}/{}", parent, own)),
            (parent, own) => own.clone().or_else(|| parent.clone()),
        };
        Selector {
            elements: self
                .elements
                .iter()
                .chain(child.elements.iter())
                .cloned()
                .collect(),
            attachment,
            filters: self
                .filters
                .iter()
                .chain(child.filters.iter())
                .cloned()
                .collect(),
        }
    }

    pub fn is_map(&self) -> bool {
        self.elements.len() == 1 && self.elements[0] == "Map"
    }
}

/// A block of declarations and nested blocks guarded by one or more selectors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ruleset {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    pub children: Vec<Ruleset>,
}

/// The full result of parsing a stylesheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStylesheet {
    pub variables: Vec<(String, ValueNode)>,
    /// Declarations of the top-level `Map { ... }` block.
    pub map_properties: Vec<Declaration>,
    pub rulesets: Vec<Ruleset>,
}
