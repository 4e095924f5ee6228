pub mod ast;
pub mod definition;
pub mod error;
pub mod parser;

pub use ast::{
    ArithmeticOperator, Declaration, FieldPath, Filter, FilterKey, FilterOperand, ParsedStylesheet,
    Ruleset, Selector, SelectorFilter, ValueNode,
};
pub use definition::{DEFAULT_ATTACHMENT, Definition, flatten};
pub use error::SyntaxError;
pub use parser::{parse_stylesheet, parse_value};
