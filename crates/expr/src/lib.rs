//! Turns parsed declaration values into executable, guarded fragments.

pub mod error;
pub mod evaluator;
pub mod expr;
pub mod fragment;
pub mod functions;
pub mod guard;
pub mod namespace;
pub mod reference;

pub use error::EvalError;
pub use evaluator::{Contribution, Evaluator};
pub use expr::Expr;
pub use fragment::Fragment;
pub use functions::BuiltinFunction;
pub use guard::Guard;
pub use namespace::{ExtensionFunction, FunctionNamespace};
pub use reference::{PropertyInfo, lookup_property};
