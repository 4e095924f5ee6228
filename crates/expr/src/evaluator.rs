//! Resolves declarations into [`Contribution`]s.

use crate::error::EvalError;
use crate::expr::{Expr, arithmetic};
use crate::fragment::Fragment;
use crate::functions::BuiltinFunction;
use crate::guard::Guard;
use crate::namespace::FunctionNamespace;
use crate::reference::{PropertyInfo, lookup_property};
use log::warn;
use mapstyle_parser::{Declaration, Definition, ValueNode};
use mapstyle_types::{FeatureProperties, RenderContext, StyleValue, Symbolizer};
use std::collections::HashMap;

/// Variables may reference other variables up to this depth.
const MAX_VARIABLE_DEPTH: usize = 32;

/// One declaration's effect on one property of one definition.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub fragment: Fragment,
    pub symbolizer: Option<Symbolizer>,
    /// Specificity index of the declaration.
    pub index: usize,
    /// True when the value does not read feature data.
    pub constant: bool,
    /// True when the guard tests feature data.
    pub filtered: bool,
}

pub struct Evaluator {
    variables: HashMap<String, ValueNode>,
    namespace: FunctionNamespace,
    strict_properties: bool,
}

impl Evaluator {
    /// Later variable declarations replace earlier ones of the same name.
    pub fn new(variables: &[(String, ValueNode)], namespace: FunctionNamespace) -> Self {
        Self {
            variables: variables.iter().cloned().collect(),
            namespace,
            strict_properties: false,
        }
    }

    /// Reject property names missing from the reference table instead of
    /// warning about them.
    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.strict_properties = strict;
        self
    }

    pub fn contribute(&self, def: &Definition, decl: &Declaration) -> Result<Contribution, EvalError> {
        let info = self.property_info(decl)?;
        let value = self.compile_value(&decl.value)?;
        let guard = Guard::from_definition(def);
        let constant = !value.reads_data();
        let filtered = guard.reads_data();
        Ok(Contribution {
            fragment: Fragment::new(guard, value),
            symbolizer: info.symbolizer,
            index: decl.index,
            constant,
            filtered,
        })
    }

    fn property_info(&self, decl: &Declaration) -> Result<PropertyInfo, EvalError> {
        match lookup_property(&decl.name) {
            Some(info) if info.known => Ok(info),
            guessed => {
                if self.strict_properties {
                    return Err(EvalError::UnknownProperty(decl.name.clone()));
                }
                warn!("Unknown property '{}' on line {}", decl.name, decl.line);
                Ok(guessed.unwrap_or(PropertyInfo {
                    symbolizer: None,
                    known: false,
                }))
            }
        }
    }

    /// Evaluates a value that may not read feature data, e.g. a `Map` property.
    pub fn constant_value(&self, node: &ValueNode) -> Result<StyleValue, EvalError> {
        let expr = self.compile_value(node)?;
        Ok(expr.eval(&FeatureProperties::new(), &RenderContext::default()))
    }

    pub fn compile_value(&self, node: &ValueNode) -> Result<Expr, EvalError> {
        self.compile(node, 0)
    }

    fn compile(&self, node: &ValueNode, depth: usize) -> Result<Expr, EvalError> {
        let expr = match node {
            ValueNode::Number(n) => Expr::Literal(StyleValue::Number(*n)),
            ValueNode::Str(s) => Expr::Literal(StyleValue::String(s.clone())),
            ValueNode::Color(c) => Expr::Literal(StyleValue::Color(*c)),
            ValueNode::Url(u) => Expr::Literal(StyleValue::Url(u.clone())),
            ValueNode::Keyword(k) => Expr::Literal(match k.as_str() {
                "true" => StyleValue::Bool(true),
                "false" => StyleValue::Bool(false),
                _ => StyleValue::Keyword(k.clone()),
            }),
            ValueNode::Field(path) => Expr::Field(path.clone()),
            ValueNode::Variable(name) => {
                if depth >= MAX_VARIABLE_DEPTH {
                    return Err(EvalError::RecursiveVariable(name.clone()));
                }
                let value = self
                    .variables
                    .get(name)
                    .ok_or_else(|| EvalError::UnknownVariable(name.clone()))?;
                self.compile(value, depth + 1)?
            }
            ValueNode::Negate(inner) => match self.compile(inner, depth)? {
                Expr::Literal(value) => Expr::Literal(
                    value
                        .as_number()
                        .map(|n| StyleValue::Number(-n))
                        .unwrap_or_default(),
                ),
                other => Expr::Negate(Box::new(other)),
            },
            ValueNode::Binary { op, left, right } => {
                match (self.compile(left, depth)?, self.compile(right, depth)?) {
                    (Expr::Literal(a), Expr::Literal(b)) => Expr::Literal(arithmetic(*op, a, b)),
                    (left, right) => Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                }
            }
            ValueNode::List(items) => {
                let items = items
                    .iter()
                    .map(|item| self.compile(item, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                match literals(&items) {
                    Some(values) => Expr::Literal(StyleValue::List(values)),
                    None => Expr::List(items),
                }
            }
            ValueNode::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.compile(arg, depth))
                    .collect::<Result<Vec<_>, _>>()?;
                self.compile_call(name, args)?
            }
        };
        Ok(expr)
    }

    fn compile_call(&self, name: &str, args: Vec<Expr>) -> Result<Expr, EvalError> {
        if let Some(func) = self.namespace.get(name) {
            return Ok(Expr::Extension {
                name: name.to_string(),
                func,
                args,
            });
        }
        let func = BuiltinFunction::from_name(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        func.check_arity(args.len())?;
        Ok(match literals(&args) {
            Some(values) => Expr::Literal(func.apply(values)),
            None => Expr::Builtin { func, args },
        })
    }
}

/// The literal values of `exprs`, if every one of them is a literal.
fn literals(exprs: &[Expr]) -> Option<Vec<StyleValue>> {
    exprs.iter().map(|e| e.as_literal().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::ExtensionFunction;
    use mapstyle_parser::{flatten, parse_stylesheet, parse_value};
    use mapstyle_types::Color;
    use serde_json::json;

    fn evaluator() -> Evaluator {
        Evaluator::new(
            &[
                ("base".to_string(), ValueNode::Number(2.0)),
                ("double".to_string(), parse_value("@base * 2").unwrap()),
                ("loop".to_string(), ValueNode::Variable("loop".into())),
            ],
            FunctionNamespace::new(),
        )
    }

    #[test]
    fn test_constant_folding_and_variables() {
        let ev = evaluator();
        let expr = ev.compile_value(&parse_value("@double + 1").unwrap()).unwrap();
        assert_eq!(expr.as_literal(), Some(&StyleValue::Number(5.0)));

        let expr = ev.compile_value(&parse_value("rgb(255, 0, 0)").unwrap()).unwrap();
        assert_eq!(expr.as_literal(), Some(&StyleValue::Color(Color::rgb(255, 0, 0))));
    }

    #[test]
    fn test_variable_errors() {
        let ev = evaluator();
        assert_eq!(
            ev.compile_value(&ValueNode::Variable("missing".into())).unwrap_err(),
            EvalError::UnknownVariable("missing".into())
        );
        assert_eq!(
            ev.compile_value(&ValueNode::Variable("loop".into())).unwrap_err(),
            EvalError::RecursiveVariable("loop".into())
        );
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let ev = evaluator();
        let err = ev.compile_value(&parse_value("testing([prop])").unwrap()).unwrap_err();
        assert_eq!(err, EvalError::UnknownFunction("testing".into()));
    }

    #[test]
    fn test_extension_from_namespace() {
        let ns = FunctionNamespace::new();
        ns.insert(
            "testing",
            ExtensionFunction::new(|args| args.first().cloned().unwrap_or_default()),
        );
        let ev = Evaluator::new(&[], ns);
        let expr = ev.compile_value(&parse_value("testing([prop])").unwrap()).unwrap();
        assert!(expr.reads_data());
        let props = json!({ "prop": 1 }).as_object().cloned().unwrap();
        assert_eq!(expr.eval(&props, &RenderContext::default()), StyleValue::Number(1.0));
    }

    #[test]
    fn test_contribution_constness() {
        let sheet = parse_stylesheet(
            "#a { line-width: 2; marker-width: [w]; [value > 2] { line-width: 3; } }",
        )
        .unwrap();
        let defs = flatten(&sheet);
        let ev = evaluator();

        let width = ev.contribute(&defs[0], &defs[0].rules[0]).unwrap();
        assert!(width.constant);
        assert_eq!(width.symbolizer, Some(Symbolizer::Line));
        assert_eq!(width.index, 0);

        let marker = ev.contribute(&defs[0], &defs[0].rules[1]).unwrap();
        assert!(!marker.constant);

        assert!(!marker.filtered);

        let filtered = ev.contribute(&defs[1], &defs[1].rules[0]).unwrap();
        assert!(filtered.constant);
        assert!(filtered.filtered);
        assert_eq!(filtered.index, 2);
    }

    #[test]
    fn test_strict_properties() {
        let sheet = parse_stylesheet("#a { line-witdh: 2; }").unwrap();
        let defs = flatten(&sheet);
        let lenient = evaluator();
        assert_eq!(
            lenient.contribute(&defs[0], &defs[0].rules[0]).unwrap().symbolizer,
            Some(Symbolizer::Line)
        );
        let strict = evaluator().with_strict_properties(true);
        assert_eq!(
            strict.contribute(&defs[0], &defs[0].rules[0]).unwrap_err(),
            EvalError::UnknownProperty("line-witdh".into())
        );
    }
}
