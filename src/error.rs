// src/error.rs
use mapstyle_expr::EvalError;
use mapstyle_parser::SyntaxError;
use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a stylesheet from compiling.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("Stylesheet has {} syntax error(s): {}", .0.len(), join(.0))]
    Syntax(Vec<SyntaxError>),

    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Stylesheet contains no rule definitions")]
    NoRulesFound,

    #[error("Extension functions did not resolve within {0:?}")]
    ExtensionTimeout(Duration),

    #[error("Extension function failed: {0}")]
    Extension(String),
}

impl CompileError {
    /// The error as a list of human readable messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            CompileError::Syntax(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl From<Vec<SyntaxError>> for CompileError {
    fn from(errors: Vec<SyntaxError>) -> Self {
        CompileError::Syntax(errors)
    }
}

fn join(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_messages_are_listed() {
        let err = CompileError::Syntax(vec![
            SyntaxError { line: 1, column: 2, message: "bad".into() },
            SyntaxError { line: 3, column: 1, message: "worse".into() },
        ]);
        assert_eq!(err.messages(), vec!["line 1, column 2: bad", "line 3, column 1: worse"]);
        assert!(err.to_string().starts_with("Stylesheet has 2 syntax error(s)"));
        assert_eq!(CompileError::NoRulesFound.messages().len(), 1);
    }
}
