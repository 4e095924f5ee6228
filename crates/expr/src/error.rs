use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Variable '@{0}' not found")]
    UnknownVariable(String),

    #[error("Variable '@{0}' is defined in terms of itself")]
    RecursiveVariable(String),

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    #[error("Function '{function}' expects {expected} arguments, got {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("Function '{function}' error: {message}")]
    FunctionError { function: String, message: String },
}
