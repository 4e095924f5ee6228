use thiserror::Error;

/// A problem found in the stylesheet text, located by 1-based line and column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    /// Builds an error located at the start of `remaining` within `source`.
    pub fn at(source: &str, remaining: &str, message: impl Into<String>) -> Self {
        let offset = source.len().saturating_sub(remaining.len());
        let consumed = &source[..offset];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rfind('\n')
            .map(|nl| offset - nl)
            .unwrap_or(offset + 1);
        SyntaxError {
            line,
            column,
            message: message.into(),
        }
    }
}
