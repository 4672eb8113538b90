use crate::types::SourceSpan;
use thiserror::Error;

pub const SCRIPT_SYNTAX: &str = "SCRIPT_SYNTAX";
pub const SCRIPT_TYPE: &str = "SCRIPT_TYPE";
pub const SCRIPT_UNKNOWN_OPERATOR: &str = "SCRIPT_UNKNOWN_OPERATOR";

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct IdleError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl IdleError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::with_span(SCRIPT_SYNTAX, message, SourceSpan::line(line))
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(SCRIPT_TYPE, message)
    }

    pub fn unknown_operator(operator: &str) -> Self {
        Self::new(
            SCRIPT_UNKNOWN_OPERATOR,
            format!("Unknown operator \"{}\".", operator),
        )
    }

    /// Attaches a span unless one is already present.
    pub fn at(mut self, span: &SourceSpan) -> Self {
        if self.span.is_none() {
            self.span = Some(span.clone());
        }
        self
    }

    pub fn line(&self) -> Option<usize> {
        self.span.as_ref().map(|span| span.start.line)
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let error = IdleError::syntax("bad line", 7);
        assert_eq!(error.code, SCRIPT_SYNTAX);
        assert_eq!(error.line(), Some(7));
        assert_eq!(error.to_string(), "SCRIPT_SYNTAX: bad line");
    }

    #[test]
    fn at_keeps_an_existing_span() {
        let error = IdleError::syntax("bad", 2).at(&SourceSpan::line(9));
        assert_eq!(error.line(), Some(2));

        let error = IdleError::unknown_operator("=<").at(&SourceSpan::line(9));
        assert_eq!(error.line(), Some(9));
        assert_eq!(error.code, SCRIPT_UNKNOWN_OPERATOR);
    }
}
