use crate::foundation::error::SceneError;
use std::fmt;

/// Failure to lex, parse or evaluate an inline expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError {
    /// Byte offset into the source, or 0 for evaluation failures.
    pub offset: usize,
    /// Human readable reason.
    pub message: String,
}

impl ExprError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn eval(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expr error at byte {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ExprError {}

impl From<ExprError> for SceneError {
    fn from(value: ExprError) -> Self {
        SceneError::expression(value.to_string())
    }
}
