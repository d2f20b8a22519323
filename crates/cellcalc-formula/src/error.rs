//! Formula error types

use std::fmt;
use thiserror::Error;

/// Result type for formula construction
pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// Errors that can occur while building a [`Formula`](crate::Formula) from text
///
/// Every variant corresponds to exactly one rule, so callers can tell the
/// failures apart without inspecting the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A substring that is not a number, variable, operator or parenthesis
    #[error("Invalid token '{0}'")]
    InvalidToken(String),

    /// The normalizer produced something that is not a legal variable
    #[error("Variable '{token}' normalizes to '{normalized}', which is not a legal variable")]
    IllegalVariable { token: String, normalized: String },

    /// The validator rejected a normalized variable
    #[error("Variable '{0}' is not valid")]
    RejectedVariable(String),

    /// A number literal that does not fit in a finite `f64`
    #[error("Number '{0}' is out of range")]
    NumberOutOfRange(String),

    /// Rule 1: no tokens at all
    #[error("A formula must contain at least one token")]
    Empty,

    /// Rule 2: a `)` with no open `(` to its left
    #[error("Closing parenthesis at token {position} has no matching opening parenthesis")]
    UnmatchedClosingParen { position: usize },

    /// Rule 3: totals of `(` and `)` differ
    #[error("Unbalanced parentheses: {open} opening, {close} closing")]
    UnbalancedParens { open: usize, close: usize },

    /// Rule 4: the first token must be a number, variable or `(`
    #[error("A formula cannot start with '{0}'")]
    InvalidStart(String),

    /// Rule 5: the last token must be a number, variable or `)`
    #[error("A formula cannot end with '{0}'")]
    InvalidEnd(String),

    /// Rule 6: after `(` or an operator, expected a number, variable or `(`
    #[error("Expected a number, variable or '(' after '{after}', found '{found}'")]
    ExpectedOperand { after: String, found: String },

    /// Rule 7: after a number, variable or `)`, expected an operator or `)`
    #[error("Expected an operator or ')' after '{after}', found '{found}'")]
    ExpectedOperator { after: String, found: String },
}

impl FormatError {
    /// Human-readable description of the failure
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Why an evaluation produced an error value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalErrorKind {
    DivisionByZero,
    /// The lookup function had no value for this variable
    UnknownVariable(String),
    /// The evaluation stacks ended in a shape the grammar should rule out
    Internal,
}

/// A runtime evaluation failure
///
/// This is an ordinary value, not a fault: a formula that divides by zero or
/// references an unknown variable legitimately evaluates to an `EvalError`,
/// which callers are free to store and display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct EvalError {
    kind: EvalErrorKind,
    reason: String,
}

impl EvalError {
    /// Division by zero
    pub fn division_by_zero() -> Self {
        Self {
            kind: EvalErrorKind::DivisionByZero,
            reason: "Division by zero".to_string(),
        }
    }

    /// The lookup function could not resolve `name`
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            reason: format!("Unknown variable '{}'", name),
            kind: EvalErrorKind::UnknownVariable(name),
        }
    }

    pub(crate) fn internal(detail: impl fmt::Display) -> Self {
        Self {
            kind: EvalErrorKind::Internal,
            reason: format!("Internal evaluation error: {}", detail),
        }
    }

    pub fn kind(&self) -> &EvalErrorKind {
        &self.kind
    }

    /// Human-readable reason
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
