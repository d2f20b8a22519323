//! # cellcalc-formula
//!
//! Formula engine for cellcalc.
//!
//! This crate provides:
//! - A deterministic scanner for numbers, variables, `+ - * /` and parentheses
//! - Formula construction with caller-supplied variable normalization and validation
//! - Grammar validation with one error variant per rule
//! - A two-stack evaluator that reports runtime faults as values
//!
//! It has no notion of cells; variables are resolved through a lookup closure.
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_formula::{parse_formula, EvalErrorKind};
//!
//! let f = parse_formula("a1 + a2 * 2", |v| v.to_uppercase(), |_| true).unwrap();
//! assert_eq!(f.variables(), &["A1", "A2"]);
//!
//! let value = f.evaluate(|name| match name {
//!     "A1" => Some(15.0),
//!     "A2" => Some(5.0),
//!     _ => None,
//! });
//! assert_eq!(value, Ok(25.0));
//!
//! let err = f.evaluate(|_| None).unwrap_err();
//! assert_eq!(err.kind(), &EvalErrorKind::UnknownVariable("A1".into()));
//! ```

pub mod error;
mod evaluator;
pub mod formula;
pub mod token;

pub use error::{EvalError, EvalErrorKind, FormatError, FormatResult};
pub use formula::{parse_formula, Formula};
pub use token::{is_valid_variable, Operator, Token};
