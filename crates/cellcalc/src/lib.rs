//! # cellcalc
//!
//! An in-memory spreadsheet core: cells hold numbers, text, or arithmetic
//! formulas over other cells, and every edit recalculates exactly the cells
//! it affects, in dependency order.
//!
//! ## Features
//!
//! - Formulas with `+ - * /`, parentheses, decimal and scientific numbers
//! - Configurable name normalization and validation
//! - Runtime faults (division by zero, unresolvable references) stored as cell values
//! - Edits that would create a circular reference are rejected without side effects
//!
//! ## Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let options = SpreadsheetOptions::new().with_normalizer(|name| name.to_uppercase());
//! let mut sheet = Spreadsheet::with_options(options);
//!
//! sheet.set_contents_of_cell("a1", "2").unwrap();
//! sheet.set_contents_of_cell("b1", "=a1 * 3").unwrap();
//! assert_eq!(sheet.cell_value("B1").unwrap(), &CellValue::Number(6.0));
//!
//! // B1 already depends on A1
//! let err = sheet.set_contents_of_cell("A1", "=B1").unwrap_err();
//! assert!(matches!(err, Error::Circular(_)));
//! assert_eq!(sheet.cell_contents("A1").unwrap(), &CellContents::Number(2.0));
//! ```

pub mod error;
pub mod options;
pub mod prelude;
pub mod spreadsheet;

pub use error::{Error, Result};
pub use options::{Normalizer, SpreadsheetOptions, Validator};
pub use spreadsheet::{CellContents, CellValue, Spreadsheet};

// Re-export engine types
pub use cellcalc_core::{CycleError, DependencyGraph};
pub use cellcalc_formula::{
    is_valid_variable, parse_formula, EvalError, EvalErrorKind, FormatError, Formula,
};
