//! Prelude module - common imports for cellcalc users
//!
//! ```rust
//! use cellcalc::prelude::*;
//! ```

pub use crate::{
    CellContents, CellValue, CycleError, Error, EvalError, EvalErrorKind, FormatError, Formula,
    Result, Spreadsheet, SpreadsheetOptions,
};
