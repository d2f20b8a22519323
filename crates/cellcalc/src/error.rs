//! Error types for cellcalc

use cellcalc_core::CycleError;
use cellcalc_formula::FormatError;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that reject a spreadsheet edit
///
/// A rejected edit leaves the spreadsheet exactly as it was. Runtime
/// evaluation faults are not errors here; they are stored as
/// [`CellValue::Error`](crate::CellValue::Error).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Cell name fails the variable grammar or the configured validator
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    /// Cells only hold finite numbers
    #[error("Cell {name} cannot hold the non-finite number {value}")]
    NonFiniteNumber { name: String, value: f64 },

    /// Formula text could not be parsed
    #[error("Formula format error: {0}")]
    Format(#[from] FormatError),

    /// The edit would make a cell depend on itself
    #[error(transparent)]
    Circular(#[from] CycleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::InvalidName("1A".into()).to_string(),
            "Invalid cell name: 1A"
        );

        let err: Error = CycleError::new("A1", vec!["A1".into()]).into();
        assert_eq!(
            err.to_string(),
            "Circular dependency detected involving A1"
        );

        let err = Error::NonFiniteNumber {
            name: "A1".into(),
            value: f64::INFINITY,
        };
        assert_eq!(err.to_string(), "Cell A1 cannot hold the non-finite number inf");

        let err: Error = FormatError::Empty.into();
        assert!(err.to_string().starts_with("Formula format error: "));
    }
}
