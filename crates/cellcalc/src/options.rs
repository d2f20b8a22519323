//! Spreadsheet configuration

use std::fmt;
use std::sync::Arc;

/// Maps a cell name or formula variable to its canonical spelling
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Decides whether a normalized name is acceptable
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Options for a [`Spreadsheet`](crate::Spreadsheet)
///
/// # Example
///
/// ```rust
/// use cellcalc::SpreadsheetOptions;
///
/// let options = SpreadsheetOptions::new()
///     .with_normalizer(|name| name.to_uppercase())
///     .with_validator(|name| name.len() <= 3)
///     .with_version("v1");
///
/// assert_eq!(options.normalize_name("a1"), "A1");
/// assert!(!options.accepts("ABCD"));
/// ```
#[derive(Clone)]
pub struct SpreadsheetOptions {
    /// Applied to cell names and formula variables (default: identity)
    pub normalize: Normalizer,
    /// Restricts acceptable normalized names (default: accept all)
    pub is_valid: Validator,
    /// Version label reported by [`Spreadsheet::version`](crate::Spreadsheet::version)
    pub version: String,
}

impl Default for SpreadsheetOptions {
    fn default() -> Self {
        Self {
            normalize: Arc::new(|name: &str| name.to_string()),
            is_valid: Arc::new(|_: &str| true),
            version: "default".to_string(),
        }
    }
}

impl fmt::Debug for SpreadsheetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetOptions")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl SpreadsheetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer<F>(mut self, normalize: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.normalize = Arc::new(normalize);
        self
    }

    pub fn with_validator<F>(mut self, is_valid: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.is_valid = Arc::new(is_valid);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn normalize_name(&self, name: &str) -> String {
        (self.normalize)(name)
    }

    pub fn accepts(&self, normalized: &str) -> bool {
        (self.is_valid)(normalized)
    }
}
