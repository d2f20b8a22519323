//! In-memory cell store
//!
//! A [`Spreadsheet`] maps cell names to contents, keeps the dependency graph
//! in step with the formulas it holds, and re-evaluates affected cells in
//! dependency order after every edit.
//!
//! # Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set_contents_of_cell("A1", "15").unwrap();
//! sheet.set_contents_of_cell("A2", "10").unwrap();
//! sheet.set_contents_of_cell("A3", "=A1+A2").unwrap();
//! assert_eq!(sheet.cell_value("A3").unwrap(), &CellValue::Number(25.0));
//!
//! // A1 feeds A3, so both are recalculated
//! let order = sheet.set_contents_of_cell("A1", "5").unwrap();
//! assert_eq!(order, ["A1", "A3"]);
//! assert_eq!(sheet.cell_value("A3").unwrap(), &CellValue::Number(15.0));
//! ```

use crate::error::{Error, Result};
use crate::options::SpreadsheetOptions;
use ahash::AHashMap;
use cellcalc_core::DependencyGraph;
use cellcalc_formula::{is_valid_variable, parse_formula, EvalError, Formula};
use std::fmt;

/// What the user put in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellContents {
    Empty,
    Number(f64),
    Text(String),
    Formula(Formula),
}

impl CellContents {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Empty)
    }

    /// Names this contents reads from
    fn dependees(&self) -> &[String] {
        match self {
            CellContents::Formula(formula) => formula.variables(),
            _ => &[],
        }
    }
}

/// What a cell currently evaluates to
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    /// The cell's formula could not be evaluated
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(err) => write!(f, "#ERROR: {}", err.reason()),
        }
    }
}

static EMPTY_CONTENTS: CellContents = CellContents::Empty;
static EMPTY_VALUE: CellValue = CellValue::Empty;

#[derive(Debug, Clone)]
struct Cell {
    contents: CellContents,
    value: CellValue,
}

/// A set of named cells with formulas kept up to date
///
/// Only non-empty cells are stored. Every edit either succeeds and
/// recalculates the affected cells, or fails and leaves the spreadsheet
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct Spreadsheet {
    cells: AHashMap<String, Cell>,
    graph: DependencyGraph,
    options: SpreadsheetOptions,
    changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: SpreadsheetOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &SpreadsheetOptions {
        &self.options
    }

    pub fn version(&self) -> &str {
        &self.options.version
    }

    /// Whether any edit succeeded since creation or the last [`clear_changed`](Self::clear_changed)
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Names of all non-empty cells, in no particular order
    pub fn nonempty_cells(&self) -> impl Iterator<Item = &str> + '_ {
        self.cells.keys().map(String::as_str)
    }

    /// Contents of a cell; empty cells report [`CellContents::Empty`]
    pub fn cell_contents(&self, name: &str) -> Result<&CellContents> {
        let name = self.cell_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map_or(&EMPTY_CONTENTS, |cell| &cell.contents))
    }

    /// Current value of a cell; empty cells report [`CellValue::Empty`]
    pub fn cell_value(&self, name: &str) -> Result<&CellValue> {
        let name = self.cell_name(name)?;
        Ok(self.cells.get(&name).map_or(&EMPTY_VALUE, |cell| &cell.value))
    }

    /// Cells whose formulas reference `name` directly, sorted
    pub fn direct_dependents(&self, name: &str) -> Result<Vec<&str>> {
        let name = self.cell_name(name)?;
        let mut dependents: Vec<&str> = self.graph.dependents(&name).collect();
        dependents.sort_unstable();
        Ok(dependents)
    }

    /// Set a cell from user-entered text
    ///
    /// - `""` empties the cell
    /// - text that parses as a number stores that number
    /// - text starting with `=` stores the formula that follows it
    /// - anything else is stored as text
    ///
    /// Returns the cells that were recalculated, starting with `name` and
    /// listing every cell after the cells it depends on.
    pub fn set_contents_of_cell(&mut self, name: &str, content: &str) -> Result<Vec<String>> {
        let name = self.cell_name(name)?;

        let contents = if content.is_empty() {
            CellContents::Empty
        } else if let Some(number) = parse_number(content) {
            CellContents::Number(number)
        } else if let Some(source) = content.strip_prefix('=') {
            let options = &self.options;
            let formula = parse_formula(
                source,
                |v| options.normalize_name(v),
                |v| options.accepts(v),
            )?;
            CellContents::Formula(formula)
        } else {
            CellContents::Text(content.to_string())
        };

        self.set_contents(name, contents)
    }

    /// Set a cell to a number; NaN and infinities are rejected
    pub fn set_cell_number(&mut self, name: &str, number: f64) -> Result<Vec<String>> {
        let name = self.cell_name(name)?;
        if !number.is_finite() {
            return Err(Error::NonFiniteNumber {
                name,
                value: number,
            });
        }
        self.set_contents(name, CellContents::Number(number))
    }

    /// Set a cell to text; empty text empties the cell
    pub fn set_cell_text(&mut self, name: &str, text: impl Into<String>) -> Result<Vec<String>> {
        let name = self.cell_name(name)?;
        let text = text.into();
        let contents = if text.is_empty() {
            CellContents::Empty
        } else {
            CellContents::Text(text)
        };
        self.set_contents(name, contents)
    }

    /// Set a cell to an already-parsed formula
    ///
    /// The formula's variables are used as given; they are not passed
    /// through this spreadsheet's normalizer.
    pub fn set_cell_formula(&mut self, name: &str, formula: Formula) -> Result<Vec<String>> {
        let name = self.cell_name(name)?;
        self.set_contents(name, CellContents::Formula(formula))
    }

    /// Normalize and validate a cell name
    fn cell_name(&self, name: &str) -> Result<String> {
        let normalized = self.options.normalize_name(name);
        if is_valid_variable(&normalized) && self.options.accepts(&normalized) {
            Ok(normalized)
        } else {
            Err(Error::InvalidName(name.to_string()))
        }
    }

    fn set_contents(&mut self, name: String, contents: CellContents) -> Result<Vec<String>> {
        let previous: Vec<String> = self.graph.dependees(&name).map(str::to_string).collect();
        self.graph
            .replace_dependees(&name, contents.dependees().iter().map(String::as_str));

        let order = match self.graph.recalculation_order(&name) {
            Ok(order) => order,
            Err(err) => {
                log::debug!(
                    "rejecting edit of {}, restoring {} dependees: {}",
                    name,
                    previous.len(),
                    err
                );
                self.graph.replace_dependees(&name, previous);
                return Err(err.into());
            }
        };

        if contents.is_empty() {
            self.cells.remove(&name);
        } else {
            let cell = Cell {
                contents,
                value: CellValue::Empty,
            };
            self.cells.insert(name, cell);
        }

        self.changed = true;
        self.recalculate(&order);
        Ok(order)
    }

    /// Re-evaluate `order` front to back
    fn recalculate(&mut self, order: &[String]) {
        for name in order {
            let Some(value) = self.cells.get(name).map(|cell| self.evaluate(&cell.contents)) else {
                continue;
            };
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
        log::trace!("recalculated {} cells", order.len());
    }

    fn evaluate(&self, contents: &CellContents) -> CellValue {
        match contents {
            CellContents::Empty => CellValue::Empty,
            CellContents::Number(n) => CellValue::Number(*n),
            CellContents::Text(s) => CellValue::Text(s.clone()),
            CellContents::Formula(formula) => {
                match formula.evaluate(|var| self.lookup(var)) {
                    Ok(n) => CellValue::Number(n),
                    Err(err) => CellValue::Error(err),
                }
            }
        }
    }

    /// Numeric value of a cell; empty, text, and error cells have none
    fn lookup(&self, name: &str) -> Option<f64> {
        self.cells.get(name).and_then(|cell| cell.value.as_number())
    }
}

/// Parse user text as a finite number
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellcalc_formula::EvalErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("15"), Some(15.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("-4"), Some(-4.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("=1"), None);
    }

    #[test]
    fn test_contents_classification() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "3.5").unwrap();
        sheet.set_contents_of_cell("A2", "hello").unwrap();
        sheet.set_contents_of_cell("A3", "=A1*2").unwrap();

        assert_eq!(sheet.cell_contents("A1").unwrap(), &CellContents::Number(3.5));
        assert_eq!(
            sheet.cell_contents("A2").unwrap(),
            &CellContents::Text("hello".into())
        );
        assert_eq!(
            sheet.cell_contents("A3").unwrap(),
            &CellContents::Formula(Formula::parse("A1*2").unwrap())
        );
        assert_eq!(sheet.cell_contents("Z9").unwrap(), &CellContents::Empty);
        assert_eq!(sheet.cell_value("A3").unwrap(), &CellValue::Number(7.0));
    }

    #[test]
    fn test_lookup_of_non_numeric_cell_is_an_error() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "text").unwrap();
        sheet.set_contents_of_cell("B1", "=A1+1").unwrap();
        sheet.set_contents_of_cell("C1", "=Z1").unwrap();
        sheet.set_contents_of_cell("D1", "=B1").unwrap();

        for name in ["B1", "C1", "D1"] {
            let value = sheet.cell_value(name).unwrap();
            assert!(value.is_error(), "{} should be an error, got {:?}", name, value);
        }
        match sheet.cell_value("B1").unwrap() {
            CellValue::Error(err) => {
                assert_eq!(err.kind(), &EvalErrorKind::UnknownVariable("A1".into()))
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_cycle_restores_previous_dependees() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "=B1+C1").unwrap();
        sheet.set_contents_of_cell("B1", "=D1").unwrap();

        let err = sheet.set_contents_of_cell("D1", "=A1").unwrap_err();
        assert!(matches!(err, Error::Circular(_)));

        assert_eq!(sheet.graph.edge_count(), 3);
        assert!(!sheet.graph.has_dependees("D1"));
        assert_eq!(sheet.cell_contents("D1").unwrap(), &CellContents::Empty);
        assert_eq!(sheet.direct_dependents("D1").unwrap(), vec!["B1"]);
    }

    #[test]
    fn test_replacing_formula_drops_old_edges() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("C1", "=A1+B1").unwrap();
        assert_eq!(sheet.graph.edge_count(), 2);

        sheet.set_contents_of_cell("C1", "=A1").unwrap();
        assert_eq!(sheet.graph.edge_count(), 1);
        assert!(sheet.direct_dependents("B1").unwrap().is_empty());

        sheet.set_contents_of_cell("C1", "").unwrap();
        assert!(sheet.graph.is_empty());
        assert_eq!(sheet.nonempty_cells().count(), 0);
    }

    #[test]
    fn test_set_cell_number_rejects_non_finite() {
        let mut sheet = Spreadsheet::new();
        sheet.set_cell_number("A1", 1.0).unwrap();
        sheet.set_contents_of_cell("B1", "=A1").unwrap();
        sheet.clear_changed();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = sheet.set_cell_number("A1", bad).unwrap_err();
            assert!(matches!(err, Error::NonFiniteNumber { ref name, .. } if name == "A1"));
        }
        assert!(!sheet.is_changed());
        assert_eq!(sheet.cell_contents("A1").unwrap(), &CellContents::Number(1.0));
        assert_eq!(sheet.cell_value("B1").unwrap(), &CellValue::Number(1.0));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("x".into()).to_string(), "x");
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(
            CellValue::Error(EvalError::division_by_zero()).to_string(),
            "#ERROR: Division by zero"
        );
    }
}
