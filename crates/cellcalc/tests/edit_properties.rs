//! Property tests for random edit sequences

use cellcalc::{CellContents, CellValue, Error, Spreadsheet};
use proptest::prelude::*;

const CELLS: [&str; 4] = ["A", "B", "C", "D"];

fn arb_cell() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CELLS.to_vec())
}

fn arb_content() -> impl Strategy<Value = String> {
    let op = prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")];
    prop_oneof![
        Just(String::new()),
        (0u32..20).prop_map(|n| n.to_string()),
        Just("label".to_string()),
        arb_cell().prop_map(|c| format!("={}", c)),
        (arb_cell(), op.clone(), 0u32..5).prop_map(|(c, op, n)| format!("={} {} {}", c, op, n)),
        (arb_cell(), op, arb_cell()).prop_map(|(l, op, r)| format!("=({} {} {}) + 1", l, op, r)),
    ]
}

/// Everything observable about one cell
#[derive(Debug, Clone, PartialEq)]
struct CellState {
    contents: CellContents,
    value: CellValue,
    dependents: Vec<String>,
}

fn snapshot(sheet: &Spreadsheet) -> Vec<CellState> {
    CELLS
        .iter()
        .map(|name| CellState {
            contents: sheet.cell_contents(name).unwrap().clone(),
            value: sheet.cell_value(name).unwrap().clone(),
            dependents: sheet
                .direct_dependents(name)
                .unwrap()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

/// The value a cell should have given the current values of the others
fn expected_value(sheet: &Spreadsheet, contents: &CellContents) -> CellValue {
    match contents {
        CellContents::Empty => CellValue::Empty,
        CellContents::Number(n) => CellValue::Number(*n),
        CellContents::Text(s) => CellValue::Text(s.clone()),
        CellContents::Formula(formula) => {
            let lookup = |name: &str| sheet.cell_value(name).ok().and_then(CellValue::as_number);
            match formula.evaluate(lookup) {
                Ok(n) => CellValue::Number(n),
                Err(err) => CellValue::Error(err),
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn edits_keep_values_consistent_and_cycles_change_nothing(
        edits in prop::collection::vec((arb_cell(), arb_content()), 1..30)
    ) {
        let mut sheet = Spreadsheet::new();

        for (name, content) in &edits {
            let before = snapshot(&sheet);
            sheet.clear_changed();

            match sheet.set_contents_of_cell(name, content) {
                Ok(order) => {
                    prop_assert_eq!(order[0].as_str(), *name);
                    prop_assert!(sheet.is_changed());
                }
                Err(Error::Circular(_)) => {
                    prop_assert_eq!(snapshot(&sheet), before);
                    prop_assert!(!sheet.is_changed());
                }
                Err(other) => prop_assert!(false, "unexpected error {:?} for {:?}", other, content),
            }

            for cell in CELLS {
                let contents = sheet.cell_contents(cell).unwrap();
                let expected = expected_value(&sheet, contents);
                prop_assert_eq!(sheet.cell_value(cell).unwrap(), &expected, "cell {}", cell);
            }
        }
    }
}
