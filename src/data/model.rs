use std::collections::{BTreeMap, HashSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Well-known columns
// ---------------------------------------------------------------------------

pub const NAME: &str = "Name";
pub const TEAM: &str = "Team";
pub const AGE: &str = "Age";
pub const USAGE: &str = "Usage";
pub const HEIGHT: &str = "Height";
pub const POSITION: &str = "Position";
pub const COMPETITION: &str = "Competition";
/// Older sheets call the competition column "League".
pub const LEAGUE: &str = "League";

// ---------------------------------------------------------------------------
// CellValue – a single cell of the player sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a spreadsheet yields.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats print without a trailing ".0"; scores carry at most two decimals.
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.0}"),
            CellValue::Float(v) => write!(f, "{}", (v * 100.0).round() / 100.0),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Numeric view of the value. Text is not parsed here; the loader has
    /// already typed every cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CellValue::Integer(_) | CellValue::Float(_) | CellValue::Bool(_)
        )
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord – one row of the sheet
// ---------------------------------------------------------------------------

/// A single player (one row of the source sheet).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    /// Dynamic columns: column_name → value.
    pub cells: BTreeMap<String, CellValue>,
}

impl PlayerRecord {
    pub fn new(cells: BTreeMap<String, CellValue>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.get(column)
    }

    /// Numeric accessor by column name; absent or non-numeric cells read as 0.
    pub fn number(&self, column: &str) -> f64 {
        self.cells
            .get(column)
            .and_then(CellValue::as_f64)
            .unwrap_or(0.0)
    }

    /// Display string of a cell, "" when the column is absent.
    pub fn text(&self, column: &str) -> String {
        self.cells
            .get(column)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// The cell itself, or the cleaner's zero default when the column is absent.
    pub fn cell_or_zero(&self, column: &str) -> CellValue {
        self.cells
            .get(column)
            .cloned()
            .unwrap_or(CellValue::Integer(0))
    }
}

// ---------------------------------------------------------------------------
// PlayerTable – the complete loaded sheet
// ---------------------------------------------------------------------------

/// All players of one load. Every record shares `columns` as its schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTable {
    /// Column names in source order.
    pub columns: Vec<String>,
    /// All players (rows), in source order.
    pub records: Vec<PlayerRecord>,
}

impl PlayerTable {
    pub fn new(columns: Vec<String>, records: Vec<PlayerRecord>) -> Self {
        Self { columns, records }
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no players.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// `Competition`, or `League` on sheets that predate the rename.
    pub fn competition_column(&self) -> Option<&'static str> {
        [COMPETITION, LEAGUE]
            .into_iter()
            .find(|c| self.has_column(c))
    }

    /// Distinct display values of a column, in first-appearance order.
    pub fn distinct(&self, column: &str) -> Vec<String> {
        distinct_of(self.records.iter(), column)
    }

    /// (min, max) of a numeric column. `None` when the column is absent or
    /// holds nothing but zeros (a column the cleaner filled entirely).
    pub fn numeric_bounds(&self, column: &str) -> Option<(f64, f64)> {
        if !self.has_column(column) {
            return None;
        }
        let mut bounds: Option<(f64, f64)> = None;
        let mut any_nonzero = false;
        for v in self.records.iter().filter_map(|r| r.get(column)?.as_f64()) {
            any_nonzero |= v != 0.0;
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
                None => (v, v),
            });
        }
        bounds.filter(|_| any_nonzero)
    }

    /// Sub-table of the given rows, schema preserved.
    pub fn select(&self, keep: impl IntoIterator<Item = usize>) -> PlayerTable {
        PlayerTable {
            columns: self.columns.clone(),
            records: keep
                .into_iter()
                .filter_map(|i| self.records.get(i).cloned())
                .collect(),
        }
    }
}

/// Distinct display values of `column` across `records`, in first-appearance order.
pub fn distinct_of<'a>(
    records: impl Iterator<Item = &'a PlayerRecord>,
    column: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .filter_map(|r| r.get(column))
        .map(|v| v.to_string())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table from column names and rows of cells (test helper).
    pub(crate) fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> PlayerTable {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .into_iter()
            .map(|row| PlayerRecord::new(columns.iter().cloned().zip(row).collect()))
            .collect();
        PlayerTable::new(columns, records)
    }

    pub(crate) fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn accessor_defaults_absent_columns_to_zero() {
        let t = table(&[NAME, AGE], vec![vec![text("Ada"), CellValue::Integer(21)]]);
        let r = &t.records[0];
        assert_eq!(r.number(AGE), 21.0);
        assert_eq!(r.number("Box Crasher Percentile"), 0.0);
        assert_eq!(r.number(NAME), 0.0);
        assert_eq!(r.cell_or_zero(HEIGHT), CellValue::Integer(0));
        assert_eq!(r.text(HEIGHT), "");
    }

    #[test]
    fn distinct_keeps_first_appearance_order() {
        let t = table(
            &[TEAM],
            vec![vec![text("Celtic")], vec![text("Ajax")], vec![text("Celtic")]],
        );
        assert_eq!(t.distinct(TEAM), vec!["Celtic", "Ajax"]);
        assert!(t.distinct("Missing").is_empty());
    }

    #[test]
    fn bounds_skip_all_zero_columns() {
        let t = table(
            &[AGE, HEIGHT],
            vec![
                vec![CellValue::Integer(19), CellValue::Float(0.0)],
                vec![CellValue::Integer(31), CellValue::Float(0.0)],
            ],
        );
        assert_eq!(t.numeric_bounds(AGE), Some((19.0, 31.0)));
        assert_eq!(t.numeric_bounds(HEIGHT), None);
        assert_eq!(t.numeric_bounds(USAGE), None);
    }

    #[test]
    fn competition_column_falls_back_to_league() {
        let old = table(&[NAME, LEAGUE], vec![]);
        let new = table(&[NAME, COMPETITION, LEAGUE], vec![]);
        assert_eq!(old.competition_column(), Some(LEAGUE));
        assert_eq!(new.competition_column(), Some(COMPETITION));
        assert_eq!(table(&[NAME], vec![]).competition_column(), None);
    }

    #[test]
    fn float_display_trims_whole_numbers() {
        assert_eq!(CellValue::Float(80.0).to_string(), "80");
        assert_eq!(CellValue::Float(12.3456).to_string(), "12.35");
        assert_eq!(CellValue::Null.to_string(), "");
    }
}
