use std::collections::BTreeSet;

use super::model::{distinct_of, PlayerRecord, PlayerTable, AGE, HEIGHT, POSITION, TEAM, USAGE};

/// Reserved selection value meaning "no restriction on this dimension".
pub const ALL: &str = "All";

// ---------------------------------------------------------------------------
// Selection: which values of a categorical column are admitted
// ---------------------------------------------------------------------------

/// Selected values of one categorical dimension.
///
/// A record passes when its value is selected, or when the sentinel
/// [`ALL`] is among the selected values. An empty selection admits nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(BTreeSet<String>);

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

impl Selection {
    /// The pass-through selection.
    pub fn all() -> Self {
        Self(BTreeSet::from([ALL.to_string()]))
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(values.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        self.0.contains(ALL)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    pub fn admits(&self, value: &str) -> bool {
        self.is_all() || self.0.contains(value)
    }

    /// Selected values other than the sentinel.
    pub fn explicit(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str).filter(|v| *v != ALL)
    }

    /// Toggle one value in or out of the selection.
    pub fn toggle(&mut self, value: &str) {
        if !self.0.remove(value) {
            self.0.insert(value.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric ranges
// ---------------------------------------------------------------------------

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub min: f64,
    pub max: f64,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// One interaction's worth of filter choices. `None` ranges mean the full range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub age: Option<RangeFilter>,
    pub usage: Option<RangeFilter>,
    pub height: Option<RangeFilter>,
    pub positions: Selection,
    /// Applies to the `Competition` column, or `League` on older sheets.
    pub competitions: Selection,
    pub teams: Selection,
}

impl FilterSpec {
    /// The team choices are rebuilt whenever the competition selection
    /// changes, so the team selection starts over at "All".
    pub fn reset_teams(&mut self) {
        self.teams = Selection::all();
    }

    fn ranges(&self) -> [(&'static str, Option<RangeFilter>); 3] {
        [(AGE, self.age), (USAGE, self.usage), (HEIGHT, self.height)]
    }
}

/// Choices the presentation layer offers for each dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub age: Option<(f64, f64)>,
    pub usage: Option<(f64, f64)>,
    pub height: Option<(f64, f64)>,
    pub positions: Vec<String>,
    pub competitions: Vec<String>,
}

impl FilterOptions {
    pub fn from_table(table: &PlayerTable) -> Self {
        Self {
            age: table.numeric_bounds(AGE),
            usage: table.numeric_bounds(USAGE),
            height: table.numeric_bounds(HEIGHT),
            positions: table.distinct(POSITION),
            competitions: table
                .competition_column()
                .map(|c| table.distinct(c))
                .unwrap_or_default(),
        }
    }
}

/// Teams playing in the selected competitions, or every team when no
/// competition is explicitly selected.
pub fn team_universe(table: &PlayerTable, competitions: &Selection) -> Vec<String> {
    let selected: Vec<&str> = competitions.explicit().collect();
    match table.competition_column() {
        Some(comp_col) if !selected.is_empty() => distinct_of(
            table
                .records
                .iter()
                .filter(|r| selected.contains(&r.text(comp_col).as_str())),
            TEAM,
        ),
        _ => table.distinct(TEAM),
    }
}

// ---------------------------------------------------------------------------
// Apply
// ---------------------------------------------------------------------------

/// Return indices of players that pass every predicate, in table order.
///
/// * Numeric ranges are inclusive. A range over a column that is absent or
///   holds only zeros is skipped.
/// * Categorical predicates pass through when the selection holds [`ALL`],
///   and are skipped when the table lacks the column.
pub fn filtered_indices(table: &PlayerTable, spec: &FilterSpec) -> Vec<usize> {
    let ranges: Vec<(&str, RangeFilter)> = spec
        .ranges()
        .into_iter()
        .filter_map(|(col, range)| {
            let range = range?;
            if table.numeric_bounds(col).is_none() {
                log::warn!("Skipping {col} range filter: column is absent or all zero");
                return None;
            }
            Some((col, range))
        })
        .collect();

    let mut sets: Vec<(&str, &Selection)> = vec![(POSITION, &spec.positions), (TEAM, &spec.teams)];
    if let Some(comp_col) = table.competition_column() {
        sets.push((comp_col, &spec.competitions));
    }
    sets.retain(|(col, sel)| !sel.is_all() && table.has_column(col));

    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| passes(rec, &ranges, &sets))
        .map(|(i, _)| i)
        .collect()
}

fn passes(rec: &PlayerRecord, ranges: &[(&str, RangeFilter)], sets: &[(&str, &Selection)]) -> bool {
    ranges.iter().all(|(col, r)| r.contains(rec.number(col)))
        && sets.iter().all(|(col, sel)| sel.contains(&rec.text(col)))
}

/// Order-preserving sub-table of the players passing `spec`. An empty result
/// is a normal outcome.
pub fn apply(table: &PlayerTable, spec: &FilterSpec) -> PlayerTable {
    table.select(filtered_indices(table, spec))
}
