use std::sync::Arc;

use super::cache::TableCache;
use super::filter::{self, FilterSpec};
use super::loader;
use super::model::{CellValue, PlayerTable, AGE, NAME, POSITION, TEAM, USAGE};
use super::roles::{classify, BestRole, RoleCatalog};
use super::source::Fetch;
use crate::error::LoadError;

/// Derived column appended to every view.
pub const BEST_ROLE: &str = "Best Role";

/// Fixed leading columns of the view; the selected role field and
/// [`BEST_ROLE`] follow.
pub const DISPLAY_COLUMNS: [&str; 5] = [NAME, TEAM, AGE, USAGE, POSITION];

// ---------------------------------------------------------------------------
// DisplayTable
// ---------------------------------------------------------------------------

/// Projected rows ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DisplayTable {
    /// A view with the display columns and no rows.
    pub fn empty(role_field: &str) -> Self {
        Self {
            columns: display_columns(role_field),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

fn display_columns(role_field: &str) -> Vec<String> {
    DISPLAY_COLUMNS
        .iter()
        .copied()
        .chain([role_field, BEST_ROLE])
        .map(str::to_string)
        .collect()
}

/// Classify every player and keep the display columns. Columns the sheet
/// lacks read as zero.
pub fn project(table: &PlayerTable, catalog: &RoleCatalog, role_field: &str) -> DisplayTable {
    let rows = table
        .records
        .iter()
        .map(|rec| {
            let mut row: Vec<CellValue> = DISPLAY_COLUMNS
                .iter()
                .copied()
                .chain([role_field])
                .map(|col| rec.cell_or_zero(col))
                .collect();
            row.push(CellValue::Text(classify(rec, catalog).label().to_string()));
            row
        })
        .collect();

    DisplayTable {
        columns: display_columns(role_field),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Outcome of one refresh. A failed load still carries an (empty) view so
/// the caller can render "no results" without special-casing.
#[derive(Debug)]
pub struct Refresh {
    pub table: Arc<PlayerTable>,
    pub view: DisplayTable,
    pub error: Option<LoadError>,
}

/// Fetch → clean → (cache) → filter → classify → project.
pub struct Pipeline {
    fetcher: Box<dyn Fetch>,
    cache: TableCache,
    catalog: RoleCatalog,
}

impl Pipeline {
    pub fn new(fetcher: Box<dyn Fetch>, cache: TableCache, catalog: RoleCatalog) -> Self {
        Self {
            fetcher,
            cache,
            catalog,
        }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    /// Cleaned table for `source_ref`, downloading only on a cache miss.
    /// Failures are not cached.
    pub fn load(&mut self, source_ref: &str) -> Result<Arc<PlayerTable>, LoadError> {
        if let Some(table) = self.cache.get(source_ref) {
            log::debug!("Cache hit for {source_ref}");
            return Ok(table);
        }

        let fetched = self.fetcher.fetch(source_ref)?;
        let table = loader::clean(&fetched.bytes, fetched.format)?;
        log::info!(
            "Loaded {} players with {} columns from {source_ref}",
            table.len(),
            table.columns.len()
        );
        self.report_catalog_drift(&table);

        Ok(self.cache.insert(source_ref, table))
    }

    fn report_catalog_drift(&self, table: &PlayerTable) {
        let missing = self.catalog.missing_fields(table);
        if !missing.is_empty() {
            log::warn!("Role fields absent from the sheet (scored as 0): {missing:?}");
        }
        let unknown = table
            .records
            .iter()
            .filter(|r| classify(r, &self.catalog) == BestRole::Unknown)
            .count();
        if unknown > 0 {
            log::warn!("{unknown} players have a position with no role catalog entry");
        }
    }

    /// Forget the cached table so the next load downloads again.
    pub fn invalidate(&mut self, source_ref: &str) -> bool {
        self.cache.invalidate(source_ref)
    }

    /// Filter, classify and project an already-loaded table. Never fails.
    pub fn run(&self, table: &PlayerTable, spec: &FilterSpec, role_field: &str) -> DisplayTable {
        let filtered = filter::apply(table, spec);
        project(&filtered, &self.catalog, role_field)
    }

    /// Load then run; a load failure becomes an empty view plus the error.
    pub fn refresh(&mut self, source_ref: &str, spec: &FilterSpec, role_field: &str) -> Refresh {
        match self.load(source_ref) {
            Ok(table) => {
                let view = self.run(&table, spec, role_field);
                Refresh {
                    table,
                    view,
                    error: None,
                }
            }
            Err(err) => {
                log::error!("Failed to load {source_ref}: {err}");
                Refresh {
                    table: Arc::new(PlayerTable::default()),
                    view: DisplayTable::empty(role_field),
                    error: Some(err),
                }
            }
        }
    }
}
