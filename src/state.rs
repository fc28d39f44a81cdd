use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::{team_universe, FilterOptions, FilterSpec, RangeFilter, Selection};
use crate::data::model::PlayerTable;
use crate::data::pipeline::{DisplayTable, Pipeline};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Categorical filter dimensions shown in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Position,
    Competition,
    Team,
}

/// Numeric filter dimensions shown in the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Age,
    Usage,
    Height,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pipeline: Pipeline,

    /// URL or path of the player sheet.
    pub source: String,

    /// Cleaned table of the current source (empty until loaded).
    pub table: Arc<PlayerTable>,

    /// Choices per filter dimension for the current table.
    pub options: FilterOptions,

    /// Team choices, derived from the competition selection.
    pub team_choices: Vec<String>,

    /// Current filter selections.
    pub spec: FilterSpec,

    /// Role-score field shown next to Best Role.
    pub role_field: String,

    /// Rows passing the current filters, classified and projected (cached).
    pub view: DisplayTable,

    /// Colour per Best Role label.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// State for `source`; nothing is fetched until [`AppState::reload`].
    pub fn new(pipeline: Pipeline, source: String) -> Self {
        let role_field = pipeline
            .catalog()
            .role_fields()
            .first()
            .map(|f| f.to_string())
            .unwrap_or_default();
        let color_map = ColorMap::new(pipeline.catalog().role_fields());
        Self {
            pipeline,
            source,
            table: Arc::new(PlayerTable::default()),
            options: FilterOptions::default(),
            team_choices: Vec::new(),
            spec: FilterSpec::default(),
            view: DisplayTable::empty(&role_field),
            role_field,
            color_map,
            status_message: None,
        }
    }

    /// Role-score fields offered by the role selector.
    pub fn role_fields(&self) -> Vec<&str> {
        self.pipeline.catalog().role_fields()
    }

    /// Load the current source (cached after the first success) and reset
    /// the filters to show everyone.
    pub fn reload(&mut self) {
        let spec = FilterSpec::default();
        let out = self.pipeline.refresh(&self.source, &spec, &self.role_field);

        self.options = FilterOptions::from_table(&out.table);
        self.team_choices = team_universe(&out.table, &spec.competitions);
        self.table = out.table;
        self.spec = spec;
        self.view = out.view;
        self.status_message = out.error.map(|e| format!("Error: {e}"));

        let (hits, misses) = self.pipeline.cache().stats();
        log::debug!(
            "{} sources cached ({hits} hits, {misses} misses)",
            self.pipeline.cache().len()
        );
    }

    /// Drop the cached copy and download the source again.
    pub fn force_reload(&mut self) {
        self.pipeline.invalidate(&self.source);
        self.reload();
    }

    /// Switch to another sheet (e.g. a local file picked in a dialog).
    pub fn open_source(&mut self, source: String) {
        self.source = source;
        self.reload();
    }

    /// Recompute `view` after a filter or role change.
    pub fn refilter(&mut self) {
        self.view = self.pipeline.run(&self.table, &self.spec, &self.role_field);
    }

    pub fn set_role_field(&mut self, field: &str) {
        self.role_field = field.to_string();
        self.refilter();
    }

    /// Current (min, max) of a numeric filter, defaulting to the full range.
    pub fn range(&self, measure: Measure) -> Option<RangeFilter> {
        let current = match measure {
            Measure::Age => self.spec.age,
            Measure::Usage => self.spec.usage,
            Measure::Height => self.spec.height,
        };
        current.or_else(|| {
            self.bounds(measure)
                .map(|(lo, hi)| RangeFilter::new(lo, hi))
        })
    }

    /// Full (min, max) of a numeric filter; `None` hides its slider.
    pub fn bounds(&self, measure: Measure) -> Option<(f64, f64)> {
        match measure {
            Measure::Age => self.options.age,
            Measure::Usage => self.options.usage,
            Measure::Height => self.options.height,
        }
    }

    pub fn set_range(&mut self, measure: Measure, range: RangeFilter) {
        let range = RangeFilter::new(range.min.min(range.max), range.max.max(range.min));
        let slot = match measure {
            Measure::Age => &mut self.spec.age,
            Measure::Usage => &mut self.spec.usage,
            Measure::Height => &mut self.spec.height,
        };
        *slot = Some(range);
        self.refilter();
    }

    /// Values offered for a categorical dimension.
    pub fn choices(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Position => &self.options.positions,
            Dimension::Competition => &self.options.competitions,
            Dimension::Team => &self.team_choices,
        }
    }

    pub fn selection(&self, dim: Dimension) -> &Selection {
        match dim {
            Dimension::Position => &self.spec.positions,
            Dimension::Competition => &self.spec.competitions,
            Dimension::Team => &self.spec.teams,
        }
    }

    fn selection_mut(&mut self, dim: Dimension) -> &mut Selection {
        match dim {
            Dimension::Position => &mut self.spec.positions,
            Dimension::Competition => &mut self.spec.competitions,
            Dimension::Team => &mut self.spec.teams,
        }
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_value(&mut self, dim: Dimension, value: &str) {
        self.selection_mut(dim).toggle(value);
        self.selection_changed(dim);
    }

    /// Replace a dimension's selection wholesale ("All" / "None" buttons).
    pub fn set_selection(&mut self, dim: Dimension, selection: Selection) {
        *self.selection_mut(dim) = selection;
        self.selection_changed(dim);
    }

    fn selection_changed(&mut self, dim: Dimension) {
        if dim == Dimension::Competition {
            self.team_choices = team_universe(&self.table, &self.spec.competitions);
            self.spec.reset_teams();
        }
        self.refilter();
    }
}
