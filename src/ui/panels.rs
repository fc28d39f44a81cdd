use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{RangeFilter, Selection};
use crate::state::{AppState, Dimension, Measure};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.table.is_empty() {
        ui.label("No players loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Role selector ----
            ui.strong("Role");
            let current = state.role_field.clone();
            let fields: Vec<String> = state.role_fields().iter().map(|f| f.to_string()).collect();
            egui::ComboBox::from_id_salt("role_field")
                .selected_text(current.as_str())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for field in &fields {
                        if ui
                            .selectable_label(current == *field, field.as_str())
                            .clicked()
                        {
                            state.set_role_field(field);
                        }
                    }
                });
            ui.separator();

            // ---- Numeric ranges ----
            range_sliders(ui, state, Measure::Age, "Age");
            range_sliders(ui, state, Measure::Usage, "Usage");
            range_sliders(ui, state, Measure::Height, "Height");
            ui.separator();

            // ---- Categorical checklists (collapsible) ----
            checklist(ui, state, Dimension::Position, "Position");
            checklist(ui, state, Dimension::Competition, "Competition");
            checklist(ui, state, Dimension::Team, "Team");
        });
}

/// Min / max sliders for one numeric column. Hidden when the column is
/// missing or all zero.
fn range_sliders(ui: &mut Ui, state: &mut AppState, measure: Measure, label: &str) {
    let (Some((lo, hi)), Some(current)) = (state.bounds(measure), state.range(measure)) else {
        return;
    };

    ui.strong(label);
    let mut min = current.min;
    let mut max = current.max;
    let integer = measure == Measure::Age;

    let mut changed = false;
    let mut slider = |ui: &mut Ui, value: &mut f64, text: &str| {
        let mut s = egui::Slider::new(value, lo..=hi).text(text);
        if integer {
            s = s.integer();
        }
        changed |= ui.add(s).changed();
    };
    slider(ui, &mut min, "min");
    slider(ui, &mut max, "max");

    if changed {
        state.set_range(measure, RangeFilter::new(min, max));
    }
    ui.add_space(4.0);
}

fn checklist(ui: &mut Ui, state: &mut AppState, dim: Dimension, label: &str) {
    let choices = state.choices(dim).to_vec();
    if choices.is_empty() {
        return;
    }
    let selection = state.selection(dim).clone();

    // Show count of selected / total in the header
    let header_text = if selection.is_all() {
        format!("{label}  (All)")
    } else {
        let n_selected = choices.iter().filter(|c| selection.contains(c)).count();
        format!("{label}  ({n_selected}/{})", choices.len())
    };

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(label)
        .default_open(dim == Dimension::Position)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.set_selection(dim, Selection::all());
                }
                if ui.small_button("None").clicked() {
                    state.set_selection(dim, Selection::none());
                }
            });

            for value in &choices {
                let mut checked = selection.admits(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    if selection.is_all() {
                        // Unticking under "All" keeps everything else.
                        let rest = choices.iter().filter(|c| *c != value).cloned();
                        state.set_selection(dim, Selection::of(rest));
                    } else {
                        state.toggle_value(dim, value);
                    }
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.force_reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.table.is_empty() {
            ui.label(format!(
                "{} players loaded, {} shown",
                state.table.len(),
                state.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open player sheet")
        .add_filter("Supported files", &["xlsx", "xlsm", "csv"])
        .add_filter("Excel", &["xlsx", "xlsm"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening {}", path.display());
        state.open_source(path.display().to_string());
    }
}
