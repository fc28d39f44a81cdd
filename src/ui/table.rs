use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::pipeline::BEST_ROLE;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Player table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered, classified players.
pub fn player_table(ui: &mut Ui, state: &AppState) {
    if state.table.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No player data loaded  (File → Reload or File → Open…)");
        });
        return;
    }

    let view = &state.view;
    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No players match the current filters.");
        });
        return;
    }

    let best_role_idx = view.column_index(BEST_ROLE);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(Column::auto().at_least(60.0), view.columns.len())
        .header(22.0, |mut header| {
            for name in &view.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name.as_str());
                });
            }
        })
        .body(|body| {
            body.rows(20.0, view.rows.len(), |mut row| {
                let cells = &view.rows[row.index()];
                for (i, cell) in cells.iter().enumerate() {
                    row.col(|ui: &mut Ui| {
                        let text = cell.to_string();
                        if Some(i) == best_role_idx {
                            let color = state.color_map.color_for(&text);
                            ui.label(RichText::new(text).color(color));
                        } else {
                            ui.label(text);
                        }
                    });
                }
            });
        });
}
