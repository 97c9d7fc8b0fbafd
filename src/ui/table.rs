use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::api::types::DatasetPreview;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Dataset preview table
// ---------------------------------------------------------------------------

/// Header row, then the head block and the tail block, each row prefixed with
/// its index in the full dataset.
pub fn preview_table(ui: &mut Ui, preview: &DatasetPreview) {
    ui.label(format!(
        "{} rows, {} columns",
        preview.length,
        preview.columns.len()
    ));
    ui.add_space(4.0);

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        ui.push_id("preview_table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .column(Column::auto().at_least(40.0))
                .columns(Column::auto().at_least(60.0).resizable(true), preview.columns.len())
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("ID");
                    });
                    for column in &preview.columns {
                        header.col(|ui| {
                            ui.strong(column);
                        });
                    }
                })
                .body(|mut body| {
                    for (index, row) in preview.head_rows().chain(preview.tail_rows()) {
                        body.row(ROW_HEIGHT, |mut table_row| {
                            table_row.col(|ui| {
                                ui.monospace(index.to_string());
                            });
                            for cell in row.iter().take(preview.columns.len()) {
                                table_row.col(|ui| {
                                    ui.label(cell);
                                });
                            }
                        });
                    }
                });
        });
    });
}
