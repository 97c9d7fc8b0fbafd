use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use serde_json::Value;

use crate::api::types::AnomalyResult;
use crate::color;
use crate::export::EXPORT_FILE_NAME;
use crate::state::{AnalysisResult, AppState, BenfordView, Event};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Results panel
// ---------------------------------------------------------------------------

pub fn results_panel(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    match &state.result {
        AnalysisResult::Anomaly(result) => anomaly_view(ui, result, events),
        AnalysisResult::Benford(view) => benford_view(ui, view),
        AnalysisResult::CorrelationMessage(message) => {
            ui.group(|ui: &mut Ui| {
                ui.set_width(ui.available_width());
                ui.label(message);
            });
        }
        AnalysisResult::None => {
            panels::empty_state(ui, "Choose an analysis to see its results");
        }
    }
}

fn anomaly_view(ui: &mut Ui, result: &AnomalyResult, events: &mut Vec<Event>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading("Detected anomalies");
        if !result.anomalies.is_empty() && ui.button("Download CSV").clicked() {
            if let Some(path) = save_dialog() {
                events.push(Event::ExportAnomalies(path));
            }
        }
    });

    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(format!(
            "Anomalies found in {} of {} rows.",
            result.anomaly_count, result.total_count
        ));
    });

    if !result.anomaly_scores.is_empty() {
        egui::CollapsingHeader::new(format!("Anomaly scores ({})", result.anomaly_scores.len()))
            .id_salt("anomaly_scores")
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                for (index, score) in &result.anomaly_scores {
                    ui.monospace(format!("{index:>6}  {}", display_value(Some(score))));
                }
            });
    }

    let Some(first) = result.anomalies.first() else {
        return;
    };
    let keys: Vec<&String> = first.keys().collect();

    ui.add_space(6.0);
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        ui.push_id("anomaly_table", |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), keys.len())
                .header(20.0, |mut header| {
                    for key in &keys {
                        header.col(|ui| {
                            ui.strong(key.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for record in &result.anomalies {
                        body.row(20.0, |mut row| {
                            for key in &keys {
                                row.col(|ui| {
                                    ui.label(display_value(record.get(key.as_str())));
                                });
                            }
                        });
                    }
                });
        });
    });
}

fn benford_view(ui: &mut Ui, view: &BenfordView) {
    let result = &view.result;
    ui.columns(2, |cols| {
        stat_card(&mut cols[0], "Chi-squared statistic", format!("{:.2}", result.chi_stat));
        stat_card(&mut cols[1], "P-value", format!("{:.4}", result.p_value));
    });
    ui.add_space(8.0);

    match &view.plot_png {
        Some(png) => {
            ui.add(
                egui::Image::from_bytes(view.plot_uri.clone(), egui::load::Bytes::Shared(png.clone()))
                    .max_width(ui.available_width())
                    .corner_radius(4.0),
            );
        }
        None => {
            ui.colored_label(color::ERROR, "Plot unavailable");
        }
    }

    ui.add_space(8.0);
    plot::benford_chart(ui, result);
}

fn stat_card(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

/// Numbers to two decimals, strings verbatim.
fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| n.to_string()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn save_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export anomalies")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file()
}
