use std::path::PathBuf;

use eframe::egui::{self, Button, DragValue, RichText, Ui};

use crate::analyzers::anomaly::{AnomalyForm, MAX_CONTAMINATION};
use crate::analyzers::benford::BenfordForm;
use crate::analyzers::correlation::CorrelationForm;
use crate::analyzers::{AnalyzerKind, AnalyzerPanel};
use crate::api::types::{CorrelationMethod, SelectionMethod};
use crate::color;
use crate::state::{AppState, Event};
use crate::upload::UploadPanel;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title, layout lock toggle and upload controls.
pub fn top_bar(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.heading(RichText::new("Analytics Dashboard").color(color::accent()).strong());
        ui.separator();

        let locked = state.layout.is_locked();
        let lock_text = if locked { "🔒 Layout locked" } else { "🔓 Layout unlocked" };
        if ui.selectable_label(locked, lock_text).clicked() {
            events.push(Event::LayoutLockToggled);
        }

        ui.separator();
        upload_controls(ui, &state.upload, events);

        if state.awaiting_preview() {
            ui.separator();
            ui.add(egui::Spinner::new());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(color::ERROR));
        }
    });
}

fn upload_controls(ui: &mut Ui, upload: &UploadPanel, events: &mut Vec<Event>) {
    // A new id after "Clear" rebuilds the picker button from scratch.
    ui.push_id(("file_picker", upload.picker_generation), |ui: &mut Ui| {
        let label = upload
            .picked_name()
            .unwrap_or_else(|| "Choose file…".to_string());
        if ui.button(label).clicked() {
            if let Some(path) = pick_data_file() {
                events.push(Event::FilePicked(path));
            }
        }
    });

    let upload_text = if upload.in_flight.is_some() {
        "Uploading..."
    } else {
        "Upload"
    };
    if ui
        .add_enabled(upload.can_submit(), Button::new(upload_text))
        .clicked()
    {
        events.push(Event::UploadRequested);
    }
    if ui.button("Clear").clicked() {
        events.push(Event::ClearRequested);
    }

    if let Some(err) = &upload.error {
        ui.label(RichText::new(err).color(color::ERROR));
    }
}

fn pick_data_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose a data file")
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file()
}

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Centered hint shown by panels with nothing to display yet.
pub fn empty_state(ui: &mut Ui, text: &str) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.label(RichText::new(text).weak());
    });
}

fn error_line(ui: &mut Ui, error: Option<&str>) {
    if let Some(err) = error {
        ui.label(RichText::new(err).color(color::ERROR));
    }
}

// ---------------------------------------------------------------------------
// Analyzer list
// ---------------------------------------------------------------------------

pub fn analyzers_panel(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    if state.file_id.is_none() {
        empty_state(ui, "Upload a file to see the available analyses");
        return;
    }

    let active = state.active_analyzer();
    for kind in AnalyzerKind::ALL {
        let selected = active == Some(kind);
        ui.group(|ui: &mut Ui| {
            ui.set_width(ui.available_width());
            let mut title = RichText::new(kind.title()).strong();
            if selected {
                title = title.color(color::accent());
            }
            if ui.selectable_label(selected, title).clicked() {
                events.push(Event::AnalyzerSelected(kind));
            }
            ui.label(RichText::new(kind.description()).weak());
        });
        ui.add_space(4.0);
    }
}

// ---------------------------------------------------------------------------
// Analyzer parameters
// ---------------------------------------------------------------------------

pub fn options_panel(ui: &mut Ui, state: &mut AppState, events: &mut Vec<Event>) {
    let columns = state
        .preview
        .as_ref()
        .map(|p| p.columns.clone())
        .unwrap_or_default();

    match &mut state.analyzer {
        None => empty_state(ui, "Choose an analysis type to see its options"),
        Some(AnalyzerPanel::Correlation(form)) => correlation_form(ui, form, events),
        Some(AnalyzerPanel::Benford(form)) => benford_form(ui, form, &columns, events),
        Some(AnalyzerPanel::Anomaly(form)) => anomaly_form(ui, form, events),
    }
}

fn correlation_form(ui: &mut Ui, form: &mut CorrelationForm, events: &mut Vec<Event>) {
    ui.heading(AnalyzerKind::Correlation.title());
    ui.add_space(4.0);

    ui.strong("Method");
    ui.horizontal(|ui: &mut Ui| {
        for method in CorrelationMethod::ALL {
            ui.radio_value(&mut form.method, method, method.label());
        }
    });

    ui.strong("Threshold");
    let mut threshold = form.threshold();
    if ui
        .add(DragValue::new(&mut threshold).speed(0.01).max_decimals(3))
        .changed()
    {
        form.set_threshold(threshold);
    }

    ui.strong("Selection method");
    ui.horizontal(|ui: &mut Ui| {
        for selection in SelectionMethod::ALL {
            ui.radio_value(&mut form.selection_method, selection, selection.label());
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Preview").clicked() {
            events.push(Event::CorrelationPreviewRequested);
        }
        if ui.button("Remove columns").clicked() {
            events.push(Event::CorrelationRemovalRequested);
        }
    });
    error_line(ui, form.error.as_deref());
}

fn benford_form(ui: &mut Ui, form: &mut BenfordForm, columns: &[String], events: &mut Vec<Event>) {
    ui.heading(AnalyzerKind::Benford.title());
    ui.add_space(4.0);

    ui.strong("Column to analyze");
    egui::ComboBox::from_id_salt("benford_column")
        .selected_text(form.column.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                ui.selectable_value(&mut form.column, col.clone(), col);
            }
        });

    ui.add_space(6.0);
    if ui
        .add_enabled(form.can_submit(), Button::new("Run analysis"))
        .clicked()
    {
        events.push(Event::BenfordRequested);
    }
    error_line(ui, form.error.as_deref());
}

fn anomaly_form(ui: &mut Ui, form: &mut AnomalyForm, events: &mut Vec<Event>) {
    ui.heading(AnalyzerKind::Anomaly.title());
    ui.add_space(4.0);

    ui.strong("Contamination (expected share of anomalies)");
    let mut contamination = form.contamination();
    if ui
        .add(DragValue::new(&mut contamination).speed(0.01).max_decimals(3))
        .on_hover_text(format!("0 to {MAX_CONTAMINATION}"))
        .changed()
    {
        form.set_contamination(contamination);
    }

    ui.add_space(6.0);
    if ui
        .add_enabled(!form.in_flight(), Button::new(form.button_label()))
        .clicked()
    {
        events.push(Event::AnomalyDetectionRequested);
    }
    error_line(ui, form.error.as_deref());
}
