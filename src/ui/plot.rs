use std::collections::BTreeMap;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::api::types::BenfordResult;
use crate::color::generate_palette;

const BAR_WIDTH: f64 = 0.35;

// ---------------------------------------------------------------------------
// Benford digit distribution chart
// ---------------------------------------------------------------------------

/// Grouped bars: observed leading-digit probability next to Benford's
/// prediction for each digit.
pub fn benford_chart(ui: &mut Ui, result: &BenfordResult) {
    let digits = result.digits();
    let colors = generate_palette(2);

    let bars = |probs: &BTreeMap<String, f64>, offset: f64| -> Vec<Bar> {
        digits
            .iter()
            .enumerate()
            .map(|(i, digit)| {
                let x = digit.parse::<f64>().unwrap_or((i + 1) as f64);
                let p = probs.get(*digit).copied().unwrap_or(0.0);
                Bar::new(x + offset, p).width(BAR_WIDTH).name(format!("digit {digit}"))
            })
            .collect()
    };

    let empirical = BarChart::new(bars(&result.empirical_probs, -BAR_WIDTH / 2.0))
        .name("Empirical")
        .color(colors[0]);
    let expected = BarChart::new(bars(&result.benford_probs, BAR_WIDTH / 2.0))
        .name("Benford")
        .color(colors[1]);

    Plot::new("benford_plot")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Leading digit")
        .y_axis_label("Probability")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(empirical);
            plot_ui.bar_chart(expected);
        });
}
