use std::collections::HashMap;
use std::sync::Arc;

use eframe::egui::{self, Rect, Ui};

use crate::api::Backend;
use crate::layout::{Breakpoint, PanelId, WindowTracker};
use crate::state::{AppState, Command, Event};
use crate::ui::{panels, results, table};
use crate::worker::RequestWorker;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct InsightApp {
    pub state: AppState,
    worker: RequestWorker,
    windows: PanelWindows,
}

impl InsightApp {
    pub fn new(cc: &eframe::CreationContext<'_>, backend: Arc<dyn Backend>) -> Self {
        Self {
            state: AppState::default(),
            worker: RequestWorker::new(backend).with_repaint(cc.egui_ctx.clone()),
            windows: PanelWindows::default(),
        }
    }

    fn submit(&self, commands: Vec<Command>) {
        for command in commands {
            self.worker.submit(command);
        }
    }

    fn handle(&mut self, event: Event) {
        let commands = self.state.dispatch(event);
        self.submit(commands);
    }
}

// ---------------------------------------------------------------------------
// Grid windows
// ---------------------------------------------------------------------------

/// The four dashboard panels as egui windows placed on the layout grid.
#[derive(Default)]
struct PanelWindows {
    trackers: HashMap<(Breakpoint, PanelId), WindowTracker>,
}

impl PanelWindows {
    fn show_all(&mut self, ctx: &egui::Context, area: Rect, state: &mut AppState, events: &mut Vec<Event>) {
        let bp = Breakpoint::for_width(area.width());
        for panel in PanelId::ALL {
            self.show(ctx, bp, panel, area, state, events);
        }
    }

    fn show(
        &mut self,
        ctx: &egui::Context,
        bp: Breakpoint,
        panel: PanelId,
        area: Rect,
        state: &mut AppState,
        events: &mut Vec<Event>,
    ) {
        let rect = state.layout.rect_for(bp, panel, area);
        let locked = state.layout.is_locked();
        let tracker = self.trackers.entry((bp, panel)).or_default();
        let place = locked || tracker.needs_placement(rect);

        let window = egui::Window::new(panel.title())
            .id(egui::Id::new(("dashboard_panel", bp, panel)))
            .collapsible(false)
            .constrain(false);
        let window = if place { window.fixed_rect(rect) } else { window };
        let window = window.movable(!locked).resizable(!locked && !place);

        let shown = window.show(ctx, |ui: &mut Ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match panel {
                    PanelId::Analyzers => panels::analyzers_panel(ui, state, events),
                    PanelId::Visualization => match &state.preview {
                        Some(preview) => table::preview_table(ui, preview),
                        None => panels::empty_state(ui, "Upload a file to see a preview of the data"),
                    },
                    PanelId::Options => panels::options_panel(ui, state, events),
                    PanelId::Results => results::results_panel(ui, state, events),
                });
        });

        if place {
            tracker.place(rect);
        }
        if locked {
            return;
        }
        if let Some(inner) = shown {
            let pointer_down = ctx.input(|i| i.pointer.any_down());
            if let Some(target) = tracker.observe(rect, inner.response.rect, pointer_down) {
                state.layout.move_panel(bp, panel, target, area);
            }
        }
    }
}

impl eframe::App for InsightApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Apply finished requests ----
        for completion in self.worker.drain() {
            let commands = self.state.complete(completion);
            self.submit(commands);
        }

        let mut events = Vec::new();

        // ---- Top panel: title, lock, upload ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &mut events);
        });

        let area = ctx.available_rect();
        egui::CentralPanel::default().show(ctx, |_ui| {});

        // ---- Grid panels ----
        self.windows.show_all(ctx, area, &mut self.state, &mut events);

        for event in events {
            self.handle(event);
        }
    }
}
