use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzers::anomaly::AnomalyForm;
use crate::analyzers::benford::{self, BenfordForm};
use crate::analyzers::correlation::{self, CorrelationForm};
use crate::analyzers::{AnalyzerKind, AnalyzerPanel};
use crate::api::types::{
    AnomalyRequest, AnomalyResult, BenfordRequest, BenfordResult, CorrelationRequest,
    DatasetPreview, FileId,
};
use crate::api::ApiError;
use crate::export;
use crate::layout::DashboardLayout;
use crate::upload::{UploadPanel, UPLOAD_ERROR};

pub const EXPORT_ERROR: &str = "Error exporting anomalies";
pub const VISUALIZE_ERROR: &str = "Error loading data preview";

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The single result slot of the results panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AnalysisResult {
    #[default]
    None,
    CorrelationMessage(String),
    Benford(Box<BenfordView>),
    Anomaly(Box<AnomalyResult>),
}

/// A Benford result with its plot decoded once for display.
#[derive(Debug, Clone, PartialEq)]
pub struct BenfordView {
    pub result: BenfordResult,
    /// Unique image URI so egui does not reuse a previous plot's texture.
    pub plot_uri: String,
    /// `None` when the plot is not valid base64.
    pub plot_png: Option<Arc<[u8]>>,
}

// ---------------------------------------------------------------------------
// Requests, tickets and events
// ---------------------------------------------------------------------------

/// A backend call the UI wants made.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Upload(PathBuf),
    Visualize(FileId),
    PreviewCorrelation(CorrelationRequest),
    RemoveCorrelation(CorrelationRequest),
    Benford(BenfordRequest),
    DetectAnomalies(AnomalyRequest),
}

/// Which state a request was issued under. A completion whose ticket is no
/// longer current is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticket {
    /// Valid while this upload is still the one in flight.
    Upload(u64),
    /// Valid while the file handle has not changed.
    File(u64),
    /// Valid while both the file handle and the mounted analyzer are unchanged.
    Panel { file_epoch: u64, panel_epoch: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub ticket: Ticket,
    pub request: Request,
}

/// A finished backend call, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub event: Event,
}

#[derive(Debug)]
pub enum Event {
    // -- user actions --
    FilePicked(PathBuf),
    UploadRequested,
    ClearRequested,
    AnalyzerSelected(AnalyzerKind),
    CorrelationPreviewRequested,
    CorrelationRemovalRequested,
    BenfordRequested,
    AnomalyDetectionRequested,
    ExportAnomalies(PathBuf),
    LayoutLockToggled,

    // -- backend completions --
    Uploaded(Result<FileId, ApiError>),
    Visualized(Result<DatasetPreview, ApiError>),
    CorrelationPreviewed(Result<Vec<String>, ApiError>),
    CorrelationRemoved(Result<FileId, ApiError>),
    BenfordAnalyzed(Result<BenfordResult, ApiError>),
    AnomaliesDetected(Result<AnomalyResult, ApiError>),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full dashboard session, independent of rendering. Changed only through
/// [`AppState::dispatch`] and [`AppState::complete`].
#[derive(Debug, Default)]
pub struct AppState {
    /// Handle of the dataset being analysed (None until an upload succeeds).
    pub file_id: Option<FileId>,

    /// Head/tail snapshot of `file_id`.
    pub preview: Option<DatasetPreview>,

    /// Form mounted in the parameters panel.
    pub analyzer: Option<AnalyzerPanel>,

    pub result: AnalysisResult,

    pub upload: UploadPanel,

    pub layout: DashboardLayout,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    file_epoch: u64,
    panel_epoch: u64,
    upload_seq: u64,
    result_seq: u64,
}

impl AppState {
    /// Whether a file is loaded but its preview has not arrived yet.
    pub fn awaiting_preview(&self) -> bool {
        self.file_id.is_some() && self.preview.is_none() && self.status_message.is_none()
    }

    pub fn active_analyzer(&self) -> Option<AnalyzerKind> {
        self.analyzer.as_ref().map(AnalyzerPanel::kind)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        match ticket {
            Ticket::Upload(seq) => self.upload.in_flight == Some(seq),
            Ticket::File(epoch) => epoch == self.file_epoch,
            Ticket::Panel {
                file_epoch,
                panel_epoch,
            } => {
                file_epoch == self.file_epoch
                    && panel_epoch == self.panel_epoch
                    && self.analyzer.is_some()
            }
        }
    }

    /// Apply a finished request unless the state it belongs to is gone.
    pub fn complete(&mut self, completion: Completion) -> Vec<Command> {
        if !self.is_current(completion.ticket) {
            log::debug!("Dropping stale completion {:?}", completion.ticket);
            return Vec::new();
        }
        self.dispatch(completion.event)
    }

    /// Apply one event and return the backend calls it requires.
    pub fn dispatch(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::FilePicked(path) => {
                self.upload.pick(path);
                Vec::new()
            }
            Event::UploadRequested => self.start_upload(),
            Event::ClearRequested => {
                self.upload.clear();
                self.change_file(None)
            }
            Event::AnalyzerSelected(kind) => {
                self.select_analyzer(kind);
                Vec::new()
            }
            Event::CorrelationPreviewRequested => self
                .correlation_request()
                .map(Request::PreviewCorrelation)
                .map(|rq| self.panel_command(rq))
                .into_iter()
                .collect(),
            Event::CorrelationRemovalRequested => self
                .correlation_request()
                .map(Request::RemoveCorrelation)
                .map(|rq| self.panel_command(rq))
                .into_iter()
                .collect(),
            Event::BenfordRequested => self.start_benford(),
            Event::AnomalyDetectionRequested => self.start_anomaly_detection(),
            Event::ExportAnomalies(path) => {
                self.export_anomalies(&path);
                Vec::new()
            }
            Event::LayoutLockToggled => {
                self.layout.toggle_lock();
                Vec::new()
            }

            Event::Uploaded(outcome) => {
                self.upload.in_flight = None;
                match outcome {
                    Ok(id) => {
                        log::info!("Uploaded file as {id}");
                        self.change_file(Some(id))
                    }
                    Err(e) => {
                        log::error!("Upload failed: {e}");
                        self.upload.error = Some(UPLOAD_ERROR.to_string());
                        Vec::new()
                    }
                }
            }
            Event::Visualized(outcome) => {
                match outcome {
                    Ok(preview) => {
                        log::info!(
                            "Preview of {} rows with columns {:?}",
                            preview.length,
                            preview.columns
                        );
                        if let Some(AnalyzerPanel::Benford(form)) = &mut self.analyzer {
                            form.sync_columns(&preview.columns);
                        }
                        self.preview = Some(preview);
                    }
                    Err(e) => {
                        log::error!("Error visualizing file: {e}");
                        self.status_message = Some(VISUALIZE_ERROR.to_string());
                    }
                }
                Vec::new()
            }
            Event::CorrelationPreviewed(outcome) => {
                match outcome {
                    Ok(columns) => {
                        if let Some(form) = self.correlation_form() {
                            form.error = None;
                        }
                        self.result =
                            AnalysisResult::CorrelationMessage(correlation::removal_message(&columns));
                    }
                    Err(e) => {
                        log::error!("Correlation preview failed: {e}");
                        if let Some(form) = self.correlation_form() {
                            form.error = Some(correlation::PREVIEW_ERROR.to_string());
                        }
                    }
                }
                Vec::new()
            }
            Event::CorrelationRemoved(outcome) => match outcome {
                Ok(id) => {
                    log::info!("Correlated columns removed, new file {id}");
                    self.change_file(Some(id))
                }
                Err(e) => {
                    log::error!("Correlated column removal failed: {e}");
                    if let Some(form) = self.correlation_form() {
                        form.error = Some(correlation::REMOVE_ERROR.to_string());
                    }
                    Vec::new()
                }
            },
            Event::BenfordAnalyzed(outcome) => {
                match outcome {
                    Ok(result) => {
                        log::info!(
                            "Benford analysis done: chi2={:.2} p={:.4}",
                            result.chi_stat,
                            result.p_value
                        );
                        if let Some(form) = self.benford_form() {
                            form.error = None;
                        }
                        let view = self.benford_view(result);
                        self.result = AnalysisResult::Benford(Box::new(view));
                    }
                    Err(e) => {
                        log::error!("Benford analysis failed: {e}");
                        if let Some(form) = self.benford_form() {
                            form.error = Some(benford::ANALYSIS_ERROR.to_string());
                        }
                    }
                }
                Vec::new()
            }
            Event::AnomaliesDetected(outcome) => {
                match outcome {
                    Ok(result) => {
                        log::info!(
                            "Anomaly detection flagged {} of {} rows",
                            result.anomaly_count,
                            result.total_count
                        );
                        if let Some(form) = self.anomaly_form() {
                            form.succeed();
                        }
                        self.result = AnalysisResult::Anomaly(Box::new(result));
                    }
                    Err(e) => {
                        log::error!("Anomaly detection failed: {e}");
                        if let Some(form) = self.anomaly_form() {
                            form.fail();
                        }
                    }
                }
                Vec::new()
            }
        }
    }

    // -- transitions --

    /// Replace the file handle, dropping everything derived from the old one.
    fn change_file(&mut self, id: Option<FileId>) -> Vec<Command> {
        self.file_epoch += 1;
        self.analyzer = None;
        self.result = AnalysisResult::None;
        self.preview = None;
        self.status_message = None;
        self.file_id = id.clone();

        match id {
            Some(id) => vec![Command {
                ticket: Ticket::File(self.file_epoch),
                request: Request::Visualize(id),
            }],
            None => Vec::new(),
        }
    }

    fn select_analyzer(&mut self, kind: AnalyzerKind) {
        if self.file_id.is_none() {
            return;
        }
        let columns = self
            .preview
            .as_ref()
            .map(|p| p.columns.as_slice())
            .unwrap_or_default();
        self.panel_epoch += 1;
        self.result = AnalysisResult::None;
        self.analyzer = Some(AnalyzerPanel::mount(kind, columns));
    }

    fn start_upload(&mut self) -> Vec<Command> {
        if !self.upload.can_submit() {
            return Vec::new();
        }
        let Some(path) = self.upload.pending.clone() else {
            return Vec::new();
        };
        self.upload_seq += 1;
        self.upload.in_flight = Some(self.upload_seq);
        self.upload.error = None;
        log::info!("Uploading {}", path.display());
        vec![Command {
            ticket: Ticket::Upload(self.upload_seq),
            request: Request::Upload(path),
        }]
    }

    fn start_benford(&mut self) -> Vec<Command> {
        let Some(id) = self.file_id.clone() else {
            return Vec::new();
        };
        let request = self.benford_form().and_then(|form| form.request(&id));
        request
            .map(|rq| self.panel_command(Request::Benford(rq)))
            .into_iter()
            .collect()
    }

    fn start_anomaly_detection(&mut self) -> Vec<Command> {
        let Some(id) = self.file_id.clone() else {
            return Vec::new();
        };
        let request = self.anomaly_form().and_then(|form| form.begin(&id));
        request
            .map(|rq| self.panel_command(Request::DetectAnomalies(rq)))
            .into_iter()
            .collect()
    }

    fn export_anomalies(&mut self, path: &std::path::Path) {
        let AnalysisResult::Anomaly(result) = &self.result else {
            return;
        };
        match export::save_anomalies_csv(path, &result.anomalies) {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(EXPORT_ERROR.to_string());
            }
        }
    }

    // -- helpers --

    fn panel_command(&self, request: Request) -> Command {
        Command {
            ticket: Ticket::Panel {
                file_epoch: self.file_epoch,
                panel_epoch: self.panel_epoch,
            },
            request,
        }
    }

    fn correlation_request(&self) -> Option<CorrelationRequest> {
        match (&self.file_id, &self.analyzer) {
            (Some(id), Some(AnalyzerPanel::Correlation(form))) => Some(form.request(id)),
            _ => None,
        }
    }

    fn correlation_form(&mut self) -> Option<&mut CorrelationForm> {
        match &mut self.analyzer {
            Some(AnalyzerPanel::Correlation(form)) => Some(form),
            _ => None,
        }
    }

    fn benford_form(&mut self) -> Option<&mut BenfordForm> {
        match &mut self.analyzer {
            Some(AnalyzerPanel::Benford(form)) => Some(form),
            _ => None,
        }
    }

    fn anomaly_form(&mut self) -> Option<&mut AnomalyForm> {
        match &mut self.analyzer {
            Some(AnalyzerPanel::Anomaly(form)) => Some(form),
            _ => None,
        }
    }

    fn benford_view(&mut self, result: BenfordResult) -> BenfordView {
        self.result_seq += 1;
        let plot_png = match result.plot_png() {
            Ok(bytes) => Some(Arc::from(bytes)),
            Err(e) => {
                log::warn!("Benford plot is not valid base64: {e}");
                None
            }
        };
        BenfordView {
            result,
            plot_uri: format!("bytes://benford-{}.png", self.result_seq),
            plot_png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::anomaly::DETECTION_ERROR;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn preview(columns: &[&str]) -> DatasetPreview {
        DatasetPreview {
            length: 3,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            head: vec![vec!["1".into(); columns.len()]],
            tail: vec![vec!["3".into(); columns.len()]],
        }
    }

    fn backend_error() -> ApiError {
        ApiError::Backend {
            status: 500,
            body: json!({"error": "boom"}),
        }
    }

    fn anomaly_result(count: usize) -> AnomalyResult {
        serde_json::from_value(json!({
            "anomalies": [{"row": 2, "value": 5}],
            "anomaly_scores": {"2": -0.5},
            "anomaly_count": count,
            "total_count": 50,
        }))
        .unwrap()
    }

    fn benford_result() -> BenfordResult {
        BenfordResult {
            empirical_probs: BTreeMap::from([("1".to_string(), 0.31)]),
            benford_probs: BTreeMap::from([("1".to_string(), 0.301)]),
            chi_stat: 3.2,
            p_value: 0.92,
            plot: "iVBORw==".into(),
        }
    }

    /// Upload `id` and deliver its preview; returns the state ready for analysis.
    fn loaded(id: &str) -> AppState {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("data.csv")));
        let upload = state.dispatch(Event::UploadRequested).remove(0);
        let visualize = state
            .complete(Completion {
                ticket: upload.ticket,
                event: Event::Uploaded(Ok(FileId::new(id))),
            })
            .remove(0);
        state.complete(Completion {
            ticket: visualize.ticket,
            event: Event::Visualized(Ok(preview(&["amount", "qty"]))),
        });
        state
    }

    /// Select `kind` and issue its request, returning the command.
    fn request(state: &mut AppState, kind: AnalyzerKind, event: Event) -> Command {
        state.dispatch(Event::AnalyzerSelected(kind));
        state.dispatch(event).remove(0)
    }

    #[test]
    fn upload_success_requests_one_visualize() {
        let mut state = AppState::default();
        assert!(state.dispatch(Event::UploadRequested).is_empty());

        state.dispatch(Event::FilePicked(PathBuf::from("sales.csv")));
        let cmds = state.dispatch(Event::UploadRequested);
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].request, Request::Upload(PathBuf::from("sales.csv")));
        assert!(state.dispatch(Event::UploadRequested).is_empty());

        let cmds = state.complete(Completion {
            ticket: cmds[0].ticket,
            event: Event::Uploaded(Ok(FileId::new("A"))),
        });
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].request, Request::Visualize(FileId::new("A")));
        assert_eq!(state.file_id, Some(FileId::new("A")));
        assert!(state.awaiting_preview());
    }

    #[test]
    fn upload_failure_sets_fixed_error() {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("bad.bin")));
        let cmd = state.dispatch(Event::UploadRequested).remove(0);
        let cmds = state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::Uploaded(Err(backend_error())),
        });
        assert!(cmds.is_empty());
        assert_eq!(state.upload.error.as_deref(), Some(UPLOAD_ERROR));
        assert_eq!(state.upload.in_flight, None);
        assert_eq!(state.file_id, None);
    }

    #[test]
    fn selecting_analyzer_clears_result() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Anomaly, Event::AnomalyDetectionRequested);
        state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::AnomaliesDetected(Ok(anomaly_result(1))),
        });
        assert!(matches!(state.result, AnalysisResult::Anomaly(_)));

        for kind in AnalyzerKind::ALL {
            state.result = AnalysisResult::CorrelationMessage("old".into());
            state.dispatch(Event::AnalyzerSelected(kind));
            assert_eq!(state.result, AnalysisResult::None);
            assert_eq!(state.active_analyzer(), Some(kind));
        }
    }

    #[test]
    fn analyzer_needs_a_file() {
        let mut state = AppState::default();
        state.dispatch(Event::AnalyzerSelected(AnalyzerKind::Benford));
        assert_eq!(state.analyzer, None);
    }

    #[test]
    fn new_upload_discards_previous_file_state() {
        let mut state = loaded("A");
        let benford = request(&mut state, AnalyzerKind::Benford, Event::BenfordRequested);

        state.dispatch(Event::FilePicked(PathBuf::from("second.csv")));
        let upload = state.dispatch(Event::UploadRequested).remove(0);
        let visualize = state
            .complete(Completion {
                ticket: upload.ticket,
                event: Event::Uploaded(Ok(FileId::new("B"))),
            })
            .remove(0);

        assert_eq!(state.file_id, Some(FileId::new("B")));
        assert_eq!(state.preview, None);
        assert_eq!(state.analyzer, None);
        assert_eq!(state.result, AnalysisResult::None);

        // A's late Benford result must not land on B.
        state.complete(Completion {
            ticket: benford.ticket,
            event: Event::BenfordAnalyzed(Ok(benford_result())),
        });
        assert_eq!(state.result, AnalysisResult::None);

        state.complete(Completion {
            ticket: visualize.ticket,
            event: Event::Visualized(Ok(preview(&["b_col"]))),
        });
        assert_eq!(state.preview.as_ref().map(|p| p.columns.clone()), Some(vec!["b_col".to_string()]));
    }

    #[test]
    fn stale_preview_is_dropped() {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("a.csv")));
        let up_a = state.dispatch(Event::UploadRequested).remove(0);
        let vis_a = state
            .complete(Completion {
                ticket: up_a.ticket,
                event: Event::Uploaded(Ok(FileId::new("A"))),
            })
            .remove(0);
        state.dispatch(Event::ClearRequested);
        assert_eq!(state.file_id, None);

        state.complete(Completion {
            ticket: vis_a.ticket,
            event: Event::Visualized(Ok(preview(&["x"]))),
        });
        assert_eq!(state.preview, None);
    }

    #[test]
    fn clear_cancels_pending_upload() {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("a.csv")));
        let upload = state.dispatch(Event::UploadRequested).remove(0);
        state.dispatch(Event::ClearRequested);

        let cmds = state.complete(Completion {
            ticket: upload.ticket,
            event: Event::Uploaded(Ok(FileId::new("A"))),
        });
        assert!(cmds.is_empty());
        assert_eq!(state.file_id, None);
        assert_eq!(state.upload.picker_generation, 1);
    }

    #[test]
    fn correlation_preview_sets_message() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Correlation, Event::CorrelationPreviewRequested);
        match &cmd.request {
            Request::PreviewCorrelation(rq) => {
                assert_eq!(rq.id, FileId::new("A"));
                assert_eq!(rq.threshold, correlation::DEFAULT_THRESHOLD);
            }
            other => panic!("unexpected request {other:?}"),
        }
        state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::CorrelationPreviewed(Ok(vec!["qty".into()])),
        });
        assert_eq!(
            state.result,
            AnalysisResult::CorrelationMessage("Columns to remove: qty".into())
        );
    }

    #[test]
    fn threshold_clamped_before_sending() {
        let mut state = loaded("A");
        state.dispatch(Event::AnalyzerSelected(AnalyzerKind::Correlation));
        if let Some(AnalyzerPanel::Correlation(form)) = &mut state.analyzer {
            form.set_threshold(4.0);
        }
        let cmd = state.dispatch(Event::CorrelationPreviewRequested).remove(0);
        assert!(matches!(cmd.request, Request::PreviewCorrelation(ref rq) if rq.threshold == 1.0));
    }

    #[test]
    fn correlation_removal_replaces_file_and_visualizes_once() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Correlation, Event::CorrelationRemovalRequested);
        assert!(matches!(cmd.request, Request::RemoveCorrelation(_)));

        let cmds = state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::CorrelationRemoved(Ok(FileId::new("A-pruned"))),
        });
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].request, Request::Visualize(FileId::new("A-pruned")));
        assert_eq!(state.file_id, Some(FileId::new("A-pruned")));
        assert_eq!(state.preview, None);
        assert_eq!(state.analyzer, None);
    }

    #[test]
    fn correlation_removal_failure_keeps_file() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Correlation, Event::CorrelationRemovalRequested);
        let cmds = state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::CorrelationRemoved(Err(backend_error())),
        });
        assert!(cmds.is_empty());
        assert_eq!(state.file_id, Some(FileId::new("A")));
        match &state.analyzer {
            Some(AnalyzerPanel::Correlation(form)) => {
                assert_eq!(form.error.as_deref(), Some(correlation::REMOVE_ERROR))
            }
            other => panic!("unexpected analyzer {other:?}"),
        }
    }

    #[test]
    fn benford_uses_first_column_and_decodes_plot() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Benford, Event::BenfordRequested);
        assert_eq!(
            cmd.request,
            Request::Benford(BenfordRequest {
                id: FileId::new("A"),
                column: "amount".into(),
            })
        );
        state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::BenfordAnalyzed(Ok(benford_result())),
        });
        match &state.result {
            AnalysisResult::Benford(view) => {
                assert_eq!(view.result, benford_result());
                assert_eq!(view.plot_png.as_deref(), Some(&[0x89, b'P', b'N', b'G'][..]));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn benford_form_picks_up_late_preview() {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("a.csv")));
        let upload = state.dispatch(Event::UploadRequested).remove(0);
        let visualize = state
            .complete(Completion {
                ticket: upload.ticket,
                event: Event::Uploaded(Ok(FileId::new("A"))),
            })
            .remove(0);
        state.dispatch(Event::AnalyzerSelected(AnalyzerKind::Benford));
        assert!(state.dispatch(Event::BenfordRequested).is_empty());

        state.complete(Completion {
            ticket: visualize.ticket,
            event: Event::Visualized(Ok(preview(&["price"]))),
        });
        let cmds = state.dispatch(Event::BenfordRequested);
        assert!(matches!(&cmds[0].request, Request::Benford(rq) if rq.column == "price"));
    }

    #[test]
    fn failed_anomaly_detection_keeps_previous_result() {
        let mut state = loaded("A");
        let first = request(&mut state, AnalyzerKind::Anomaly, Event::AnomalyDetectionRequested);
        state.complete(Completion {
            ticket: first.ticket,
            event: Event::AnomaliesDetected(Ok(anomaly_result(1))),
        });
        let shown = state.result.clone();

        let second = state.dispatch(Event::AnomalyDetectionRequested).remove(0);
        state.complete(Completion {
            ticket: second.ticket,
            event: Event::AnomaliesDetected(Err(backend_error())),
        });

        assert_eq!(state.result, shown);
        match &state.analyzer {
            Some(AnalyzerPanel::Anomaly(form)) => {
                assert_eq!(form.error.as_deref(), Some(DETECTION_ERROR));
                assert!(!form.in_flight());
            }
            other => panic!("unexpected analyzer {other:?}"),
        }
    }

    #[test]
    fn anomaly_requests_blocked_while_in_flight() {
        let mut state = loaded("A");
        request(&mut state, AnalyzerKind::Anomaly, Event::AnomalyDetectionRequested);
        assert!(state.dispatch(Event::AnomalyDetectionRequested).is_empty());
    }

    #[test]
    fn late_result_from_replaced_analyzer_is_dropped() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Anomaly, Event::AnomalyDetectionRequested);
        state.dispatch(Event::AnalyzerSelected(AnalyzerKind::Correlation));
        state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::AnomaliesDetected(Ok(anomaly_result(1))),
        });
        assert_eq!(state.result, AnalysisResult::None);
    }

    #[test]
    fn visualize_failure_sets_status() {
        let mut state = AppState::default();
        state.dispatch(Event::FilePicked(PathBuf::from("a.csv")));
        let upload = state.dispatch(Event::UploadRequested).remove(0);
        let visualize = state
            .complete(Completion {
                ticket: upload.ticket,
                event: Event::Uploaded(Ok(FileId::new("A"))),
            })
            .remove(0);
        state.complete(Completion {
            ticket: visualize.ticket,
            event: Event::Visualized(Err(backend_error())),
        });
        assert_eq!(state.status_message.as_deref(), Some(VISUALIZE_ERROR));
        assert!(!state.awaiting_preview());
    }

    #[test]
    fn lock_toggle_touches_nothing_else() {
        let mut state = loaded("A");
        state.dispatch(Event::AnalyzerSelected(AnalyzerKind::Correlation));
        let analyzer = state.analyzer.clone();
        state.dispatch(Event::LayoutLockToggled);
        assert!(state.layout.is_locked());
        assert_eq!(state.analyzer, analyzer);
        assert_eq!(state.file_id, Some(FileId::new("A")));
    }

    #[test]
    fn export_writes_shown_anomalies() {
        let mut state = loaded("A");
        let cmd = request(&mut state, AnalyzerKind::Anomaly, Event::AnomalyDetectionRequested);
        state.complete(Completion {
            ticket: cmd.ticket,
            event: Event::AnomaliesDetected(Ok(anomaly_result(1))),
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anomalies.csv");
        state.dispatch(Event::ExportAnomalies(path.clone()));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "row,value\n2,5");

        state.dispatch(Event::ExportAnomalies(dir.path().join("missing/dir/out.csv")));
        assert_eq!(state.status_message.as_deref(), Some(EXPORT_ERROR));
    }
}
