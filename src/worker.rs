//! Background request runner.
//!
//! Every backend call runs on its own short-lived thread so the UI never
//! blocks on the network. Results come back to the UI thread over an `mpsc`
//! channel, tagged with the ticket they were issued under.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use eframe::egui;

use crate::api::Backend;
use crate::state::{Command, Completion, Event, Request};

pub struct RequestWorker {
    backend: Arc<dyn Backend>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    /// Woken after each completion so the result is drawn without user input.
    repaint: Option<egui::Context>,
}

impl RequestWorker {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            tx,
            rx,
            repaint: None,
        }
    }

    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Start `command` in the background. Fire-and-forget: the only trace of
    /// it is the completion that later shows up in [`Self::drain`].
    pub fn submit(&self, command: Command) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let repaint = self.repaint.clone();
        let Command { ticket, request } = command;
        log::debug!("Submitting {request:?}");

        let spawned = thread::Builder::new()
            .name("insight-request".into())
            .spawn(move || {
                let event = execute(backend.as_ref(), request);
                // The receiver only goes away when the app is shutting down.
                let _ = tx.send(Completion { ticket, event });
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to spawn request thread: {e}");
        }
    }

    /// Completions that arrived since the last call, in arrival order.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }
}

/// Run one request against the backend, turning the outcome into the
/// matching completion event.
pub fn execute(backend: &dyn Backend, request: Request) -> Event {
    match request {
        Request::Upload(path) => Event::Uploaded(backend.upload(&path)),
        Request::Visualize(id) => Event::Visualized(backend.visualize(&id)),
        Request::PreviewCorrelation(rq) => {
            Event::CorrelationPreviewed(backend.preview_correlated_columns(&rq))
        }
        Request::RemoveCorrelation(rq) => {
            Event::CorrelationRemoved(backend.remove_correlated_columns(&rq))
        }
        Request::Benford(rq) => Event::BenfordAnalyzed(backend.benford_analyze(&rq)),
        Request::DetectAnomalies(rq) => Event::AnomaliesDetected(backend.detect_anomalies(&rq)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::json;

    use crate::analyzers::AnalyzerKind;
    use crate::api::error::Result;
    use crate::api::types::{
        AnomalyRequest, AnomalyResult, BenfordRequest, BenfordResult, CorrelationRequest,
        DatasetPreview, FileId,
    };
    use crate::api::ApiError;
    use crate::state::AppState;

    /// Records every call; uploads and removals mint predictable handles.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<String>>,
        fail_anomalies: bool,
    }

    impl RecordingBackend {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Backend for RecordingBackend {
        fn upload(&self, path: &Path) -> Result<FileId> {
            self.record(format!("upload {}", path.display()));
            Ok(FileId::new("A"))
        }

        fn visualize(&self, id: &FileId) -> Result<DatasetPreview> {
            self.record(format!("visualize {id}"));
            Ok(DatasetPreview {
                length: 4,
                columns: vec!["amount".into(), "amount_x2".into()],
                head: vec![vec!["1".into(), "2".into()]],
                tail: vec![vec!["4".into(), "8".into()]],
            })
        }

        fn preview_correlated_columns(&self, rq: &CorrelationRequest) -> Result<Vec<String>> {
            self.record(format!("preview {}", rq.id));
            Ok(vec!["amount_x2".into()])
        }

        fn remove_correlated_columns(&self, rq: &CorrelationRequest) -> Result<FileId> {
            self.record(format!("remove {}", rq.id));
            Ok(FileId::new(format!("{}-pruned", rq.id)))
        }

        fn benford_analyze(&self, rq: &BenfordRequest) -> Result<BenfordResult> {
            self.record(format!("benford {} {}", rq.id, rq.column));
            Err(ApiError::Backend {
                status: 422,
                body: json!({"error": "not numeric"}),
            })
        }

        fn detect_anomalies(&self, rq: &AnomalyRequest) -> Result<AnomalyResult> {
            self.record(format!("anomalies {} {}", rq.id, rq.contamination));
            if self.fail_anomalies {
                return Err(ApiError::Backend {
                    status: 500,
                    body: json!({"error": "model failed"}),
                });
            }
            Ok(serde_json::from_value(json!({
                "anomalies": [{"row": 3, "amount": 1000}],
                "anomaly_scores": {"3": -0.7},
                "anomaly_count": 1,
                "total_count": 4,
            }))
            .unwrap())
        }
    }

    /// Run commands to quiescence the way the app does, one frame at a time.
    fn settle(state: &mut AppState, worker: &RequestWorker, mut pending: usize) {
        while pending > 0 {
            let completion = worker
                .rx
                .recv_timeout(Duration::from_secs(5))
                .expect("request should complete");
            pending -= 1;
            for cmd in state.complete(completion) {
                worker.submit(cmd);
                pending += 1;
            }
        }
    }

    fn run(state: &mut AppState, worker: &RequestWorker, event: Event) {
        let cmds = state.dispatch(event);
        let n = cmds.len();
        for cmd in cmds {
            worker.submit(cmd);
        }
        settle(state, worker, n);
    }

    #[test]
    fn execute_maps_requests_to_events() {
        let backend = RecordingBackend::default();
        let event = execute(&backend, Request::Visualize(FileId::new("A")));
        assert!(matches!(event, Event::Visualized(Ok(ref p)) if p.length == 4));

        let event = execute(
            &backend,
            Request::Benford(BenfordRequest {
                id: FileId::new("A"),
                column: "amount".into(),
            }),
        );
        assert!(matches!(event, Event::BenfordAnalyzed(Err(ApiError::Backend { status: 422, .. }))));
        assert_eq!(backend.calls(), vec!["visualize A", "benford A amount"]);
    }

    #[test]
    fn upload_then_prune_visualizes_each_handle_once() {
        let backend = Arc::new(RecordingBackend::default());
        let worker = RequestWorker::new(backend.clone());
        let mut state = AppState::default();

        run(&mut state, &worker, Event::FilePicked(PathBuf::from("sales.csv")));
        run(&mut state, &worker, Event::UploadRequested);
        assert_eq!(state.preview.as_ref().map(|p| p.length), Some(4));

        run(&mut state, &worker, Event::AnalyzerSelected(AnalyzerKind::Correlation));
        run(&mut state, &worker, Event::CorrelationRemovalRequested);

        assert_eq!(state.file_id, Some(FileId::new("A-pruned")));
        assert!(state.preview.is_some());
        assert_eq!(
            backend.calls(),
            vec![
                "upload sales.csv",
                "visualize A",
                "remove A",
                "visualize A-pruned",
            ]
        );
    }

    #[test]
    fn failed_detection_surfaces_fixed_text() {
        let backend = Arc::new(RecordingBackend {
            fail_anomalies: true,
            ..Default::default()
        });
        let worker = RequestWorker::new(backend.clone());
        let mut state = AppState::default();

        run(&mut state, &worker, Event::FilePicked(PathBuf::from("sales.csv")));
        run(&mut state, &worker, Event::UploadRequested);
        run(&mut state, &worker, Event::AnalyzerSelected(AnalyzerKind::Anomaly));
        run(&mut state, &worker, Event::AnomalyDetectionRequested);

        match &state.analyzer {
            Some(crate::analyzers::AnalyzerPanel::Anomaly(form)) => {
                assert_eq!(form.error.as_deref(), Some("Error during anomaly detection"));
            }
            other => panic!("unexpected analyzer {other:?}"),
        }
        assert_eq!(state.result, crate::state::AnalysisResult::None);
        assert_eq!(backend.calls().last().map(String::as_str), Some("anomalies A 0.05"));
    }
}
