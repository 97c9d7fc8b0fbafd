use crate::api::types::{AnomalyRequest, FileId};

pub const DETECTION_ERROR: &str = "Error during anomaly detection";
pub const DEFAULT_CONTAMINATION: f64 = 0.05;
pub const MAX_CONTAMINATION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyForm {
    contamination: f64,
    in_flight: bool,
    pub error: Option<String>,
}

impl Default for AnomalyForm {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            in_flight: false,
            error: None,
        }
    }
}

impl AnomalyForm {
    pub fn contamination(&self) -> f64 {
        self.contamination
    }

    /// Stored clamped into `[0, MAX_CONTAMINATION]`; NaN becomes 0.
    pub fn set_contamination(&mut self, value: f64) {
        self.contamination = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, MAX_CONTAMINATION)
        };
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Mark a detection as started; `None` while one is already running.
    pub fn begin(&mut self, id: &FileId) -> Option<AnomalyRequest> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(AnomalyRequest {
            id: id.clone(),
            contamination: self.contamination,
        })
    }

    pub fn succeed(&mut self) {
        self.in_flight = false;
        self.error = None;
    }

    pub fn fail(&mut self) {
        self.in_flight = false;
        self.error = Some(DETECTION_ERROR.to_string());
    }

    pub fn button_label(&self) -> &'static str {
        if self.in_flight {
            "Analyzing..."
        } else {
            "Detect anomalies"
        }
    }
}
