use crate::api::types::{CorrelationMethod, CorrelationRequest, FileId, SelectionMethod};

pub const PREVIEW_ERROR: &str = "Error during correlation preview";
pub const REMOVE_ERROR: &str = "Error during column removal";
pub const DEFAULT_THRESHOLD: f64 = 0.9;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationForm {
    pub method: CorrelationMethod,
    pub selection_method: SelectionMethod,
    threshold: f64,
    pub error: Option<String>,
}

impl Default for CorrelationForm {
    fn default() -> Self {
        Self {
            method: CorrelationMethod::default(),
            selection_method: SelectionMethod::default(),
            threshold: DEFAULT_THRESHOLD,
            error: None,
        }
    }
}

impl CorrelationForm {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Stored clamped into `[0, 1]`; NaN becomes 0.
    pub fn set_threshold(&mut self, value: f64) {
        self.threshold = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    }

    pub fn request(&self, id: &FileId) -> CorrelationRequest {
        CorrelationRequest {
            id: id.clone(),
            method: self.method,
            selection_method: self.selection_method,
            threshold: self.threshold,
        }
    }
}

/// Text shown in the results panel after a preview.
pub fn removal_message(columns: &[String]) -> String {
    format!("Columns to remove: {}", columns.join(", "))
}
