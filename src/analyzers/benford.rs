use crate::api::types::{BenfordRequest, FileId};

pub const ANALYSIS_ERROR: &str = "Error during analysis";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BenfordForm {
    /// Empty while the dataset has no columns.
    pub column: String,
    pub error: Option<String>,
}

impl BenfordForm {
    pub fn new(columns: &[String]) -> Self {
        let mut form = Self::default();
        form.sync_columns(columns);
        form
    }

    /// Keep the selection valid for the current column list, falling back to
    /// the first column.
    pub fn sync_columns(&mut self, columns: &[String]) {
        if !columns.contains(&self.column) {
            self.column = columns.first().cloned().unwrap_or_default();
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.column.is_empty()
    }

    pub fn request(&self, id: &FileId) -> Option<BenfordRequest> {
        self.can_submit().then(|| BenfordRequest {
            id: id.clone(),
            column: self.column.clone(),
        })
    }
}
