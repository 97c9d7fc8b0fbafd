use std::path::{Path, PathBuf};

pub const UPLOAD_ERROR: &str = "Error during upload";

// ---------------------------------------------------------------------------
// Upload panel state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPanel {
    /// File chosen in the picker but not uploaded yet.
    pub pending: Option<PathBuf>,
    /// Sequence number of the upload currently running.
    pub in_flight: Option<u64>,
    /// Bumped on clear so the picker widget is rebuilt from scratch.
    pub picker_generation: u64,
    pub error: Option<String>,
}

impl UploadPanel {
    pub fn pick(&mut self, path: PathBuf) {
        self.pending = Some(path);
        self.error = None;
    }

    pub fn can_submit(&self) -> bool {
        self.pending.is_some() && self.in_flight.is_none()
    }

    /// Forget the selection and any running upload.
    pub fn clear(&mut self) {
        self.pending = None;
        self.in_flight = None;
        self.error = None;
        self.picker_generation += 1;
    }

    pub fn picked_name(&self) -> Option<String> {
        self.pending
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }
}
