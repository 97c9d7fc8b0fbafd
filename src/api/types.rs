use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// FileId – backend-issued dataset handle
// ---------------------------------------------------------------------------

/// Opaque identifier of an uploaded dataset. Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Dataset preview
// ---------------------------------------------------------------------------

/// Head/tail snapshot of an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetPreview {
    /// Total number of rows in the dataset.
    pub length: usize,
    pub columns: Vec<String>,
    #[serde(deserialize_with = "text_rows")]
    pub head: Vec<Vec<String>>,
    #[serde(deserialize_with = "text_rows")]
    pub tail: Vec<Vec<String>>,
}

impl DatasetPreview {
    /// Head rows paired with their dataset row index, starting at 0.
    pub fn head_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.head.iter().enumerate().map(|(i, row)| (i, row.as_slice()))
    }

    /// Index of the first tail row within the full dataset.
    pub fn tail_start(&self) -> usize {
        self.length.saturating_sub(self.tail.len())
    }

    /// Tail rows paired with their dataset row index.
    pub fn tail_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        let start = self.tail_start();
        self.tail
            .iter()
            .enumerate()
            .map(move |(i, row)| (start + i, row.as_slice()))
    }
}

/// Cells are normally strings already; other JSON scalars are rendered as text.
fn text_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Vec<Value>> = Deserialize::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect())
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Correlation pruning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl CorrelationMethod {
    pub const ALL: [CorrelationMethod; 3] = [Self::Pearson, Self::Spearman, Self::Kendall];

    pub fn label(self) -> &'static str {
        match self {
            Self::Pearson => "Pearson",
            Self::Spearman => "Spearman",
            Self::Kendall => "Kendall",
        }
    }
}

/// Heuristic the backend uses to pick which column of a correlated pair to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    #[default]
    Variance,
    MissingValues,
    Cardinality,
}

impl SelectionMethod {
    pub const ALL: [SelectionMethod; 3] =
        [Self::Variance, Self::MissingValues, Self::Cardinality];

    pub fn label(self) -> &'static str {
        match self {
            Self::Variance => "Variance",
            Self::MissingValues => "Missing values",
            Self::Cardinality => "Cardinality",
        }
    }
}

/// Body of both the preview and the removal endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationRequest {
    pub id: FileId,
    pub method: CorrelationMethod,
    pub selection_method: SelectionMethod,
    pub threshold: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CorrelationPreviewResponse {
    pub columns_to_remove: Vec<String>,
}

// ---------------------------------------------------------------------------
// Upload / visualize
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct FileRequest<'a> {
    pub id: &'a FileId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileIdResponse {
    pub id: FileId,
}

// ---------------------------------------------------------------------------
// Benford analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenfordRequest {
    pub id: FileId,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenfordResult {
    /// Leading digit → observed probability.
    pub empirical_probs: BTreeMap<String, f64>,
    /// Leading digit → probability predicted by Benford's law.
    pub benford_probs: BTreeMap<String, f64>,
    pub chi_stat: f64,
    pub p_value: f64,
    /// Base64-encoded PNG rendered by the backend.
    pub plot: String,
}

impl BenfordResult {
    /// Digits present in either distribution, in numeric order.
    pub fn digits(&self) -> Vec<&str> {
        let mut digits: Vec<&str> = self
            .empirical_probs
            .keys()
            .chain(self.benford_probs.keys())
            .map(String::as_str)
            .collect();
        // Numeric keys first, in value order; anything else after them.
        digits.sort_by(|a, b| {
            let (x, y) = (a.parse::<f64>().ok(), b.parse::<f64>().ok());
            x.is_none()
                .cmp(&y.is_none())
                .then_with(|| match (x, y) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    _ => Ordering::Equal,
                })
                .then_with(|| a.cmp(b))
        });
        digits.dedup();
        digits
    }

    pub fn plot_png(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(self.plot.trim())
    }
}

// ---------------------------------------------------------------------------
// Anomaly detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyRequest {
    pub id: FileId,
    pub contamination: f64,
}

/// One flagged row; field order is preserved from the response.
pub type AnomalyRecord = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnomalyResult {
    #[serde(deserialize_with = "anomaly_records")]
    pub anomalies: Vec<AnomalyRecord>,
    /// Row index → anomaly score.
    #[serde(default)]
    pub anomaly_scores: Map<String, Value>,
    pub anomaly_count: usize,
    pub total_count: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnomalyRows {
    Records(Vec<AnomalyRecord>),
    ByIndex(Map<String, Value>),
}

/// The backend sends either a list of records or an index → value map; the
/// latter becomes `{index, value}` records.
fn anomaly_records<'de, D>(deserializer: D) -> Result<Vec<AnomalyRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match AnomalyRows::deserialize(deserializer)? {
        AnomalyRows::Records(records) => records,
        AnomalyRows::ByIndex(map) => map
            .into_iter()
            .map(|(index, value)| {
                let mut record = Map::new();
                record.insert("index".into(), Value::String(index));
                record.insert("value".into(), value);
                record
            })
            .collect(),
    })
}
