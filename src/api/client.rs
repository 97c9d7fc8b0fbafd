use std::path::Path;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{ApiError, Result};
use super::types::{
    AnomalyRequest, AnomalyResult, BenfordRequest, BenfordResult, CorrelationPreviewResponse,
    CorrelationRequest, DatasetPreview, FileId, FileIdResponse, FileRequest,
};
use crate::config::Config;

pub const UPLOAD_ENDPOINT: &str = "/data/upload";
pub const VISUALIZE_ENDPOINT: &str = "/data/visualize";
pub const CORRELATION_PREVIEW_ENDPOINT: &str = "/data/correlation/preview_preprocess";
pub const CORRELATION_REMOVE_ENDPOINT: &str = "/data/correlation/preprocess";
pub const BENFORD_ENDPOINT: &str = "/data/benford/analyze";
pub const ANOMALY_ENDPOINT: &str = "/data/anomaly/detect";

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// The analysis service as seen by the dashboard. Every call is a single
/// blocking round trip: no retries, no caching.
pub trait Backend: Send + Sync {
    fn upload(&self, path: &Path) -> Result<FileId>;

    fn visualize(&self, id: &FileId) -> Result<DatasetPreview>;

    /// Columns the backend would drop for the given settings.
    fn preview_correlated_columns(&self, rq: &CorrelationRequest) -> Result<Vec<String>>;

    /// Drop correlated columns; returns the handle of the pruned dataset.
    fn remove_correlated_columns(&self, rq: &CorrelationRequest) -> Result<FileId>;

    fn benford_analyze(&self, rq: &BenfordRequest) -> Result<BenfordResult>;

    fn detect_anomalies(&self, rq: &AnomalyRequest) -> Result<AnomalyResult>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_json<Rq, Rs>(&self, path: &str, rq: &Rq) -> Result<Rs>
    where
        Rq: Serialize + ?Sized,
        Rs: DeserializeOwned,
    {
        let response = self.client.post(self.endpoint(path)).json(rq).send()?;
        read_response(response)
    }
}

impl Backend for ApiClient {
    fn upload(&self, path: &Path) -> Result<FileId> {
        let bytes = std::fs::read(path).map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("data.csv")
            .to_string();

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint(UPLOAD_ENDPOINT))
            .multipart(form)
            .send()?;
        let rs: FileIdResponse = read_response(response)?;
        Ok(rs.id)
    }

    fn visualize(&self, id: &FileId) -> Result<DatasetPreview> {
        self.post_json(VISUALIZE_ENDPOINT, &FileRequest { id })
    }

    fn preview_correlated_columns(&self, rq: &CorrelationRequest) -> Result<Vec<String>> {
        let rs: CorrelationPreviewResponse = self.post_json(CORRELATION_PREVIEW_ENDPOINT, rq)?;
        Ok(rs.columns_to_remove)
    }

    fn remove_correlated_columns(&self, rq: &CorrelationRequest) -> Result<FileId> {
        let rs: FileIdResponse = self.post_json(CORRELATION_REMOVE_ENDPOINT, rq)?;
        Ok(rs.id)
    }

    fn benford_analyze(&self, rq: &BenfordRequest) -> Result<BenfordResult> {
        self.post_json(BENFORD_ENDPOINT, rq)
    }

    fn detect_anomalies(&self, rq: &AnomalyRequest) -> Result<AnomalyResult> {
        self.post_json(ANOMALY_ENDPOINT, rq)
    }
}

fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes()?;
    decode(status, &body)
}

/// Success bodies decode into `T`; anything else becomes [`ApiError::Backend`]
/// carrying the error body.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T> {
    if status.is_success() {
        return Ok(serde_json::from_slice(body)?);
    }
    let body = serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()));
    Err(ApiError::Backend {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_decodes() {
        let id: FileIdResponse = decode(StatusCode::OK, br#"{"id": "f-1"}"#).unwrap();
        assert_eq!(id.id, FileId::new("f-1"));
    }

    #[test]
    fn error_status_surfaces_json_body() {
        let err = decode::<FileIdResponse>(
            StatusCode::BAD_REQUEST,
            br#"{"error": "column not numeric"}"#,
        )
        .unwrap_err();
        match err {
            ApiError::Backend { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, json!({"error": "column not numeric"}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_status_keeps_non_json_text() {
        let err = decode::<FileIdResponse>(StatusCode::BAD_GATEWAY, b"upstream down").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Backend { status: 502, body } if body == json!("upstream down")
        ));
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let err = decode::<FileIdResponse>(StatusCode::OK, b"{}").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn endpoints_join_base_url() {
        let config = Config {
            api_url: "http://analysis.local:5000".into(),
            request_timeout: None,
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(CORRELATION_PREVIEW_ENDPOINT),
            "http://analysis.local:5000/data/correlation/preview_preprocess"
        );
    }

    #[test]
    fn upload_of_missing_file_fails_before_sending() {
        let config = Config {
            api_url: "http://127.0.0.1:9".into(),
            request_timeout: None,
        };
        let client = ApiClient::new(&config).unwrap();
        let err = client
            .upload(Path::new("/definitely/not/here.csv"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }
}
