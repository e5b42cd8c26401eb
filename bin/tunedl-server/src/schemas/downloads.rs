use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Media page URL handed to the extractor.
    pub url: Option<String>,
    /// `normal`, `high` or `maximum`; anything else is treated as `normal`.
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadAccepted {
    pub success: bool,
    pub message: String,
    pub download_id: String,
    /// Relative URL to poll for this job.
    pub status_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClearRequest {
    /// Also remove jobs that are still running. Any truthy JSON value
    /// (`true`, non-zero numbers, non-empty strings/arrays/objects) counts.
    #[serde(default, deserialize_with = "truthy")]
    pub clear_all: bool,
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub cleared_count: usize,
    /// Only present when `clear_all` was false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProbeResponse {
    pub success: bool,
    pub message: String,
}
