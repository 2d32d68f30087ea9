//! Normalized request outcomes.
//!
//! Every request produces an [`ApiResult`], success or not. Callers never see
//! a transport error directly; they inspect `success` instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a single request.
///
/// Exactly one of `data` / `error` is populated. Constructed only through
/// [`ApiResult::ok`] and [`ApiResult::failed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl ApiResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Response payload (present iff success).
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Failure message (present iff not success).
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Outcome of a batch.
///
/// `success` is false only when the batch could not be issued at all
/// (malformed descriptor). Individual request failures live inside `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    data: Vec<ApiResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl BatchResult {
    /// Batch issued; results aligned with the input order.
    pub fn completed(data: Vec<ApiResult>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Batch rejected before any request was issued.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &[ApiResult] {
        &self.data
    }

    pub fn into_data(self) -> Vec<ApiResult> {
        self.data
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_has_only_data() {
        let result = ApiResult::ok(json!({"satellites": []}));
        assert!(result.is_success());
        assert!(result.data().is_some());
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failed_has_only_error() {
        let result = ApiResult::failed("HTTP 500");
        assert!(!result.is_success());
        assert!(result.data().is_none());
        assert_eq!(result.error(), Some("HTTP 500"));
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(ApiResult::failed("boom")).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"], json!("boom"));
        assert!(value.get("data").is_none());
        assert!(value.get("timestamp").is_some());
    }

    #[test]
    fn test_batch_rejected() {
        let batch = BatchResult::rejected("unknown request type: bogus");
        assert!(!batch.is_success());
        assert!(batch.data().is_empty());
        assert_eq!(batch.error(), Some("unknown request type: bogus"));
    }
}
