//! InspectionReport CRD
//!
//! Requests an AI-assisted inspection of the cluster. The controller fills
//! in the status with the analysis returned by the inference service.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Retry attempts used when the spec leaves `retryAttempts` unset or non-positive.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

/// Per-attempt timeout used when the spec leaves `timeoutSeconds` unset or non-positive.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[kube(
    group = "aiops.inspector.dev",
    version = "v1",
    kind = "InspectionReport",
    namespaced,
    status = "InspectionReportStatus",
    printcolumn = r#"{"name":"Summary","type":"string","jsonPath":".status.summary"}"#,
    printcolumn = r#"{"name":"Last Reconciled","type":"date","jsonPath":".status.lastReconciled"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReportSpec {
    /// Number of attempts against the inference service (values <= 0 mean 1)
    #[serde(default)]
    pub retry_attempts: i32,

    /// Per-attempt timeout in seconds (values <= 0 mean 10)
    #[serde(default)]
    pub timeout_seconds: i32,

    /// Model override; the controller default is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InspectionReportStatus {
    /// High-level outcome of the last inspection
    #[serde(default)]
    pub summary: String,

    /// Analysis text returned by the inference service
    #[serde(default)]
    pub recommendations: Vec<String>,

    /// Last reconciliation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,

    /// Generation of the spec the last inspection ran against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Attempts the last successful analysis needed; null when it failed
    #[serde(default)]
    pub analysis_attempts: Option<u32>,
}

/// Normalized per-cycle inspection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectionRequest {
    /// Attempts against the inference service, always >= 1
    pub retry_attempts: u32,
    /// Per-attempt timeout in seconds, always >= 1
    pub timeout_seconds: u64,
}

impl InspectionRequest {
    /// Normalizes raw spec values, falling back to defaults for anything <= 0.
    pub fn normalize(retry_attempts: i32, timeout_seconds: i32) -> Self {
        Self {
            retry_attempts: u32::try_from(retry_attempts)
                .ok()
                .filter(|attempts| *attempts > 0)
                .unwrap_or(DEFAULT_RETRY_ATTEMPTS),
            timeout_seconds: u64::try_from(timeout_seconds)
                .ok()
                .filter(|seconds| *seconds > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl Default for InspectionRequest {
    fn default() -> Self {
        Self {
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl InspectionReport {
    /// Builds the normalized request for this report's declared configuration.
    pub fn inspection_request(&self) -> InspectionRequest {
        InspectionRequest::normalize(self.spec.retry_attempts, self.spec.timeout_seconds)
    }
}
