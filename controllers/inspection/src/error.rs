//! Controller-specific error types.
//!
//! Only failures on the report read/write path surface here; collection and
//! analysis failures degrade the report content instead.

use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the Inspection Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error outside of reconciliation (client setup, ...)
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Initial fetch of the InspectionReport failed
    #[error("Failed to get InspectionReport {report}: {source}")]
    Fetch {
        /// `namespace/name` of the report
        report: String,
        /// Underlying API error
        source: KubeError,
    },

    /// Fetch of the latest InspectionReport before the status write failed
    #[error("Failed to re-fetch InspectionReport {report} before status update: {source}")]
    Refetch {
        /// `namespace/name` of the report
        report: String,
        /// Underlying API error
        source: KubeError,
    },

    /// Writing the status subresource failed
    #[error("Failed to update InspectionReport {report} status: {source}")]
    StatusWrite {
        /// `namespace/name` of the report
        report: String,
        /// Underlying API error
        source: KubeError,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inference client could not be built
    #[error("Ollama client error: {0}")]
    Ollama(#[from] ollama_client::OllamaError),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

/// Listing one kind of cluster object failed.
#[derive(Debug, Error)]
#[error("Failed to list {kind}: {source}")]
pub struct CollectionError {
    /// Plural kind name, e.g. `pods`
    pub kind: &'static str,
    /// Underlying API error
    #[source]
    pub source: KubeError,
}
