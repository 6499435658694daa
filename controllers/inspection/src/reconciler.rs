//! Reconciliation logic for InspectionReport CRDs.
//!
//! Each reconciliation collects a cluster snapshot, asks the inference
//! service for an analysis and writes the result to the report's status.
//! No lock is held on the report while the analysis runs; the report is
//! re-fetched right before the status write so that the write applies to
//! the latest version instead of the one read at the start.

use crate::cluster::{ClusterStateReader, ReportKey, ReportStore};
use crate::collector;
use crate::error::ControllerError;
use crate::prompt::build_prompt;
use chrono::Utc;
use crds::{InspectionReport, InspectionReportStatus};
use ollama_client::AnalysisClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Status summary written after every completed inspection
pub const COMPLETION_SUMMARY: &str = "Cluster inspection completed by AI.";

/// Recommendation written when the analysis could not be obtained
pub const ANALYSIS_FALLBACK: &str = "AI analysis failed. Please check connectivity.";

/// Delay before a report is inspected again
pub const REQUEUE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Reports inspected less than `REQUEUE_INTERVAL - FRESHNESS_SLACK` ago are not re-analysed
const FRESHNESS_SLACK: Duration = Duration::from_secs(60);

/// Result of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The report no longer exists; nothing to do
    Deleted,
    /// The current generation was inspected recently; check again later
    Fresh {
        /// Time until the next inspection is due
        requeue_after: Duration,
    },
    /// The status was updated
    Completed {
        /// Time until the next inspection
        requeue_after: Duration,
        /// Whether the status carries a real analysis rather than the fallback
        analysis_succeeded: bool,
    },
}

/// Reconciles InspectionReport resources.
pub struct Reconciler {
    reports: Arc<dyn ReportStore>,
    cluster: Arc<dyn ClusterStateReader>,
    analysis: AnalysisClient,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("analysis", &self.analysis)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(
        reports: Arc<dyn ReportStore>,
        cluster: Arc<dyn ClusterStateReader>,
        analysis: AnalysisClient,
    ) -> Self {
        Self {
            reports,
            cluster,
            analysis,
        }
    }

    /// Reconciles the InspectionReport identified by `key`.
    ///
    /// This method:
    /// 1. Fetches the report (missing report: no-op)
    /// 2. Collects pods, events and nodes (failures only empty their section)
    /// 3. Builds the prompt and queries the inference service (failure: fallback text)
    /// 4. Re-fetches the report and writes the status onto that version
    ///
    /// Errors are only returned for the report read/write path.
    pub async fn reconcile_inspection_report(&self, key: &ReportKey) -> Result<ReconcileOutcome, ControllerError> {
        info!("Reconciling InspectionReport {}", key);

        let report = match self.reports.get(key).await {
            Ok(Some(report)) => report,
            Ok(None) => {
                info!("InspectionReport {} not found. Ignoring since object must be deleted.", key);
                return Ok(ReconcileOutcome::Deleted);
            }
            Err(e) => {
                error!("Failed to get InspectionReport {}: {}", key, e);
                return Err(ControllerError::Fetch { report: key.to_string(), source: e });
            }
        };

        if let Some(remaining) = time_until_due(&report) {
            debug!("InspectionReport {} is up to date, next inspection in {:?}", key, remaining);
            return Ok(ReconcileOutcome::Fresh { requeue_after: remaining });
        }

        let summary = collector::collect(self.cluster.as_ref()).await;
        let prompt = build_prompt(summary.pod_report(), summary.event_report(), summary.node_report());

        let request = report.inspection_request();
        let model = report
            .spec
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(self.analysis.default_model());

        debug!(
            "Querying model {} for {} ({} attempts, {}s timeout)",
            model, key, request.retry_attempts, request.timeout_seconds
        );
        let (recommendation, attempts) = match self
            .analysis
            .query(model, &prompt, request.timeout_seconds, request.retry_attempts)
            .await
        {
            Ok(analysis) => (analysis.text, Some(analysis.attempts)),
            Err(e) => {
                error!("AI analysis failed for InspectionReport {}: {}", key, e);
                (ANALYSIS_FALLBACK.to_string(), None)
            }
        };

        // Refetch the most recent version before updating
        let mut latest = match self.reports.get(key).await {
            Ok(Some(latest)) => latest,
            Ok(None) => {
                warn!("InspectionReport {} was deleted during inspection, dropping result", key);
                return Ok(ReconcileOutcome::Deleted);
            }
            Err(e) => {
                error!("Failed to re-fetch InspectionReport {} before status update: {}", key, e);
                return Err(ControllerError::Refetch { report: key.to_string(), source: e });
            }
        };

        latest.status = Some(InspectionReportStatus {
            summary: COMPLETION_SUMMARY.to_string(),
            recommendations: vec![recommendation],
            last_reconciled: Some(Utc::now()),
            observed_generation: report.metadata.generation,
            analysis_attempts: attempts,
        });

        if let Err(e) = self.reports.write_status(&latest).await {
            error!("Failed to update InspectionReport {} status: {}", key, e);
            return Err(ControllerError::StatusWrite { report: key.to_string(), source: e });
        }

        info!("Inspection complete. InspectionReport {} updated.", key);
        Ok(ReconcileOutcome::Completed {
            requeue_after: REQUEUE_INTERVAL,
            analysis_succeeded: attempts.is_some(),
        })
    }
}

/// Time left until `report` is due, or `None` if it should be inspected now.
///
/// A report is due when its spec changed since the last inspection or the
/// last inspection is (almost) a full requeue interval old.
fn time_until_due(report: &InspectionReport) -> Option<Duration> {
    let status = report.status.as_ref()?;
    if status.observed_generation.is_none() || status.observed_generation != report.metadata.generation {
        return None;
    }

    let elapsed = (Utc::now() - status.last_reconciled?).to_std().unwrap_or_default();
    let fresh_for = REQUEUE_INTERVAL.saturating_sub(FRESHNESS_SLACK);
    if elapsed >= fresh_for {
        return None;
    }
    Some(REQUEUE_INTERVAL - elapsed)
}
