//! Kubernetes resource watcher.
//!
//! Drives reconciliation of InspectionReports through `kube_runtime::Controller`,
//! which handles reconnection and requeues. Concurrent reconciliations of the
//! same report are serialized by the controller runtime.

use crate::backoff::ErrorBackoff;
use crate::cluster::ReportKey;
use crate::error::ControllerError;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crds::InspectionReport;
use futures::StreamExt;
use kube::Api;
use kube_runtime::{Controller, controller::{Action, Config as ControllerConfig}, watcher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Shared state handed to every reconciliation
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler,
    backoff: ErrorBackoff,
}

impl Context {
    /// Creates the context for `reconciler`.
    pub fn new(reconciler: Reconciler) -> Self {
        Self {
            reconciler,
            backoff: ErrorBackoff::default(),
        }
    }
}

/// Maps a reconcile outcome to the next controller action.
pub fn next_action(outcome: &ReconcileOutcome) -> Action {
    match outcome {
        ReconcileOutcome::Deleted => Action::await_change(),
        ReconcileOutcome::Fresh { requeue_after } | ReconcileOutcome::Completed { requeue_after, .. } => {
            Action::requeue(*requeue_after)
        }
    }
}

async fn reconcile(report: Arc<InspectionReport>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let key = ReportKey::from_report(&report);
    debug!("Reconciling InspectionReport {} (generation {:?})", key, report.metadata.generation);

    let outcome = ctx.reconciler.reconcile_inspection_report(&key).await?;
    ctx.backoff.reset(&key.to_string());
    Ok(next_action(&outcome))
}

fn error_policy(report: Arc<InspectionReport>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = ReportKey::from_report(&report);
    let delay = ctx.backoff.record_failure(&key.to_string());
    error!("Reconciliation error for InspectionReport {}: {} (retrying in {:?})", key, error, delay);
    Action::requeue(delay)
}

/// Runs the InspectionReport controller until the watch stream ends.
pub async fn watch_inspection_reports(api: Api<InspectionReport>, ctx: Arc<Context>) -> Result<(), ControllerError> {
    info!("Starting InspectionReport watcher");

    // Debounce batches bursts of events for the same report
    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, action)) => debug!("Reconciled {}: {:?}", obj, action),
                Err(e) => error!("Controller error for InspectionReport: {}", e),
            }
        })
        .await;

    info!("InspectionReport watcher stopped");
    Ok(())
}
