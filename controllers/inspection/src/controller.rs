//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the Kubernetes
//! client, the inference client and the reconciler together and runs the
//! InspectionReport watcher.

use crate::cluster::{KubeClusterState, KubeReportStore};
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use crate::watcher::{Context, watch_inspection_reports};
use crds::InspectionReport;
use kube::{Api, Client};
use ollama_client::AnalysisClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Main controller for InspectionReport management.
#[derive(Debug)]
pub struct Controller {
    inspection_report_watcher: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance and starts its watcher.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Inspection Controller");

        let kube_client = Client::try_default().await?;
        let analysis = AnalysisClient::new(config.ollama.clone())?;

        let reconciler = Reconciler::new(
            Arc::new(KubeReportStore::new(kube_client.clone())),
            Arc::new(KubeClusterState::new(kube_client.clone())),
            analysis,
        );

        let api: Api<InspectionReport> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client, ns),
            None => Api::all(kube_client),
        };

        let ctx = Arc::new(Context::new(reconciler));
        let inspection_report_watcher = tokio::spawn(async move {
            watch_inspection_reports(api, ctx).await
        });

        Ok(Self { inspection_report_watcher })
    }

    /// Runs the controller until shutdown.
    pub async fn run(self) -> Result<(), ControllerError> {
        info!("Inspection Controller running");

        self.inspection_report_watcher
            .await
            .map_err(|e| ControllerError::Watch(format!("InspectionReport watcher panicked: {e}")))?
    }
}
