//! Kubernetes collaborators of the reconciler.
//!
//! The reconciler only talks to the cluster through [`ClusterStateReader`]
//! and [`ReportStore`], which keeps it testable without an API server.
//! `KubeClusterState` and `KubeReportStore` are the kube-rs implementations.

use crds::InspectionReport;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::fmt;
use tracing::debug;

/// Identity of an InspectionReport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportKey {
    /// Namespace of the report
    pub namespace: String,
    /// Name of the report
    pub name: String,
}

impl ReportKey {
    /// Creates a key from namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing report; reports without a namespace map to `default`.
    pub fn from_report(report: &InspectionReport) -> Self {
        Self::new(
            report.namespace().unwrap_or_else(|| "default".to_string()),
            report.name_any(),
        )
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Read access to cluster objects across all namespaces.
#[async_trait::async_trait]
pub trait ClusterStateReader: Send + Sync {
    /// Lists every pod the controller can see.
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error>;

    /// Lists every node.
    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error>;

    /// Lists every core/v1 event the controller can see.
    async fn list_events(&self) -> Result<Vec<Event>, kube::Error>;
}

/// Read/write access to InspectionReports.
#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    /// Fetches the current report; `Ok(None)` when it no longer exists.
    async fn get(&self, key: &ReportKey) -> Result<Option<InspectionReport>, kube::Error>;

    /// Persists `report.status` through the status subresource.
    ///
    /// The write is conditional on `report`'s resourceVersion.
    async fn write_status(&self, report: &InspectionReport) -> Result<InspectionReport, kube::Error>;
}

/// [`ClusterStateReader`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeClusterState {
    client: Client,
}

impl fmt::Debug for KubeClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeClusterState").finish_non_exhaustive()
    }
}

impl KubeClusterState {
    /// Creates a reader over `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ClusterStateReader for KubeClusterState {
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        let pods = Api::<Pod>::all(self.client.clone()).list(&ListParams::default()).await?;
        debug!("Listed {} pods", pods.items.len());
        Ok(pods.items)
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error> {
        let nodes = Api::<Node>::all(self.client.clone()).list(&ListParams::default()).await?;
        debug!("Listed {} nodes", nodes.items.len());
        Ok(nodes.items)
    }

    async fn list_events(&self) -> Result<Vec<Event>, kube::Error> {
        let events = Api::<Event>::all(self.client.clone()).list(&ListParams::default()).await?;
        debug!("Listed {} events", events.items.len());
        Ok(events.items)
    }
}

/// [`ReportStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeReportStore {
    client: Client,
}

impl fmt::Debug for KubeReportStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeReportStore").finish_non_exhaustive()
    }
}

impl KubeReportStore {
    /// Creates a store over `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<InspectionReport> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait::async_trait]
impl ReportStore for KubeReportStore {
    async fn get(&self, key: &ReportKey) -> Result<Option<InspectionReport>, kube::Error> {
        self.api(&key.namespace).get_opt(&key.name).await
    }

    async fn write_status(&self, report: &InspectionReport) -> Result<InspectionReport, kube::Error> {
        let key = ReportKey::from_report(report);
        let patch = status_patch(report);

        let pp = PatchParams::default();
        self.api(&key.namespace)
            .patch_status(&key.name, &pp, &Patch::Merge(&patch))
            .await
    }
}

/// Merge patch writing `report.status` conditionally on its resourceVersion.
///
/// The API server rejects the patch with a 409 if the report changed after
/// it was fetched. Unset optional status fields are sent as `null` so they
/// clear values left by an earlier inspection.
pub fn status_patch(report: &InspectionReport) -> serde_json::Value {
    json!({
        "metadata": { "resourceVersion": report.resource_version() },
        "status": report.status,
    })
}
