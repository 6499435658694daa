//! Test utilities for unit testing the reconciler
//!
//! In-memory doubles for the cluster collaborators and helpers for building
//! Kubernetes objects from JSON fixtures.

#[cfg(test)]
use crate::cluster::{ClusterStateReader, ReportKey, ReportStore};
#[cfg(test)]
use crds::{InspectionReport, InspectionReportSpec};
#[cfg(test)]
use k8s_openapi::api::core::v1::{Event, Node, Pod};
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

/// Transient API error as returned by a flaky API server
#[cfg(test)]
pub fn transient_error() -> kube::Error {
    kube::Error::Service("connection reset by peer".into())
}

/// Helper to create a test Pod
#[cfg(test)]
pub fn test_pod(name: &str, namespace: &str, phase: &str, ready: bool) -> Pod {
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": name, "namespace": namespace },
        "status": {
            "phase": phase,
            "conditions": [{ "type": "Ready", "status": if ready { "True" } else { "False" } }]
        }
    }))
    .unwrap()
}

/// Helper to create a test Node; `None` omits the Ready condition
#[cfg(test)]
pub fn test_node(name: &str, ready: Option<&str>) -> Node {
    let conditions: Vec<serde_json::Value> = ready
        .map(|status| serde_json::json!({ "type": "Ready", "status": status }))
        .into_iter()
        .chain(std::iter::once(serde_json::json!({ "type": "MemoryPressure", "status": "False" })))
        .collect();
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": name },
        "status": { "conditions": conditions }
    }))
    .unwrap()
}

/// Helper to create a test Event
#[cfg(test)]
pub fn test_event(first_timestamp: &str, kind: &str, name: &str, reason: &str, message: &str) -> Event {
    serde_json::from_value(serde_json::json!({
        "metadata": { "name": format!("{name}.event"), "namespace": "default" },
        "involvedObject": { "kind": kind, "name": name },
        "reason": reason,
        "message": message,
        "firstTimestamp": first_timestamp
    }))
    .unwrap()
}

/// Helper to create a test InspectionReport
#[cfg(test)]
pub fn test_report(name: &str, resource_version: &str, generation: i64, spec: InspectionReportSpec) -> InspectionReport {
    let mut report = InspectionReport::new(name, spec);
    report.metadata.namespace = Some("default".to_string());
    report.metadata.resource_version = Some(resource_version.to_string());
    report.metadata.generation = Some(generation);
    report
}

/// Cluster state served from memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FakeClusterState {
    pods: Vec<Pod>,
    nodes: Vec<Node>,
    events: Vec<Event>,
    fail_pods: bool,
    fail_nodes: bool,
    fail_events: bool,
}

#[cfg(test)]
impl FakeClusterState {
    pub fn with_pods(mut self, pods: Vec<Pod>) -> Self {
        self.pods = pods;
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    pub fn failing_pods(mut self) -> Self {
        self.fail_pods = true;
        self
    }

    pub fn failing_nodes(mut self) -> Self {
        self.fail_nodes = true;
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ClusterStateReader for FakeClusterState {
    async fn list_pods(&self) -> Result<Vec<Pod>, kube::Error> {
        if self.fail_pods {
            return Err(transient_error());
        }
        Ok(self.pods.clone())
    }

    async fn list_nodes(&self) -> Result<Vec<Node>, kube::Error> {
        if self.fail_nodes {
            return Err(transient_error());
        }
        Ok(self.nodes.clone())
    }

    async fn list_events(&self) -> Result<Vec<Event>, kube::Error> {
        if self.fail_events {
            return Err(transient_error());
        }
        Ok(self.events.clone())
    }
}

/// Scripted answer to one `ReportStore::get`
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum GetReply {
    Found(InspectionReport),
    Missing,
    Fail,
}

/// Report store that answers gets from a script and records status writes
///
/// Once the script is exhausted every get answers `Missing`.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedReportStore {
    gets: Mutex<VecDeque<GetReply>>,
    get_keys: Mutex<Vec<ReportKey>>,
    writes: Mutex<Vec<InspectionReport>>,
    fail_writes: bool,
}

#[cfg(test)]
impl ScriptedReportStore {
    pub fn new(gets: Vec<GetReply>) -> Self {
        Self {
            gets: Mutex::new(gets.into()),
            ..Self::default()
        }
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn get_count(&self) -> usize {
        self.get_keys.lock().unwrap().len()
    }

    pub fn get_keys(&self) -> Vec<ReportKey> {
        self.get_keys.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<InspectionReport> {
        self.writes.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl ReportStore for ScriptedReportStore {
    async fn get(&self, key: &ReportKey) -> Result<Option<InspectionReport>, kube::Error> {
        self.get_keys.lock().unwrap().push(key.clone());
        let reply = self.gets.lock().unwrap().pop_front().unwrap_or(GetReply::Missing);
        match reply {
            GetReply::Found(report) => Ok(Some(report)),
            GetReply::Missing => Ok(None),
            GetReply::Fail => Err(transient_error()),
        }
    }

    async fn write_status(&self, report: &InspectionReport) -> Result<InspectionReport, kube::Error> {
        if self.fail_writes {
            return Err(transient_error());
        }
        self.writes.lock().unwrap().push(report.clone());
        Ok(report.clone())
    }
}
