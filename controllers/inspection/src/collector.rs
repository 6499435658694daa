//! Cluster snapshot collection.
//!
//! Lists pods, events and nodes and renders each kind as a newline-terminated
//! text section. A failed list never aborts the inspection: it is logged and
//! the section renders empty.
//!
//! Lines keep the order returned by the API server, which is not guaranteed
//! to be stable between calls.

use crate::cluster::ClusterStateReader;
use crate::error::CollectionError;
use k8s_openapi::api::core::v1::{Event, Node, Pod};
use tracing::{debug, error};

/// Rendered timestamp when an event has no first timestamp
const ZERO_TIMESTAMP: &str = "0001-01-01 00:00:00";

/// One collected section, or the error that emptied it
pub type Section = Result<String, CollectionError>;

/// Independently collected text sections of one snapshot
#[derive(Debug)]
pub struct ClusterSummary {
    /// Pod lines
    pub pods: Section,
    /// Event lines
    pub events: Section,
    /// Node lines
    pub nodes: Section,
}

impl ClusterSummary {
    /// Pod report, empty if collection failed
    pub fn pod_report(&self) -> &str {
        section_text(&self.pods)
    }

    /// Event report, empty if collection failed
    pub fn event_report(&self) -> &str {
        section_text(&self.events)
    }

    /// Node report, empty if collection failed
    pub fn node_report(&self) -> &str {
        section_text(&self.nodes)
    }

    /// Errors of the sections that could not be collected
    pub fn failures(&self) -> impl Iterator<Item = &CollectionError> {
        [&self.pods, &self.events, &self.nodes]
            .into_iter()
            .filter_map(|section| section.as_ref().err())
    }
}

fn section_text(section: &Section) -> &str {
    section.as_deref().unwrap_or("")
}

/// Lists all three kinds concurrently and renders them.
pub async fn collect(reader: &dyn ClusterStateReader) -> ClusterSummary {
    let (pods, events, nodes) = tokio::join!(
        reader.list_pods(),
        reader.list_events(),
        reader.list_nodes(),
    );

    let summary = ClusterSummary {
        pods: render("pods", pods, format_pod),
        events: render("events", events, format_event),
        nodes: render("nodes", nodes, format_node),
    };

    for failure in summary.failures() {
        error!("{}", failure);
    }
    summary
}

fn render<T>(
    kind: &'static str,
    listed: Result<Vec<T>, kube::Error>,
    format: fn(&T) -> String,
) -> Section {
    let items = listed.map_err(|source| CollectionError { kind, source })?;
    debug!("Rendering {} {}", items.len(), kind);

    Ok(items.iter().map(|item| format(item) + "\n").collect())
}

/// `Pod <name> (Namespace: <ns>): Phase=<phase>, Ready=<bool>`
pub fn format_pod(pod: &Pod) -> String {
    let status = pod.status.as_ref();
    let phase = status.and_then(|s| s.phase.as_deref()).unwrap_or("");

    format!(
        "Pod {} (Namespace: {}): Phase={}, Ready={}",
        pod.metadata.name.as_deref().unwrap_or(""),
        pod.metadata.namespace.as_deref().unwrap_or(""),
        phase,
        is_pod_ready(pod),
    )
}

/// True iff the pod has a `Ready` condition with status `True`.
pub fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

/// `[<first timestamp>] <kind>/<name> - <reason>: <message>`
pub fn format_event(event: &Event) -> String {
    let timestamp = event
        .first_timestamp
        .as_ref()
        .map_or_else(
            || ZERO_TIMESTAMP.to_string(),
            |t| t.0.format("%Y-%m-%d %H:%M:%S").to_string(),
        );

    format!(
        "[{}] {}/{} - {}: {}",
        timestamp,
        event.involved_object.kind.as_deref().unwrap_or(""),
        event.involved_object.name.as_deref().unwrap_or(""),
        event.reason.as_deref().unwrap_or(""),
        event.message.as_deref().unwrap_or(""),
    )
}

/// `Node <name>: Ready=<status>`, with `Unknown` when no Ready condition exists
pub fn format_node(node: &Node) -> String {
    let ready = node
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
        .map_or("Unknown", |c| c.status.as_str());

    format!(
        "Node {}: Ready={}",
        node.metadata.name.as_deref().unwrap_or(""),
        ready,
    )
}
