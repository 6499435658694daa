//! Analysis prompt template.

/// Composes the analysis prompt from the three report sections.
///
/// Sections are inserted verbatim in pod, event, node order, even when empty.
pub fn build_prompt(pod_report: &str, event_report: &str, node_report: &str) -> String {
    format!(
        "
You are a Kubernetes expert. Analyze the following cluster state and provide a high-level health summary and detailed recommendations.

--- Pods ---
{pod_report}

--- Events ---
{event_report}

--- Nodes ---
{node_report}

Output format:
- Summary: ...
- Recommendations:
  - ...
  - ...
"
    )
}
