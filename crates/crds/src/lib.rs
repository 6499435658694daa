//! Cluster Inspector CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the inspection controller.

pub mod inspection_report;

pub use inspection_report::*;
