//! Prints the CRD manifests served by the inspection controller.
//!
//! Usage: `cargo run -p crds --bin crdgen > config/crd/inspectionreports.yaml`

use crds::InspectionReport;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&InspectionReport::crd())?);
    Ok(())
}
