//! Inspection Controller
//!
//! Periodically inspects cluster health with the help of an LLM.
//!
//! This controller reconciles `InspectionReport` CRDs: it summarizes pods,
//! events and nodes into a prompt, asks an Ollama inference service for an
//! analysis and records the answer in the report's status, once an hour.

mod backoff;
mod cluster;
mod collector;
mod config;
mod controller;
mod error;
mod prompt;
mod reconciler;
mod test_utils;
mod watcher;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube and reqwest both use rustls; pick the provider explicitly
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        info!("rustls crypto provider already installed");
    }

    info!("Starting Inspection Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  Ollama URL: {}", config.ollama.base_url);
    info!("  Model: {}", config.ollama.model);
    info!("  Backoff: {:?}", config.ollama.backoff);
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));

    let controller = Controller::new(config).await?;
    controller.run().await?;

    Ok(())
}
