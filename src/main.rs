// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gitlab_controller::config::Config;
use gitlab_controller::kubernetes::wait_for_crds;
use gitlab_controller::reconcilers::{required_crds, GitLabReconciler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting GitLab controller");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, requeue={:?}, ready_requeue={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.requeue_interval,
        config.ready_requeue_interval
    );

    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Claims cannot be bound before the resource-abstraction layer is installed
    info!("Waiting for CRDs to become available...");
    wait_for_crds(&client, &required_crds()).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
        signal.cancel();
    });

    GitLabReconciler::new(client, config, shutdown).run().await?;

    info!("GitLab controller stopped");
    Ok(())
}
