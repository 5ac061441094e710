//! Readiness gate
//!
//! Blocks the run until the Deployments the Dashboard depends on report all
//! their replicas ready. Nothing else can succeed before that.

use crate::cluster::ClusterApi;
use crate::config::ReadinessConfig;
use crate::error::{BootstrapError, Result};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use tracing::{debug, info};

/// A Deployment is ready once its ready replicas reach the desired count.
pub fn deployment_is_ready(deployment: &Deployment) -> bool {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);
    ready >= desired
}

/// Names of the Deployments that are not ready yet.
fn unready(deployments: &[Deployment]) -> Vec<String> {
    deployments
        .iter()
        .filter(|d| !deployment_is_ready(d))
        .map(|d| d.name_any())
        .collect()
}

/// Poll until every selected Deployment is ready.
///
/// List errors are returned immediately; only "not ready yet" is polled
/// again. Gives up with [`BootstrapError::NotReady`] after
/// `config.max_attempts` observations.
pub async fn wait_for_deployments(
    cluster: &dyn ClusterApi,
    namespace: &str,
    config: &ReadinessConfig,
) -> Result<()> {
    info!(
        "Waiting for Deployments in namespace {} to become ready",
        namespace
    );

    let mut pending = Vec::new();
    for attempt in 1..=config.max_attempts {
        let deployments = cluster
            .list_deployments(namespace, &config.label_selector)
            .await?;

        pending = if deployments.is_empty() {
            vec![format!("no Deployments found in namespace {}", namespace)]
        } else {
            unready(&deployments)
        };

        if pending.is_empty() {
            info!("All {} Deployments are ready", deployments.len());
            return Ok(());
        }

        debug!(
            "Attempt {}/{}: waiting on {}",
            attempt,
            config.max_attempts,
            pending.join(", ")
        );
        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval()).await;
        }
    }

    Err(BootstrapError::NotReady(pending.join(", ")))
}
