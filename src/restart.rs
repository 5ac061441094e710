//! Dashboard rolling restart
//!
//! The Dashboard only picks up a new portal CNAME on start, so after the CNAME
//! is set the Deployment is rolled by stamping a pod-template annotation, the
//! same way `kubectl rollout restart` does.

use crate::cluster::ClusterApi;
use crate::config::{BootstrapConfig, DeploymentSelection};
use crate::constants::{dashboard_label_selector, RESTARTED_AT_ANNOTATION, RESTARTED_AT_FORMAT};
use crate::error::{BootstrapError, Result};
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use tracing::{info, warn};

/// Strategic merge patch that triggers a rollout.
pub fn restart_patch(now: DateTime<Utc>) -> serde_json::Value {
    let mut annotations = serde_json::Map::new();
    annotations.insert(
        RESTARTED_AT_ANNOTATION.to_string(),
        now.format(RESTARTED_AT_FORMAT).to_string().into(),
    );
    serde_json::json!({
        "spec": {
            "template": {
                "metadata": {
                    "annotations": annotations
                }
            }
        }
    })
}

/// Choose one Deployment out of a labelled listing.
pub fn select_deployment(
    deployments: &[Deployment],
    selection: DeploymentSelection,
) -> Option<String> {
    let chosen = match selection {
        DeploymentSelection::First => deployments.first(),
        DeploymentSelection::Last => deployments.last(),
    };
    chosen.map(|d| d.name_any())
}

/// Restarts the Dashboard Deployment, discovering its name on first use.
pub struct DashboardRestarter<'a> {
    cluster: &'a dyn ClusterApi,
    namespace: String,
    selection: DeploymentSelection,
    deployment_name: Option<String>,
}

impl<'a> DashboardRestarter<'a> {
    pub fn new(cluster: &'a dyn ClusterApi, config: &BootstrapConfig) -> Self {
        let configured = config.dashboard.deployment_name.trim();
        Self {
            cluster,
            namespace: config.namespace.clone(),
            selection: config.dashboard.selection,
            deployment_name: (!configured.is_empty()).then(|| configured.to_string()),
        }
    }

    /// Name of the Dashboard Deployment, listing by label if not yet known.
    pub async fn deployment_name(&mut self) -> Result<String> {
        if let Some(name) = &self.deployment_name {
            return Ok(name.clone());
        }

        let selector = dashboard_label_selector();
        let deployments = self
            .cluster
            .list_deployments(&self.namespace, &selector)
            .await?;
        if deployments.len() > 1 {
            warn!(
                "{} Deployments match {}, restarting the {:?} one",
                deployments.len(),
                selector,
                self.selection
            );
        }

        let name = select_deployment(&deployments, self.selection).ok_or_else(|| {
            BootstrapError::NotFound(format!(
                "Dashboard Deployment with label {} in namespace {}",
                selector, self.namespace
            ))
        })?;
        self.deployment_name = Some(name.clone());
        Ok(name)
    }

    /// Patch the Dashboard pod template so the Deployment rolls.
    pub async fn restart(&mut self) -> Result<()> {
        let name = self.deployment_name().await?;
        info!("Restarting Dashboard Deployment {}/{}", self.namespace, name);
        self.cluster
            .patch_deployment(&self.namespace, &name, restart_patch(Utc::now()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MockClusterApi;
    use crate::config::tests::test_config;
    use chrono::TimeZone;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn named(name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_restart_patch_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let patch = restart_patch(now);
        assert_eq!(
            patch["spec"]["template"]["metadata"]["annotations"]
                ["kubectl.kubernetes.io/restartedAt"],
            "20240309140507"
        );
    }

    #[test]
    fn test_select_deployment_policy() {
        let listed = vec![named("dashboard-a"), named("dashboard-b")];
        assert_eq!(
            select_deployment(&listed, DeploymentSelection::Last).as_deref(),
            Some("dashboard-b")
        );
        assert_eq!(
            select_deployment(&listed, DeploymentSelection::First).as_deref(),
            Some("dashboard-a")
        );
        assert_eq!(select_deployment(&[], DeploymentSelection::Last), None);
    }

    #[tokio::test]
    async fn test_configured_name_skips_listing() {
        let mut cluster = MockClusterApi::new();
        cluster.expect_list_deployments().never();
        cluster
            .expect_patch_deployment()
            .withf(|ns, name, _| ns == "tyk" && name == "my-dashboard")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut config = test_config();
        config.dashboard.deployment_name = "my-dashboard".to_string();
        let mut restarter = DashboardRestarter::new(&cluster, &config);
        restarter.restart().await.unwrap();
    }

    #[tokio::test]
    async fn test_two_matches_restarts_last_listed() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_list_deployments()
            .withf(|ns, selector| ns == "tyk" && selector == "tyk.tyk.io/k8s-bootstrap=tyk-dashboard")
            .times(1)
            .returning(|_, _| Ok(vec![named("dashboard-old"), named("dashboard-new")]));
        cluster
            .expect_patch_deployment()
            .withf(|_, name, patch| {
                name == "dashboard-new"
                    && patch["spec"]["template"]["metadata"]["annotations"]
                        .get("kubectl.kubernetes.io/restartedAt")
                        .is_some()
            })
            .times(2)
            .returning(|_, _, _| Ok(()));

        let config = test_config();
        let mut restarter = DashboardRestarter::new(&cluster, &config);
        restarter.restart().await.unwrap();
        // discovered name is cached for the rest of the run
        restarter.restart().await.unwrap();
    }

    #[tokio::test]
    async fn test_no_dashboard_deployment_is_error() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_list_deployments()
            .returning(|_, _| Ok(vec![]));
        cluster.expect_patch_deployment().never();

        let config = test_config();
        let mut restarter = DashboardRestarter::new(&cluster, &config);
        assert!(matches!(
            restarter.restart().await,
            Err(BootstrapError::NotFound(_))
        ));
    }
}
