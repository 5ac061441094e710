//! Bootstrap run
//!
//! Sequences every step of the job. The first error ends the run; a rerun is
//! safe because each step checks for existing state before creating it.

use crate::cluster::ClusterApi;
use crate::config::BootstrapConfig;
use crate::dashboard::ControlPlane;
use crate::error::Result;
use crate::portal::bootstrap_portal;
use crate::provision::{ensure_identity, Identity};
use crate::readiness::wait_for_deployments;
use crate::restart::DashboardRestarter;
use crate::secrets::{operator_secret_data, portal_secret_data, SecretProvisioner};
use tracing::info;

pub struct Bootstrap<'a> {
    config: &'a BootstrapConfig,
    cluster: &'a dyn ClusterApi,
    dashboard: &'a dyn ControlPlane,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        config: &'a BootstrapConfig,
        cluster: &'a dyn ClusterApi,
        dashboard: &'a dyn ControlPlane,
    ) -> Self {
        Self {
            config,
            cluster,
            dashboard,
        }
    }

    /// Run every step once, in order.
    pub async fn run(&self) -> Result<Identity> {
        let config = self.config;

        wait_for_deployments(self.cluster, &config.namespace, &config.readiness).await?;

        let identity = ensure_identity(self.dashboard, config).await?;

        if config.bootstrap_portal {
            let mut restarter = DashboardRestarter::new(self.cluster, config);
            bootstrap_portal(self.dashboard, &mut restarter, &identity, &config.org.cname).await?;
        } else {
            info!("Portal bootstrap disabled, skipping");
        }

        let secrets = SecretProvisioner::new(self.cluster, &config.namespace);

        match config.secrets.operator_secret() {
            Some(name) => {
                info!("Bootstrapping operator Secret {}", name);
                secrets
                    .upsert(name, operator_secret_data(&identity, &config.dashboard.url))
                    .await?;
            }
            None => info!("Operator Secret disabled, skipping"),
        }

        match config.secrets.portal_secret() {
            Some(name) => {
                info!("Bootstrapping portal Secret {}", name);
                secrets.upsert(name, portal_secret_data(&identity)).await?;
            }
            None => info!("Portal Secret disabled, skipping"),
        }

        info!("Bootstrap finished");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MockClusterApi;
    use crate::config::tests::test_config;
    use crate::constants::dashboard_label_selector;
    use crate::dashboard::{MockControlPlane, Organisation, User};
    use crate::error::BootstrapError;
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use mockall::Sequence;

    fn ready(name: &str) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                ready_replicas: Some(1),
                ..Default::default()
            }),
        }
    }

    fn new_admin() -> User {
        User {
            id: "u-new".to_string(),
            email_address: "admin@example.com".to_string(),
            access_key: "key-new".to_string(),
            org_id: "org-new".to_string(),
        }
    }

    fn secret_value(secret: &k8s_openapi::api::core::v1::Secret, key: &str) -> String {
        let data = secret.data.as_ref().unwrap();
        String::from_utf8(data[key].0.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_install_call_order() {
        let mut seq = Sequence::new();
        let mut cluster = MockClusterApi::new();
        let mut dashboard = MockControlPlane::new();

        cluster
            .expect_list_deployments()
            .withf(|ns, selector| ns == "tyk" && selector.is_empty())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![ready("tyk-dashboard"), ready("tyk-gateway")]));
        dashboard
            .expect_find_organisation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(None));
        dashboard
            .expect_create_organisation()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok("org-new".to_string()));
        dashboard
            .expect_find_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));
        dashboard
            .expect_create_admin()
            .withf(|org| org == "org-new")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(new_admin()));
        dashboard
            .expect_create_portal_default_settings()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        dashboard
            .expect_initialise_catalogue()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        dashboard
            .expect_create_portal_homepage()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        dashboard
            .expect_set_portal_cname()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        cluster
            .expect_list_deployments()
            .withf(|_, selector| selector == dashboard_label_selector())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![ready("tyk-dashboard")]));
        cluster
            .expect_patch_deployment()
            .withf(|_, name, _| name == "tyk-dashboard")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        // operator secret: present, so deleted then recreated
        cluster
            .expect_list_secret_names()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["tyk-operator-conf".to_string()]));
        cluster
            .expect_delete_secret()
            .withf(|_, name| name == "tyk-operator-conf")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        cluster
            .expect_create_secret()
            .withf(|_, s| {
                s.metadata.name.as_deref() == Some("tyk-operator-conf")
                    && secret_value(s, "TYK_AUTH") == "key-new"
                    && secret_value(s, "TYK_ORG") == "org-new"
                    && secret_value(s, "TYK_MODE") == "pro"
                    && secret_value(s, "TYK_URL") == "http://dashboard-svc.tyk.svc:3000"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        // portal secret: absent, so only created
        cluster
            .expect_list_secret_names()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["tyk-operator-conf".to_string()]));
        cluster
            .expect_create_secret()
            .withf(|_, s| s.metadata.name.as_deref() == Some("tyk-portal-conf"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let config = test_config();
        let identity = Bootstrap::new(&config, &cluster, &dashboard)
            .run()
            .await
            .unwrap();
        assert_eq!(
            identity,
            Identity {
                org_id: "org-new".to_string(),
                user_auth: "key-new".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_readiness_failure_makes_no_other_calls() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_list_deployments()
            .returning(|_, _| Err(BootstrapError::NotReady("tyk-dashboard".to_string())));
        cluster.expect_list_secret_names().never();
        cluster.expect_create_secret().never();
        cluster.expect_patch_deployment().never();

        let mut dashboard = MockControlPlane::new();
        dashboard.expect_find_organisation().never();
        dashboard.expect_find_user().never();
        dashboard.expect_create_portal_default_settings().never();

        let config = test_config();
        let err = Bootstrap::new(&config, &cluster, &dashboard)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_readiness_bound_exhausted() {
        let mut cluster = MockClusterApi::new();
        cluster.expect_list_deployments().times(2).returning(|_, _| {
            let mut deployment = ready("tyk-dashboard");
            deployment.status = Some(DeploymentStatus {
                ready_replicas: Some(0),
                ..Default::default()
            });
            Ok(vec![deployment])
        });
        cluster.expect_list_secret_names().never();
        cluster.expect_delete_secret().never();
        cluster.expect_create_secret().never();
        cluster.expect_patch_deployment().never();

        let mut dashboard = MockControlPlane::new();
        dashboard.expect_find_organisation().never();
        dashboard.expect_create_organisation().never();
        dashboard.expect_find_user().never();
        dashboard.expect_create_admin().never();
        dashboard.expect_create_portal_default_settings().never();
        dashboard.expect_initialise_catalogue().never();
        dashboard.expect_create_portal_homepage().never();
        dashboard.expect_set_portal_cname().never();

        let mut config = test_config();
        config.readiness.max_attempts = 2;
        config.readiness.interval_secs = 0;
        let err = Bootstrap::new(&config, &cluster, &dashboard)
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::NotReady(_)));
    }

    #[tokio::test]
    async fn test_rerun_with_existing_state() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_list_deployments()
            .returning(|_, _| Ok(vec![ready("tyk-dashboard")]));
        cluster.expect_patch_deployment().never();
        cluster
            .expect_list_secret_names()
            .times(1)
            .returning(|_| Ok(vec!["tyk-operator-conf".to_string()]));
        cluster
            .expect_delete_secret()
            .times(1)
            .returning(|_, _| Ok(()));
        cluster
            .expect_create_secret()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut dashboard = MockControlPlane::new();
        dashboard.expect_find_organisation().returning(|| {
            Ok(Some(Organisation {
                id: "org-1".to_string(),
                owner_name: "Acme".to_string(),
                cname: "portal.acme.test".to_string(),
            }))
        });
        dashboard.expect_create_organisation().never();
        dashboard.expect_find_user().returning(|_| {
            Ok(Some(User {
                access_key: "key-1".to_string(),
                ..Default::default()
            }))
        });
        dashboard.expect_create_admin().never();

        let mut config = test_config();
        config.bootstrap_portal = false;
        config.secrets.portal_secret_name = String::new();

        let identity = Bootstrap::new(&config, &cluster, &dashboard)
            .run()
            .await
            .unwrap();
        assert_eq!(identity.org_id, "org-1");
        assert_eq!(identity.user_auth, "key-1");
    }

    #[tokio::test]
    async fn test_secret_failure_is_fatal() {
        let mut cluster = MockClusterApi::new();
        cluster
            .expect_list_deployments()
            .returning(|_, _| Ok(vec![ready("tyk-dashboard")]));
        cluster
            .expect_list_secret_names()
            .times(1)
            .returning(|_| Ok(vec![]));
        cluster
            .expect_create_secret()
            .times(1)
            .returning(|_, _| Err(BootstrapError::NotFound("namespace tyk".to_string())));

        let mut dashboard = MockControlPlane::new();
        dashboard.expect_find_organisation().returning(|| {
            Ok(Some(Organisation {
                id: "org-1".to_string(),
                ..Default::default()
            }))
        });
        dashboard.expect_find_user().returning(|_| {
            Ok(Some(User {
                access_key: "key-1".to_string(),
                ..Default::default()
            }))
        });

        let mut config = test_config();
        config.bootstrap_portal = false;

        // portal secret stage never starts once the operator secret fails
        assert!(Bootstrap::new(&config, &cluster, &dashboard)
            .run()
            .await
            .is_err());
    }
}
