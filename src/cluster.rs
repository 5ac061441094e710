//! Kubernetes operations used by the bootstrap job
//!
//! The [`ClusterApi`] trait is the seam between the bootstrap steps and the
//! API server, so the steps can be exercised against a mock in tests.

use crate::error::{BootstrapError, Result};
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::{Client, ResourceExt};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting the Kubernetes calls the job makes
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List Deployments in a namespace, optionally filtered by label selector.
    ///
    /// An empty selector lists every Deployment. Items are returned in the
    /// order the API server produced them.
    async fn list_deployments(&self, namespace: &str, label_selector: &str)
        -> Result<Vec<Deployment>>;

    /// Apply a strategic merge patch to a Deployment
    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<()>;

    /// Names of all Secrets in a namespace
    async fn list_secret_names(&self, namespace: &str) -> Result<Vec<String>>;

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()>;

    async fn create_secret(&self, namespace: &str, secret: Secret) -> Result<()>;
}

/// [`ClusterApi`] backed by a live `kube::Client`
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_deployments(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Deployment>> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let mut params = ListParams::default();
        if !label_selector.is_empty() {
            params = params.labels(label_selector);
        }

        let list = deployments.list(&params).await.map_err(|e| {
            BootstrapError::kube(
                format!("failed to list Deployments in namespace {}", namespace),
                e,
            )
        })?;
        debug!(
            "Listed {} Deployments in {} (selector: {:?})",
            list.items.len(),
            namespace,
            label_selector
        );
        Ok(list.items)
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: serde_json::Value,
    ) -> Result<()> {
        let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        deployments
            .patch(name, &PatchParams::default(), &Patch::Strategic(&patch))
            .await
            .map_err(|e| {
                BootstrapError::kube(
                    format!("failed to patch Deployment {}/{}", namespace, name),
                    e,
                )
            })?;
        Ok(())
    }

    async fn list_secret_names(&self, namespace: &str) -> Result<Vec<String>> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let list = secrets.list(&ListParams::default()).await.map_err(|e| {
            BootstrapError::kube(
                format!("failed to list Secrets in namespace {}", namespace),
                e,
            )
        })?;
        Ok(list.items.iter().map(|s| s.name_any()).collect())
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        secrets
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| {
                BootstrapError::kube(format!("failed to delete Secret {}/{}", namespace, name), e)
            })?;
        Ok(())
    }

    async fn create_secret(&self, namespace: &str, secret: Secret) -> Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let name = secret.name_any();
        secrets
            .create(&PostParams::default(), &secret)
            .await
            .map_err(|e| {
                BootstrapError::kube(format!("failed to create Secret {}/{}", namespace, name), e)
            })?;
        Ok(())
    }
}
