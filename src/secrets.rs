//! Operator and portal credential Secrets
//!
//! Both Secrets are rotated on every run: any existing instance is deleted
//! and a fresh one created. The two calls are not atomic; a failure between
//! them leaves the Secret absent until the job runs again.

use crate::cluster::ClusterApi;
use crate::constants::{
    OPERATOR_MODE_PRO, SECRET_KEY_AUTH, SECRET_KEY_MODE, SECRET_KEY_ORG, SECRET_KEY_URL,
};
use crate::error::Result;
use crate::provision::Identity;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use std::collections::BTreeMap;
use tracing::info;

pub type SecretData = BTreeMap<String, ByteString>;

fn bytes(value: &str) -> ByteString {
    ByteString(value.as_bytes().to_vec())
}

/// Credentials for the Tyk Operator.
pub fn operator_secret_data(identity: &Identity, dashboard_url: &str) -> SecretData {
    BTreeMap::from([
        (SECRET_KEY_AUTH.to_string(), bytes(&identity.user_auth)),
        (SECRET_KEY_ORG.to_string(), bytes(&identity.org_id)),
        (SECRET_KEY_MODE.to_string(), bytes(OPERATOR_MODE_PRO)),
        (SECRET_KEY_URL.to_string(), bytes(dashboard_url)),
    ])
}

/// Credentials for the developer portal.
pub fn portal_secret_data(identity: &Identity) -> SecretData {
    BTreeMap::from([
        (SECRET_KEY_AUTH.to_string(), bytes(&identity.user_auth)),
        (SECRET_KEY_ORG.to_string(), bytes(&identity.org_id)),
    ])
}

pub fn build_secret(name: &str, namespace: &str, data: SecretData) -> Secret {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        "tyk-bootstrap".to_string(),
    );

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(labels),
            ..Default::default()
        },
        data: Some(data),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

/// Creates Secrets in one namespace, replacing any previous instance.
pub struct SecretProvisioner<'a> {
    cluster: &'a dyn ClusterApi,
    namespace: String,
}

impl<'a> SecretProvisioner<'a> {
    pub fn new(cluster: &'a dyn ClusterApi, namespace: &str) -> Self {
        Self {
            cluster,
            namespace: namespace.to_string(),
        }
    }

    /// Make `name` hold exactly `data`.
    ///
    /// Lists the namespace, deletes a Secret called `name` if one exists, then
    /// creates it anew.
    pub async fn upsert(&self, name: &str, data: SecretData) -> Result<()> {
        let existing = self.cluster.list_secret_names(&self.namespace).await?;
        if existing.iter().any(|n| n == name) {
            self.cluster.delete_secret(&self.namespace, name).await?;
            info!(
                "A previously created Secret {}/{} was found and deleted",
                self.namespace, name
            );
        }

        self.cluster
            .create_secret(&self.namespace, build_secret(name, &self.namespace, data))
            .await?;
        info!("Created Secret {}/{}", self.namespace, name);
        Ok(())
    }
}
