//! Organisation and admin provisioning
//!
//! Each resource is looked up first and only created when absent. Existing
//! resources are used as found and never updated.

use crate::config::BootstrapConfig;
use crate::dashboard::{ControlPlane, User};
use crate::error::{BootstrapError, Result};
use tracing::info;

/// Organisation id and admin credential resolved for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub org_id: String,
    pub user_auth: String,
}

/// Return the id of the configured organisation, creating it if needed.
pub async fn ensure_organisation(dashboard: &dyn ControlPlane) -> Result<String> {
    match dashboard.find_organisation().await? {
        Some(org) => {
            info!("Organisation {} already exists, skipping creation", org.id);
            Ok(org.id)
        }
        None => {
            let id = dashboard.create_organisation().await?;
            info!("Created organisation {}", id);
            Ok(id)
        }
    }
}

/// Return the admin user for `email`, creating it in `org_id` if needed.
pub async fn ensure_admin(dashboard: &dyn ControlPlane, email: &str, org_id: &str) -> Result<User> {
    match dashboard.find_user(email).await? {
        Some(user) => {
            info!("Admin user {} already exists, skipping creation", email);
            Ok(user)
        }
        None => {
            let user = dashboard.create_admin(org_id).await?;
            info!("Created admin user {}", email);
            Ok(user)
        }
    }
}

/// Ensure both the organisation and its admin, returning what later steps need.
pub async fn ensure_identity(
    dashboard: &dyn ControlPlane,
    config: &BootstrapConfig,
) -> Result<Identity> {
    let org_id = ensure_organisation(dashboard).await?;
    let admin = ensure_admin(dashboard, &config.admin.email, &org_id).await?;

    if admin.access_key.is_empty() {
        return Err(BootstrapError::NotFound(format!(
            "access key for admin user {}",
            config.admin.email
        )));
    }

    Ok(Identity {
        org_id,
        user_auth: admin.access_key,
    })
}
