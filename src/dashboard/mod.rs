//! Tyk Dashboard API access
//!
//! [`ControlPlane`] lists every Dashboard call the bootstrap makes;
//! [`DashboardClient`] implements it over HTTP.

mod client;
mod types;

pub use client::DashboardClient;
pub use types::{
    admin_permissions, CnameRequest, CreateOrganisationRequest, CreateUserRequest,
    DashboardResponse, InitCatalogueRequest, Organisation, OrganisationList, PortalFields,
    PortalHomepage, ResetPasswordRequest, User, UserList,
};

use crate::error::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Calls made against the Dashboard.
///
/// Existence checks return `Ok(None)` when nothing matches; an `Err` is
/// always fatal to the run.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Look up the configured organisation
    async fn find_organisation(&self) -> Result<Option<Organisation>>;

    /// Create the configured organisation and return its id
    async fn create_organisation(&self) -> Result<String>;

    /// Look up a user by email address
    async fn find_user(&self, email: &str) -> Result<Option<User>>;

    /// Create the configured admin in `org_id` and set its password
    async fn create_admin(&self, org_id: &str) -> Result<User>;

    /// `PUT` the default portal configuration
    async fn create_portal_default_settings(&self, auth: &str) -> Result<()>;

    /// `POST` the catalogue for `org_id`
    async fn initialise_catalogue(&self, auth: &str, org_id: &str) -> Result<()>;

    /// `POST` the static homepage page
    async fn create_portal_homepage(&self, auth: &str) -> Result<()>;

    /// `PUT` the portal CNAME
    async fn set_portal_cname(&self, auth: &str, cname: &str) -> Result<()>;
}
