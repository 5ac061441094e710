//! HTTP implementation of [`ControlPlane`]

use super::types::{
    admin_permissions, CnameRequest, CreateOrganisationRequest, CreateUserRequest,
    DashboardResponse, InitCatalogueRequest, Organisation, OrganisationList, PortalHomepage,
    ResetPasswordRequest, User, UserList,
};
use super::ControlPlane;
use crate::config::{AdminConfig, BootstrapConfig, OrgConfig};
use crate::constants::{
    ADMIN_AUTH_HEADER, API_ADMIN_ORGANISATIONS_ENDPOINT, API_ADMIN_USERS_ENDPOINT,
    API_PORTAL_CATALOGUE_ENDPOINT, API_PORTAL_CNAME_ENDPOINT, API_PORTAL_CONFIGURATION_ENDPOINT,
    API_PORTAL_PAGES_ENDPOINT, API_USERS_ENDPOINT, AUTHORIZATION_HEADER,
};
use crate::error::{BootstrapError, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use tracing::{debug, info};

/// Dashboard client sharing one HTTP connection pool across all calls
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
    admin_secret: String,
    admin: AdminConfig,
    org: OrgConfig,
}

impl DashboardClient {
    /// Build a client for the Dashboard named in `config`.
    ///
    /// TLS verification is disabled when `insecure_skip_verify` is set.
    pub fn new(config: &BootstrapConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.dashboard.insecure_skip_verify)
            .build()?;

        Ok(Self {
            http,
            base_url: config.dashboard.url.clone(),
            admin_secret: config.admin.secret.clone(),
            admin: config.admin.clone(),
            org: config.org.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Pass the response through if it is 200 OK, otherwise fail the step.
async fn expect_ok(step: &'static str, response: Response) -> Result<Response> {
    if response.status() == StatusCode::OK {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(BootstrapError::UnexpectedStatus { step, status, body })
}

async fn decode_envelope(response: Response) -> Result<DashboardResponse> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Whether a listed organisation is the configured one.
///
/// An explicit id wins; otherwise the owner name must match.
pub(crate) fn matches_org(org: &Organisation, config: &OrgConfig) -> bool {
    let id = config.id.trim();
    if !id.is_empty() {
        return org.id == id;
    }
    org.owner_name == config.name.trim()
}

fn meta_str<'a>(meta: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    meta.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl ControlPlane for DashboardClient {
    async fn find_organisation(&self) -> Result<Option<Organisation>> {
        debug!("Checking whether organisation {} exists", self.org.name);
        let response = self
            .http
            .get(self.url(API_ADMIN_ORGANISATIONS_ENDPOINT))
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;
        let response = expect_ok("Listing organisations", response).await?;

        let list: OrganisationList = serde_json::from_slice(&response.bytes().await?)?;
        Ok(list
            .organisations
            .into_iter()
            .find(|org| matches_org(org, &self.org)))
    }

    async fn create_organisation(&self) -> Result<String> {
        info!("Creating organisation {}", self.org.name);
        let body = CreateOrganisationRequest {
            id: self.org.id.trim().to_string(),
            owner_name: self.org.name.clone(),
            cname_enabled: true,
            cname: self.org.cname.clone(),
        };
        let response = self
            .http
            .post(self.url(API_ADMIN_ORGANISATIONS_ENDPOINT))
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .json(&body)
            .send()
            .await?;
        let response = expect_ok("Creating organisation", response).await?;
        let envelope = decode_envelope(response).await?;

        let org_id = envelope
            .meta
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(body.id);
        if org_id.is_empty() {
            return Err(BootstrapError::NotFound(
                "organisation id in Dashboard response".to_string(),
            ));
        }
        Ok(org_id)
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        debug!("Looking up user {}", email);
        let response = self
            .http
            .get(self.url(API_ADMIN_USERS_ENDPOINT))
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;
        let response = expect_ok("Listing users", response).await?;

        let list: UserList = serde_json::from_slice(&response.bytes().await?)?;
        Ok(list
            .into_users()
            .into_iter()
            .find(|u| u.email_address.eq_ignore_ascii_case(email.trim())))
    }

    async fn create_admin(&self, org_id: &str) -> Result<User> {
        info!("Creating admin user {}", self.admin.email);
        let body = CreateUserRequest {
            first_name: self.admin.first_name.clone(),
            last_name: self.admin.last_name.clone(),
            email_address: self.admin.email.clone(),
            org_id: org_id.to_string(),
            active: true,
            user_permissions: admin_permissions(),
        };
        let response = self
            .http
            .post(self.url(API_ADMIN_USERS_ENDPOINT))
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .json(&body)
            .send()
            .await?;
        let response = expect_ok("Creating admin user", response).await?;
        let envelope = decode_envelope(response).await?;

        let access_key = meta_str(&envelope.meta, "access_key")
            .unwrap_or(envelope.message.as_str())
            .to_string();
        let id = meta_str(&envelope.meta, "id")
            .map(str::to_string)
            .ok_or_else(|| BootstrapError::NotFound("user id in Dashboard response".to_string()))?;
        if access_key.is_empty() {
            return Err(BootstrapError::NotFound(
                "user access key in Dashboard response".to_string(),
            ));
        }

        info!("Setting password for admin user {}", self.admin.email);
        let reset = ResetPasswordRequest {
            new_password: self.admin.password.clone(),
            user_permissions: admin_permissions(),
        };
        let response = self
            .http
            .post(self.url(&format!("{}/{}/actions/reset", API_USERS_ENDPOINT, id)))
            .header(AUTHORIZATION_HEADER, &access_key)
            .json(&reset)
            .send()
            .await?;
        expect_ok("Setting admin password", response).await?;

        Ok(User {
            id,
            email_address: self.admin.email.clone(),
            access_key,
            org_id: org_id.to_string(),
        })
    }

    async fn create_portal_default_settings(&self, auth: &str) -> Result<()> {
        info!("Creating portal default settings");
        let response = self
            .http
            .put(self.url(API_PORTAL_CONFIGURATION_ENDPOINT))
            .header(AUTHORIZATION_HEADER, auth)
            .send()
            .await?;
        expect_ok("Creating portal default settings", response).await?;
        Ok(())
    }

    async fn initialise_catalogue(&self, auth: &str, org_id: &str) -> Result<()> {
        info!("Initialising catalogue");
        let response = self
            .http
            .post(self.url(API_PORTAL_CATALOGUE_ENDPOINT))
            .header(AUTHORIZATION_HEADER, auth)
            .json(&InitCatalogueRequest {
                org_id: org_id.to_string(),
            })
            .send()
            .await?;
        let response = expect_ok("Initialising catalogue", response).await?;
        decode_envelope(response).await?;
        Ok(())
    }

    async fn create_portal_homepage(&self, auth: &str) -> Result<()> {
        info!("Creating portal homepage");
        let response = self
            .http
            .post(self.url(API_PORTAL_PAGES_ENDPOINT))
            .header(AUTHORIZATION_HEADER, auth)
            .json(&PortalHomepage::default_homepage())
            .send()
            .await?;
        let response = expect_ok("Creating portal homepage", response).await?;
        decode_envelope(response).await?;
        Ok(())
    }

    async fn set_portal_cname(&self, auth: &str, cname: &str) -> Result<()> {
        info!("Setting portal cname to {}", cname);
        let response = self
            .http
            .put(self.url(API_PORTAL_CNAME_ENDPOINT))
            .header(AUTHORIZATION_HEADER, auth)
            .json(&CnameRequest {
                cname: cname.to_string(),
            })
            .send()
            .await?;
        expect_ok("Setting portal cname", response).await?;
        Ok(())
    }
}
