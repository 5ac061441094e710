//! Bootstrap configuration
//!
//! Every setting can be given as a command line flag or through the
//! environment variable the Helm chart injects. The value is built once in
//! `main`, finalized, and then passed by reference to every step.

use crate::constants::SERVICE_ACCOUNT_NAMESPACE_FILE;
use crate::error::{BootstrapError, Result};
use clap::{ArgAction, Args, ValueEnum};
use std::time::Duration;

/// Which Deployment to restart when several carry the dashboard label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DeploymentSelection {
    /// First Deployment in listing order
    First,
    /// Last Deployment in listing order
    #[default]
    Last,
}

/// Initial admin user
#[derive(Args, Debug, Clone)]
pub struct AdminConfig {
    #[arg(long = "admin-first-name", env = "TYK_ADMIN_FIRST_NAME", default_value = "")]
    pub first_name: String,

    #[arg(long = "admin-last-name", env = "TYK_ADMIN_LAST_NAME", default_value = "")]
    pub last_name: String,

    #[arg(long = "admin-email", env = "TYK_ADMIN_EMAIL")]
    pub email: String,

    #[arg(long = "admin-password", env = "TYK_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Dashboard admin secret, sent in the `admin-auth` header
    #[arg(long = "admin-secret", env = "TYK_ADMIN_SECRET", hide_env_values = true)]
    pub secret: String,
}

/// Organisation to ensure
#[derive(Args, Debug, Clone)]
pub struct OrgConfig {
    #[arg(long = "org-name", env = "TYK_ORG_NAME", default_value = "")]
    pub name: String,

    #[arg(long = "org-cname", env = "TYK_ORG_CNAME", default_value = "")]
    pub cname: String,

    /// Explicit organisation id; generated by the Dashboard when empty
    #[arg(long = "org-id", env = "TYK_ORG_ID", default_value = "")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the Dashboard service
    #[arg(long = "dashboard-url", env = "TYK_DASHBOARD_URL")]
    pub url: String,

    /// Skip TLS certificate verification for the Dashboard
    #[arg(long, env = "TYK_DASHBOARD_INSECURE_SKIP_VERIFY")]
    pub insecure_skip_verify: bool,

    /// Dashboard Deployment to restart; discovered by label when empty
    #[arg(long = "dashboard-deployment", env = "TYK_DASHBOARD_DEPLOY", default_value = "")]
    pub deployment_name: String,

    #[arg(
        long = "dashboard-selection",
        env = "TYK_DASHBOARD_DEPLOY_SELECTION",
        value_enum,
        default_value_t = DeploymentSelection::Last
    )]
    pub selection: DeploymentSelection,
}

#[derive(Args, Debug, Clone)]
pub struct ReadinessConfig {
    /// Label selector for the Deployments to wait on (all when empty)
    #[arg(long = "readiness-selector", env = "READINESS_LABEL_SELECTOR", default_value = "")]
    pub label_selector: String,

    #[arg(long = "readiness-attempts", env = "READINESS_ATTEMPTS", default_value_t = 60)]
    pub max_attempts: u32,

    #[arg(long = "readiness-interval-secs", env = "READINESS_INTERVAL_SECS", default_value_t = 5)]
    pub interval_secs: u64,
}

impl ReadinessConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Args, Debug, Clone)]
pub struct SecretsConfig {
    #[arg(long = "operator-secret-name", env = "OPERATOR_SECRET_NAME", default_value = "")]
    pub operator_secret_name: String,

    #[arg(
        long = "operator-secret-enabled",
        env = "OPERATOR_SECRET_ENABLED",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub operator_secret_enabled: bool,

    #[arg(
        long = "portal-secret-name",
        env = "DEVELOPER_PORTAL_SECRET_NAME",
        default_value = ""
    )]
    pub portal_secret_name: String,

    #[arg(
        long = "portal-secret-enabled",
        env = "DEVELOPER_PORTAL_SECRET_ENABLED",
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub portal_secret_enabled: bool,
}

impl SecretsConfig {
    /// Name of the operator Secret, if that stage should run.
    pub fn operator_secret(&self) -> Option<&str> {
        enabled_name(self.operator_secret_enabled, &self.operator_secret_name)
    }

    /// Name of the portal Secret, if that stage should run.
    pub fn portal_secret(&self) -> Option<&str> {
        enabled_name(self.portal_secret_enabled, &self.portal_secret_name)
    }
}

fn enabled_name(enabled: bool, name: &str) -> Option<&str> {
    let name = name.trim();
    (enabled && !name.is_empty()).then_some(name)
}

/// Complete configuration for one bootstrap run
#[derive(Args, Debug, Clone)]
pub struct BootstrapConfig {
    #[command(flatten)]
    pub admin: AdminConfig,

    #[command(flatten)]
    pub org: OrgConfig,

    #[command(flatten)]
    pub dashboard: DashboardConfig,

    #[command(flatten)]
    pub readiness: ReadinessConfig,

    #[command(flatten)]
    pub secrets: SecretsConfig,

    /// Release namespace (auto-detected if empty)
    #[arg(long, env = "TYK_POD_NAMESPACE", default_value = "")]
    pub namespace: String,

    /// Configure the classic developer portal
    #[arg(long, env = "BOOTSTRAP_PORTAL")]
    pub bootstrap_portal: bool,
}

impl BootstrapConfig {
    /// Validate required fields and normalize derived ones.
    ///
    /// Strips trailing slashes from the Dashboard URL and resolves an empty
    /// namespace from the service account.
    pub fn finalize(mut self) -> Result<Self> {
        self.dashboard.url = self.dashboard.url.trim().trim_end_matches('/').to_string();
        if self.dashboard.url.is_empty() {
            return Err(BootstrapError::Configuration(
                "Dashboard URL must be set".to_string(),
            ));
        }
        if !self.dashboard.url.starts_with("http://") && !self.dashboard.url.starts_with("https://")
        {
            return Err(BootstrapError::Configuration(format!(
                "Dashboard URL {} must start with http:// or https://",
                self.dashboard.url
            )));
        }
        if self.admin.email.trim().is_empty() {
            return Err(BootstrapError::Configuration(
                "admin email must be set".to_string(),
            ));
        }
        if self.admin.secret.is_empty() {
            return Err(BootstrapError::Configuration(
                "admin secret must be set".to_string(),
            ));
        }
        if self.org.name.trim().is_empty() && self.org.id.trim().is_empty() {
            return Err(BootstrapError::Configuration(
                "organisation name or id must be set".to_string(),
            ));
        }
        if self.bootstrap_portal && self.org.cname.trim().is_empty() {
            return Err(BootstrapError::Configuration(
                "organisation cname is required to bootstrap the portal".to_string(),
            ));
        }
        if self.readiness.max_attempts == 0 {
            return Err(BootstrapError::Configuration(
                "readiness attempts must be at least 1".to_string(),
            ));
        }

        self.namespace = detect_namespace(&self.namespace);
        Ok(self)
    }
}

/// Detects the release namespace.
///
/// Priority: explicit argument → service account file → `"default"`.
pub fn detect_namespace(explicit: &str) -> String {
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    std::fs::read_to_string(SERVICE_ACCOUNT_NAMESPACE_FILE)
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "default".to_string())
}
