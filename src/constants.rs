//! Fixed names shared across the bootstrap steps
//!
//! Dashboard endpoints, HTTP header names, Kubernetes labels and the keys
//! written into the generated Secrets.

// Dashboard admin API
pub const API_ADMIN_ORGANISATIONS_ENDPOINT: &str = "/admin/organisations";
pub const API_ADMIN_USERS_ENDPOINT: &str = "/admin/users";

// Dashboard user API
pub const API_USERS_ENDPOINT: &str = "/api/users";
pub const API_PORTAL_CONFIGURATION_ENDPOINT: &str = "/api/portal/configuration";
pub const API_PORTAL_CATALOGUE_ENDPOINT: &str = "/api/portal/catalogue";
pub const API_PORTAL_PAGES_ENDPOINT: &str = "/api/portal/pages";
pub const API_PORTAL_CNAME_ENDPOINT: &str = "/api/portal/cname";

// Headers
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const ADMIN_AUTH_HEADER: &str = "admin-auth";

// Dashboard deployment discovery
pub const BOOTSTRAP_LABEL: &str = "tyk.tyk.io/k8s-bootstrap";
pub const BOOTSTRAP_DASHBOARD_DEPLOY_LABEL: &str = "tyk-dashboard";
pub const RESTARTED_AT_ANNOTATION: &str = "kubectl.kubernetes.io/restartedAt";
pub const RESTARTED_AT_FORMAT: &str = "%Y%m%d%H%M%S";

// Secret keys
pub const SECRET_KEY_AUTH: &str = "TYK_AUTH";
pub const SECRET_KEY_ORG: &str = "TYK_ORG";
pub const SECRET_KEY_MODE: &str = "TYK_MODE";
pub const SECRET_KEY_URL: &str = "TYK_URL";
pub const OPERATOR_MODE_PRO: &str = "pro";

pub const SERVICE_ACCOUNT_NAMESPACE_FILE: &str =
    "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Label selector matching the dashboard Deployment.
pub fn dashboard_label_selector() -> String {
    format!("{}={}", BOOTSTRAP_LABEL, BOOTSTRAP_DASHBOARD_DEPLOY_LABEL)
}
