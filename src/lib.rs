//! Tyk bootstrap
//!
//! A one-shot job that prepares a freshly installed Tyk Dashboard:
//!
//! - waits for the Dashboard Deployments to become ready
//! - ensures the organisation and its admin user exist
//! - optionally bootstraps the classic developer portal and restarts the
//!   Dashboard so the portal CNAME takes effect
//! - rotates the operator and portal credential Secrets
//!
//! Existing organisations and users are reused, never modified, so the job
//! can be rerun safely.

pub mod bootstrap;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod license;
pub mod portal;
pub mod provision;
pub mod readiness;
pub mod restart;
pub mod secrets;

pub use bootstrap::Bootstrap;
pub use cluster::{ClusterApi, KubeCluster};
pub use config::{BootstrapConfig, DeploymentSelection};
pub use dashboard::{ControlPlane, DashboardClient};
pub use error::{BootstrapError, Result};
pub use provision::Identity;
pub use secrets::SecretProvisioner;
