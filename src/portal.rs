//! Classic developer portal bootstrap
//!
//! Four Dashboard calls in a fixed order, each depending on the previous one:
//! default settings, catalogue, homepage, CNAME. The Dashboard is restarted
//! once the CNAME is set. A failing step stops the sequence; earlier steps
//! are not undone.

use crate::dashboard::ControlPlane;
use crate::error::Result;
use crate::provision::Identity;
use crate::restart::DashboardRestarter;
use tracing::info;

pub async fn bootstrap_portal(
    dashboard: &dyn ControlPlane,
    restarter: &mut DashboardRestarter<'_>,
    identity: &Identity,
    cname: &str,
) -> Result<()> {
    info!("Bootstrapping developer portal for organisation {}", identity.org_id);

    dashboard
        .create_portal_default_settings(&identity.user_auth)
        .await?;
    dashboard
        .initialise_catalogue(&identity.user_auth, &identity.org_id)
        .await?;
    dashboard.create_portal_homepage(&identity.user_auth).await?;
    dashboard
        .set_portal_cname(&identity.user_auth, cname)
        .await?;

    // the Dashboard reads the cname at startup
    restarter.restart().await?;

    info!("Developer portal bootstrapped");
    Ok(())
}
