//! Tyk bootstrap job
//!
//! Runs once as a Helm hook and exits.
//!
//! ## Usage
//!
//! ```bash
//! # Validate the Dashboard license before installing
//! TYK_DASHBOARD_LICENSE=... tyk-bootstrap pre-install
//!
//! # Create the organisation, admin, portal and Secrets after install
//! tyk-bootstrap post-install --dashboard-url http://dashboard-svc-tyk.tyk.svc:3000
//!
//! # Run with custom log level
//! RUST_LOG=debug tyk-bootstrap post-install
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use kube::Client;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tyk_bootstrap::license::validate_license;
use tyk_bootstrap::{Bootstrap, BootstrapConfig, DashboardClient, KubeCluster};

/// Tyk bootstrap job
#[derive(Parser, Debug)]
#[command(name = "tyk-bootstrap")]
#[command(version, about = "Bootstraps a Tyk Dashboard installation on Kubernetes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the Dashboard license before the chart is installed
    PreInstall(LicenseArgs),
    /// Provision organisation, admin, portal and operator Secrets
    PostInstall(BootstrapConfig),
}

#[derive(Args, Debug)]
struct LicenseArgs {
    #[arg(long, env = "TYK_DASHBOARD_LICENSE", hide_env_values = true, default_value = "")]
    license: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Bootstrap failed: {:#}", e);
            println!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::PreInstall(args) => {
            let expires_at = validate_license(&args.license, chrono::Utc::now())?;
            info!("License valid until {}", expires_at.to_rfc3339());
            println!("Pre-Hook bootstrapping succeeded, the provided license is valid!");
        }
        Command::PostInstall(config) => {
            let config = config.finalize()?;
            info!("Starting Tyk bootstrap in namespace {}", config.namespace);

            let client = Client::try_default()
                .await
                .context("failed to create Kubernetes client")?;
            let cluster = KubeCluster::new(client);
            let dashboard = DashboardClient::new(&config)?;

            Bootstrap::new(&config, &cluster, &dashboard).run().await?;
        }
    }
    Ok(())
}
