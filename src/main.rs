use anyhow::{bail, Context};
use clap::Parser;
use kachaka_fleet_adapter::{create_router, logging, AppState, Config, DeliveryRelay, RobotApi};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Delivery relay and command bridge between the fleet manager and kachaka robots.
#[derive(Debug, Parser)]
#[command(name = "fleet_adapter")]
struct Args {
    /// Path to the config.yaml file
    #[arg(short = 'c', long = "config_file")]
    config_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _guard = logging::init();

    let config = Config::load(&args.config_file)
        .with_context(|| format!("loading {}", args.config_file.display()))?;
    info!(fleet = %config.rmf_fleet.name, prefix = %config.fleet_manager.prefix, "fleet name is {}", config.rmf_fleet.name);

    let api = Arc::new(RobotApi::from_config(&config).context("building HTTP client")?);
    if !api.check_connection().await {
        error!(prefix = %api.prefix(), "Unable to connect to the robot API");
        bail!("robot API at {} is unreachable", api.prefix());
    }

    let shutdown = CancellationToken::new();
    let relay = Arc::new(DeliveryRelay::new(&config, api.clone(), shutdown.clone()));
    let address = config.server.address.clone();

    let state = Arc::new(AppState { config, api, relay });
    let app = create_router(state);

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
            info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;
    info!("Delivery node is ready on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("serving ingress")?;

    Ok(())
}
