use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use hostpulse::api::{self, AppState};
use hostpulse::config::{Cli, MonitorConfig};
use hostpulse::{shutdown, HttpProbe, MonitorSupervisor, StatusTable, UpdateBroadcaster};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::INFO.into()))
        .with_ansi(true)
        .init();

    let cli = Cli::parse();
    let config = MonitorConfig::from_cli(&cli)?;

    info!("Starting host monitoring service...");

    let listener = api::bind(config.port).await?;
    let prober = Arc::new(HttpProbe::new(config.probe_timeout)?);
    let table = StatusTable::new();

    let supervisor = MonitorSupervisor::start(&config.hosts, config.interval, table.clone(), prober)
        .await
        .context("Failed to start host monitors")?;

    let (trigger, shutdown) = shutdown::channel();
    let broadcaster = UpdateBroadcaster::new(table.clone(), config.broadcast_interval, shutdown.clone());
    let app = api::create_router(AppState { table, broadcaster }, &config.public_dir);

    info!(
        "Monitoring {} hosts (Interval: {}ms, Port: {})",
        supervisor.len(),
        config.interval.as_millis(),
        config.port
    );

    let server = tokio::spawn(api::start_server(listener, app, shutdown));

    signal::ctrl_c().await?;
    info!("Shutdown signal received. Closing dashboard...");

    trigger.trigger();
    supervisor.shutdown().await;
    match server.await {
        Ok(Err(e)) => error!("{}", e),
        Err(e) => error!("Dashboard task failed: {}", e),
        Ok(Ok(())) => {}
    }

    Ok(())
}
