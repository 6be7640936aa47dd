mod config;
mod db;
mod error;
mod geocode;
mod http;
mod models;
mod processor;
mod provider;

use anyhow::Context;
use config::AppConfig;
use geocode::GeocodeClient;
use processor::reconciler::Reconciler;
use provider::OutageMapClient;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Load config
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting outage tracker for {:?}...", config.service.service_areas);

    let mut reconciler = match build(&config).await {
        Ok(reconciler) => reconciler,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            eprintln!("startup failed: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match reconciler.run_cycle().await {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = e.kind(), "Cycle failed: {}", e);
            eprintln!("cycle failed [{}]: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

async fn build(
    config: &AppConfig,
) -> anyhow::Result<Reconciler<OutageMapClient, GeocodeClient>> {
    // Init DB
    let pool = db::init_pool(&config.database_url)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    info!("Connected to database");

    let http = http::build_client(config.http_timeout).context("building HTTP client")?;

    Ok(Reconciler::new(
        config.service.clone(),
        OutageMapClient::new(http.clone(), config),
        GeocodeClient::new(http, config),
        db::Store::new(pool),
        config.geocode_interval,
    ))
}
