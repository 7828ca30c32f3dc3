pub mod api;
pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::api::handlers::AppState;
use crate::core::config::AppConfig;
use crate::core::{RateQuery, RefreshScheduler, RefreshService, SnapshotStore};
use crate::providers::FixerProvider;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{debug, info};

pub enum AppCommand {
    Refresh,
    Rates,
    Cross { from: String, to: String },
    Shell,
    Serve { bind: Option<String> },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("fxrates starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = store::open_store(&config)?;
    let query = RateQuery::new(Arc::clone(&store));

    match command {
        AppCommand::Rates => cli::rates::run(&query).await,
        AppCommand::Cross { from, to } => cli::cross::run(&query, &from, &to).await,
        AppCommand::Refresh => {
            let service = refresh_service(&config, store)?;
            cli::refresh::run(&service).await
        }
        AppCommand::Shell => {
            let service = Arc::new(refresh_service(&config, store)?);
            let mut scheduler = scheduler(&config, Arc::clone(&service)).spawn();

            let result = cli::shell::Shell::new(&service, &query, Some(&mut scheduler))
                .run(BufReader::new(tokio::io::stdin()), &mut std::io::stdout())
                .await;

            scheduler.shutdown().await;
            result
        }
        AppCommand::Serve { bind } => {
            let service = Arc::new(refresh_service(&config, store)?);
            let scheduler = scheduler(&config, Arc::clone(&service)).spawn();

            let state = Arc::new(AppState {
                refresh: service,
                query,
            });
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let result = api::serve(&bind, state, api::shutdown_signal()).await;

            scheduler.shutdown().await;
            result
        }
    }
}

/// Builds the refresh pipeline. Fails before anything runs when the API key is missing.
fn refresh_service(config: &AppConfig, store: Arc<dyn SnapshotStore>) -> Result<RefreshService> {
    let provider = FixerProvider::from_env(&config.provider.base_url, config.request_timeout())
        .context("Cannot create the exchange rate client")?;
    Ok(RefreshService::new(Arc::new(provider), store))
}

fn scheduler(config: &AppConfig, service: Arc<RefreshService>) -> RefreshScheduler {
    RefreshScheduler::new(service, config.refresh_interval(), config.initial_delay())
}
