pub mod cli;
pub mod core;
pub mod presenter;
pub mod providers;
pub mod service;
pub mod store;

use crate::core::config::AppConfig;
use crate::providers::ErApiRateSource;
use crate::service::RateCacheService;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Rates { filter: Option<String> },
    Favorite { code: String },
    Convert { code: String, amount: String },
    Resume,
}

/// Wires the configured rate source and store into a cache service.
pub fn build_service(config: &AppConfig) -> RateCacheService {
    let source = ErApiRateSource::from_config(&config.providers.er_api);
    let store = store::open(config);
    RateCacheService::new(Arc::new(source), store)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = AppConfig::load_or_default(config_path)?;
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config);

    match command {
        AppCommand::Rates { filter } => cli::rates::run(&service, filter.as_deref()).await,
        AppCommand::Favorite { code } => cli::rates::toggle_favorite(&service, &code).await,
        AppCommand::Convert { code, amount } => cli::convert::run(&service, &code, &amount).await,
        AppCommand::Resume => cli::convert::resume(&service).await,
    }
}
