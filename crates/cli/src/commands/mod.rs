pub mod ask;
pub mod bot;
pub mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use netsleuth_agent::{OpenAiPlanner, SessionOrchestrator};
use netsleuth_core::config::{AppConfig, LoadOptions};
use netsleuth_core::ToolRegistry;
use netsleuth_device::{DeviceGateway, SshProcessConnector};

pub(crate) fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig> {
    // An explicitly named file must exist; otherwise fall back to the
    // default search path and environment.
    let require_file = config_path.is_some();
    Ok(AppConfig::load(LoadOptions { config_path, require_file })?)
}

pub(crate) fn init_logging(config: &AppConfig) {
    use netsleuth_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub(crate) fn build_orchestrator(config: &AppConfig) -> Result<SessionOrchestrator> {
    let connector = SshProcessConnector::new(config.device.clone())?;
    let gateway = Arc::new(DeviceGateway::new(
        Arc::new(connector),
        Duration::from_secs(config.device.read_timeout_secs),
    ));
    let planner =
        OpenAiPlanner::new(&config.llm, &config.device.name, config.budgets.max_tool_calls)?;
    let registry = ToolRegistry::for_device(&config.device.name);

    Ok(SessionOrchestrator::new(Arc::new(planner), gateway, registry, config.budgets))
}
