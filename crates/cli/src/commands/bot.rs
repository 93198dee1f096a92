use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use netsleuth_telegram::{BotRunner, TelegramClient};

use super::{build_orchestrator, init_logging, load_config};

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    init_logging(&config);

    let token = config.telegram.bot_token.clone().context(
        "telegram.bot_token is not configured (set NETSLEUTH_TELEGRAM_BOT_TOKEN or [telegram] bot_token)",
    )?;

    let orchestrator = Arc::new(build_orchestrator(&config)?);
    let client = TelegramClient::new(token, config.telegram.poll_timeout_secs)?;
    let runner = BotRunner::new(client, orchestrator, config.device.name.clone());

    tokio::select! {
        result = runner.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(event_name = "cli.bot.stopping", "ctrl-c received; shutting down");
            Ok(())
        }
    }
}
