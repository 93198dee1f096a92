use std::path::PathBuf;

use anyhow::Result;
use netsleuth_core::config::AppConfig;
use secrecy::{ExposeSecret, SecretString};

use super::load_config;

pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    for line in render_lines(&config) {
        println!("{line}");
    }
    Ok(())
}

fn render_lines(config: &AppConfig) -> Vec<String> {
    vec![
        "effective config (source precedence: env > file > default):".to_string(),
        render_line("device.name", &config.device.name),
        render_line("device.host", &config.device.host),
        render_line("device.username", &config.device.username),
        render_line("device.port", &config.device.port.to_string()),
        render_line("device.read_timeout_secs", &config.device.read_timeout_secs.to_string()),
        render_line("llm.api_key", &redact_secret(config.llm.api_key.as_ref())),
        render_line("llm.base_url", &config.llm.base_url),
        render_line("llm.model", &config.llm.model),
        render_line("llm.timeout_secs", &config.llm.timeout_secs.to_string()),
        render_line("telegram.bot_token", &redact_secret(config.telegram.bot_token.as_ref())),
        render_line(
            "telegram.poll_timeout_secs",
            &config.telegram.poll_timeout_secs.to_string(),
        ),
        render_line("budgets.max_tool_calls", &config.budgets.max_tool_calls.to_string()),
        render_line("budgets.max_rounds", &config.budgets.max_rounds.to_string()),
        render_line("logging.level", &config.logging.level),
        render_line("logging.format", &format!("{:?}", config.logging.format).to_lowercase()),
    ]
}

fn render_line(key: &str, value: &str) -> String {
    format!("- {key} = {value}")
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
