use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub llm: LlmConfig,
    pub telegram: TelegramConfig,
    pub budgets: BudgetConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DeviceConfig {
    pub name: String,
    pub host: String,
    pub username: String,
    pub port: u16,
    pub read_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: Option<SecretString>,
    pub poll_timeout_secs: u64,
}

/// Hard per-question limits. Both must be at least 1: a budget of 0 can
/// never answer anything and is rejected at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetConfig {
    pub max_tool_calls: u32,
    pub max_rounds: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                name: "R1".to_string(),
                host: String::new(),
                username: "admin".to_string(),
                port: 22,
                read_timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 60,
            },
            telegram: TelegramConfig { bot_token: None, poll_timeout_secs: 30 },
            budgets: BudgetConfig { max_tool_calls: 3, max_rounds: 4 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    device: Option<DevicePatch>,
    llm: Option<LlmPatch>,
    telegram: Option<TelegramPatch>,
    budgets: Option<BudgetPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DevicePatch {
    name: Option<String>,
    host: Option<String>,
    username: Option<String>,
    port: Option<u16>,
    read_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    poll_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BudgetPatch {
    max_tool_calls: Option<u32>,
    max_rounds: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("netsleuth.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(device) = patch.device {
            if let Some(name) = device.name {
                self.device.name = name;
            }
            if let Some(host) = device.host {
                self.device.host = host;
            }
            if let Some(username) = device.username {
                self.device.username = username;
            }
            if let Some(port) = device.port {
                self.device.port = port;
            }
            if let Some(read_timeout_secs) = device.read_timeout_secs {
                self.device.read_timeout_secs = read_timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(telegram) = patch.telegram {
            if let Some(telegram_bot_token_value) = telegram.bot_token {
                self.telegram.bot_token = Some(secret_value(telegram_bot_token_value));
            }
            if let Some(poll_timeout_secs) = telegram.poll_timeout_secs {
                self.telegram.poll_timeout_secs = poll_timeout_secs;
            }
        }

        if let Some(budgets) = patch.budgets {
            if let Some(max_tool_calls) = budgets.max_tool_calls {
                self.budgets.max_tool_calls = max_tool_calls;
            }
            if let Some(max_rounds) = budgets.max_rounds {
                self.budgets.max_rounds = max_rounds;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("NETSLEUTH_DEVICE_NAME") {
            self.device.name = value;
        }
        if let Some(value) = read_env("NETSLEUTH_DEVICE_HOST") {
            self.device.host = value;
        }
        if let Some(value) = read_env("NETSLEUTH_DEVICE_USERNAME") {
            self.device.username = value;
        }
        if let Some(value) = read_env("NETSLEUTH_DEVICE_PORT") {
            self.device.port = parse_u16("NETSLEUTH_DEVICE_PORT", &value)?;
        }
        if let Some(value) = read_env("NETSLEUTH_DEVICE_READ_TIMEOUT_SECS") {
            self.device.read_timeout_secs =
                parse_u64("NETSLEUTH_DEVICE_READ_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NETSLEUTH_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("NETSLEUTH_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("NETSLEUTH_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("NETSLEUTH_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("NETSLEUTH_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NETSLEUTH_TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("NETSLEUTH_TELEGRAM_POLL_TIMEOUT_SECS") {
            self.telegram.poll_timeout_secs =
                parse_u64("NETSLEUTH_TELEGRAM_POLL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("NETSLEUTH_BUDGET_MAX_TOOL_CALLS") {
            self.budgets.max_tool_calls = parse_u32("NETSLEUTH_BUDGET_MAX_TOOL_CALLS", &value)?;
        }
        if let Some(value) = read_env("NETSLEUTH_BUDGET_MAX_ROUNDS") {
            self.budgets.max_rounds = parse_u32("NETSLEUTH_BUDGET_MAX_ROUNDS", &value)?;
        }

        let log_level =
            read_env("NETSLEUTH_LOGGING_LEVEL").or_else(|| read_env("NETSLEUTH_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("NETSLEUTH_LOGGING_FORMAT").or_else(|| read_env("NETSLEUTH_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budgets.max_tool_calls < 1 {
            return Err(ConfigError::Validation(
                "budgets.max_tool_calls must be at least 1 (a budget of 0 can never answer)"
                    .to_string(),
            ));
        }
        if self.budgets.max_rounds < 1 {
            return Err(ConfigError::Validation(
                "budgets.max_rounds must be at least 1 (a budget of 0 can never answer)"
                    .to_string(),
            ));
        }
        if self.device.read_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "device.read_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "llm.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("netsleuth.toml"), PathBuf::from("config/netsleuth.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}
