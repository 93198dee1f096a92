//! Minimal Telegram Bot API client: long-poll for updates, send replies.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotApiError {
    #[error("telegram request failed: {0}")]
    Request(String),
    #[error("telegram api rejected the call: {0}")]
    Api(String),
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<T>,
}

pub struct TelegramClient {
    http: reqwest::Client,
    token: SecretString,
    poll_timeout_secs: u64,
}

impl TelegramClient {
    pub fn new(token: SecretString, poll_timeout_secs: u64) -> Result<Self, BotApiError> {
        // The HTTP timeout must outlive the long-poll hold time.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()
            .map_err(|error| BotApiError::Request(format!("could not build http client: {error}")))?;
        Ok(Self { http, token, poll_timeout_secs })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.token.expose_secret())
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotApiError> {
        let response = self
            .http
            .get(self.endpoint("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", self.poll_timeout_secs.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await
            .map_err(|error| BotApiError::Request(error.to_string()))?;

        let envelope: ApiEnvelope<Vec<Update>> = response
            .json()
            .await
            .map_err(|error| BotApiError::Request(error.to_string()))?;

        if !envelope.ok {
            return Err(BotApiError::Api(
                envelope.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(envelope.result.unwrap_or_default())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotApiError> {
        let response = self
            .http
            .post(self.endpoint("sendMessage"))
            .form(&[("chat_id", chat_id.to_string()), ("text", text.to_string())])
            .send()
            .await
            .map_err(|error| BotApiError::Request(error.to_string()))?;

        let envelope: ApiEnvelope<serde::de::IgnoredAny> = response
            .json()
            .await
            .map_err(|error| BotApiError::Request(error.to_string()))?;

        if !envelope.ok {
            return Err(BotApiError::Api(
                envelope.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(())
    }
}
