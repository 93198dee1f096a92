//! The bot message loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use netsleuth_agent::SessionOrchestrator;
use tracing::{info, warn};

use crate::api::TelegramClient;

/// Telegram caps messages at 4096 characters; clip below that so the
/// trimmed notice always fits.
pub const MAX_REPLY_CHARS: usize = 3_800;

const TRIMMED_NOTICE: &str = "\n\n(Trimmed. Ask a more specific question.)";
const ACK_MESSAGE: &str = "Checking the device and analyzing...";
const GENERIC_FAILURE: &str =
    "Something went wrong while analyzing the device. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollBackoff {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for PollBackoff {
    fn default() -> Self {
        Self { base_delay_ms: 500, max_delay_ms: 30_000 }
    }
}

impl PollBackoff {
    fn delay(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

pub struct BotRunner {
    client: TelegramClient,
    orchestrator: Arc<SessionOrchestrator>,
    device_name: String,
    backoff: PollBackoff,
}

impl BotRunner {
    pub fn new(
        client: TelegramClient,
        orchestrator: Arc<SessionOrchestrator>,
        device_name: String,
    ) -> Self {
        Self { client, orchestrator, device_name, backoff: PollBackoff::default() }
    }

    /// Poll forever. Errors from the Bot API back off and retry; they never
    /// take the process down.
    pub async fn run(&self) -> Result<()> {
        let mut offset = 0i64;
        let mut consecutive_failures = 0u32;

        info!(
            event_name = "telegram.runner.started",
            device = %self.device_name,
            "bot loop started"
        );

        loop {
            let updates = match self.client.get_updates(offset).await {
                Ok(updates) => {
                    consecutive_failures = 0;
                    updates
                }
                Err(error) => {
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    let delay = self.backoff.delay(consecutive_failures);
                    warn!(
                        event_name = "telegram.runner.poll_failed",
                        error = %error,
                        consecutive_failures,
                        delay_ms = delay.as_millis() as u64,
                        "poll failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(message) = update.message else { continue };
                let Some(text) = message.text.as_deref().map(str::trim) else { continue };
                if text.is_empty() {
                    continue;
                }
                self.handle_text(message.chat.id, text).await;
            }
        }
    }

    async fn handle_text(&self, chat_id: i64, text: &str) {
        if text == "/start" {
            self.send(chat_id, &self.greeting()).await;
            return;
        }

        self.send(chat_id, ACK_MESSAGE).await;

        let reply = match self.orchestrator.answer(text).await {
            Ok(answer) => clip_reply(&answer),
            Err(error) => {
                warn!(
                    event_name = "telegram.runner.session_failed",
                    error = %error,
                    "session failed; sending generic error"
                );
                GENERIC_FAILURE.to_string()
            }
        };

        self.send(chat_id, &reply).await;
    }

    async fn send(&self, chat_id: i64, text: &str) {
        if let Err(error) = self.client.send_message(chat_id, text).await {
            warn!(
                event_name = "telegram.runner.send_failed",
                error = %error,
                "could not deliver reply"
            );
        }
    }

    fn greeting(&self) -> String {
        format!(
            "Ready\n\
             Device: {}\n\
             Ask any question. I will run SHOW commands and analyze.\n\
             \n\
             Examples:\n\
             - Why is Gi0/1 down?\n\
             - Is BGP healthy?\n\
             - Any routing issues?\n",
            self.device_name
        )
    }
}

/// Clip an answer to the reply limit, appending the trimmed notice when
/// anything was cut. Operates on characters, never mid-codepoint.
pub fn clip_reply(answer: &str) -> String {
    if answer.chars().count() <= MAX_REPLY_CHARS {
        return answer.to_string();
    }
    let mut clipped: String = answer.chars().take(MAX_REPLY_CHARS).collect();
    clipped.push_str(TRIMMED_NOTICE);
    clipped
}
