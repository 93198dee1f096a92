//! Telegram front end for netsleuth.
//!
//! A thin presentation layer over the agent runtime:
//! - **Bot API client** (`api`) - `getUpdates` long-polling and
//!   `sendMessage`, nothing more
//! - **Runner** (`runner`) - the message loop: greet on `/start`, hand
//!   questions to the session orchestrator, clip long answers
//!
//! The front end owns output truncation; the agent always produces plain
//! text so clipping here is safe.

pub mod api;
pub mod runner;

pub use api::{BotApiError, TelegramClient};
pub use runner::BotRunner;
