//! Core types for the netsleuth diagnosis agent.
//!
//! This crate holds everything the rest of the workspace agrees on but that
//! performs no I/O of its own:
//!
//! - **Command policy** (`policy`) - the pure validator deciding whether a
//!   literal CLI command may ever be sent to a device
//! - **Tool registry** (`tools`) - the static table of callable tools exposed
//!   to the planner, each tied to a command verb family
//! - **Transcript** (`transcript`) - the per-question conversation record and
//!   session counters
//! - **Configuration** (`config`) - file + environment loading with
//!   validation
//!
//! # Safety Principle
//!
//! The planner (an LLM) is untrusted. Every command it proposes passes
//! through `policy::CommandPolicy::validate` before execution, and the
//! policy is deterministic: its verdict depends only on the command string
//! and two fixed keyword sets, so it is unit-testable without a device.

pub mod config;
pub mod policy;
pub mod tools;
pub mod transcript;

pub use config::{AppConfig, BudgetConfig, ConfigError, DeviceConfig, LoadOptions};
pub use policy::{CommandPolicy, CommandVerb, RejectReason, Verdict};
pub use tools::{ToolDescriptor, ToolRegistry};
pub use transcript::{SessionState, Transcript, TurnRecord};
