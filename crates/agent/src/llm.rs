//! The planner seam.
//!
//! A planner is the reasoning backend: given the transcript so far and the
//! declared tool surface, it returns exactly one next step. Implementations
//! are expected to be stateless across calls - the transcript carries all
//! conversation state.

use async_trait::async_trait;
use netsleuth_core::{ToolDescriptor, Transcript};
use thiserror::Error;

/// The planner's decision for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlannerStep {
    /// Invoke a declared tool with a literal command string.
    ToolCall { tool: String, command: String },
    /// Stop calling tools and answer the user.
    FinalAnswer { text: String },
}

/// Failures at the planner boundary. These are the one class of error the
/// session does not recover from internally - there is no safe fallback
/// action when the reasoning backend is gone.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner backend request failed: {0}")]
    Backend(String),
    #[error("planner returned a malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Called at most once per round.
    async fn next_step(
        &self,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
    ) -> Result<PlannerStep, PlannerError>;
}
