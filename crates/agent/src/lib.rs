//! Agent runtime - the bounded diagnosis loop.
//!
//! This crate drives one question through a constrained request/response
//! loop between an LLM planner and a managed device:
//!
//! 1. **Planner** (`llm`) - decides, per round, whether to call a tool or
//!    answer; pluggable behind the `Planner` trait
//! 2. **Admission** - every proposed command passes the core command policy
//!    plus a per-tool verb cross-check before execution
//! 3. **Execution** - allowed commands go to the device gateway; rejections
//!    and failures are fed back to the planner as literal `ERROR:` text
//! 4. **Budgets** (`orchestrator`) - hard caps on planner rounds and tool
//!    calls per question; exhaustion ends the session with a fixed message
//!
//! # Safety Principle
//!
//! The planner is untrusted and probabilistic. It never touches the device
//! directly: there is no code path from a planner response to the gateway
//! that does not go through validation, and no error path widens the
//! command surface.

pub mod llm;
pub mod openai;
pub mod orchestrator;

pub use llm::{Planner, PlannerError, PlannerStep};
pub use openai::OpenAiPlanner;
pub use orchestrator::SessionOrchestrator;
