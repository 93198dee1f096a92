//! The session orchestrator: one question, one bounded loop.

use std::sync::Arc;

use netsleuth_core::config::BudgetConfig;
use netsleuth_core::{CommandPolicy, RejectReason, SessionState, ToolRegistry, Verdict};
use netsleuth_device::DeviceGateway;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{Planner, PlannerError, PlannerStep};

/// Substituted when the planner ends the session with empty answer text.
pub const NO_ANSWER_PLACEHOLDER: &str = "(No answer text returned.)";

/// Returned when the planner keeps requesting tools past the tool-call
/// budget. A deliberate safety stop, not a failure.
pub const TOOL_BUDGET_MESSAGE: &str =
    "I hit the max diagnostic steps for one question. Please ask more specifically (interface/protocol/target).";

/// Returned when the round budget runs out before a final answer.
pub const ROUND_BUDGET_MESSAGE: &str =
    "I couldn't complete within allowed steps. Please ask a narrower question.";

/// Drives the planner/device loop for single questions. One
/// [`SessionState`] per `answer` call; nothing is shared across questions.
pub struct SessionOrchestrator {
    planner: Arc<dyn Planner>,
    gateway: Arc<DeviceGateway>,
    registry: ToolRegistry,
    policy: CommandPolicy,
    budgets: BudgetConfig,
}

impl SessionOrchestrator {
    pub fn new(
        planner: Arc<dyn Planner>,
        gateway: Arc<DeviceGateway>,
        registry: ToolRegistry,
        budgets: BudgetConfig,
    ) -> Self {
        Self { planner, gateway, registry, policy: CommandPolicy::default(), budgets }
    }

    pub fn with_policy(mut self, policy: CommandPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Answer one user question. The only failure that propagates is a
    /// [`PlannerError`]; everything else feeds back into the session as
    /// text the planner can react to.
    pub async fn answer(&self, question: &str) -> Result<String, PlannerError> {
        let session_id = Uuid::new_v4();
        let mut state = SessionState::new(question);

        info!(
            event_name = "agent.session.started",
            session_id = %session_id,
            max_rounds = self.budgets.max_rounds,
            max_tool_calls = self.budgets.max_tool_calls,
            "session opened"
        );

        while state.rounds_used() < self.budgets.max_rounds {
            state.begin_round();

            let step = self.planner.next_step(state.transcript(), self.registry.list()).await?;

            match step {
                PlannerStep::FinalAnswer { text } => {
                    let trimmed = text.trim();
                    let answer =
                        if trimmed.is_empty() { NO_ANSWER_PLACEHOLDER } else { trimmed };
                    state.record_final_answer(answer);
                    info!(
                        event_name = "agent.session.answered",
                        session_id = %session_id,
                        rounds_used = state.rounds_used(),
                        tool_calls_used = state.tool_calls_used(),
                        "session answered"
                    );
                    return Ok(answer.to_string());
                }
                PlannerStep::ToolCall { tool, command } => {
                    // A tool result produced in the final round could never
                    // be consumed: the round budget wins and the command is
                    // not executed.
                    if state.rounds_used() == self.budgets.max_rounds {
                        warn!(
                            event_name = "agent.session.rounds_exhausted",
                            session_id = %session_id,
                            tool_calls_used = state.tool_calls_used(),
                            "tool requested in the final round"
                        );
                        return Ok(ROUND_BUDGET_MESSAGE.to_string());
                    }

                    if state.tool_calls_used() == self.budgets.max_tool_calls {
                        warn!(
                            event_name = "agent.session.tool_budget_exhausted",
                            session_id = %session_id,
                            tool_calls_used = state.tool_calls_used(),
                            "tool-call budget reached; command not executed"
                        );
                        return Ok(TOOL_BUDGET_MESSAGE.to_string());
                    }

                    state.note_tool_call();
                    let feedback = self.run_tool(session_id, &tool, &command).await;
                    state.record_exchange(tool, command, feedback);
                }
            }
        }

        warn!(
            event_name = "agent.session.rounds_exhausted",
            session_id = %session_id,
            tool_calls_used = state.tool_calls_used(),
            "round budget exhausted without a final answer"
        );
        Ok(ROUND_BUDGET_MESSAGE.to_string())
    }

    /// Admission check for one proposed command: the command policy first,
    /// then the verb family the invoked tool implies. Both must pass.
    fn vet(&self, tool: &str, command: &str) -> Result<(), RejectReason> {
        if let Verdict::Rejected(reason) = self.policy.validate(command) {
            return Err(reason);
        }

        match self.registry.resolve(tool) {
            Some(verb) if verb.matches(command.trim()) => Ok(()),
            // Unknown tool, or a command smuggled into the wrong tool.
            _ => Err(RejectReason::UnrecognizedVerb),
        }
    }

    async fn run_tool(&self, session_id: Uuid, tool: &str, command: &str) -> String {
        if let Err(reason) = self.vet(tool, command) {
            warn!(
                event_name = "agent.command.rejected",
                session_id = %session_id,
                tool,
                reason = ?reason,
                "command rejected by policy"
            );
            return reason.feedback_text().to_string();
        }

        match self.gateway.execute(command).await {
            Ok(output) => {
                info!(
                    event_name = "agent.command.executed",
                    session_id = %session_id,
                    tool,
                    output_bytes = output.len(),
                    "command executed"
                );
                output
            }
            Err(error) => {
                warn!(
                    event_name = "agent.command.failed",
                    session_id = %session_id,
                    tool,
                    error = %error,
                    "command failed on the device"
                );
                error.feedback_text()
            }
        }
    }
}
