//! Per-question conversation record and session counters.
//!
//! A transcript is the ordered history of one question: the user's text,
//! each tool request with its paired result, and the final answer. It is
//! append-only, insertion order is the causal order of the dialogue, and it
//! is dropped when the question resolves - there is no cross-question
//! memory.

/// One step of the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnRecord {
    UserQuestion { text: String },
    ToolRequest { tool: String, command: String },
    ToolResult { tool: String, command: String, output: String },
    FinalAnswer { text: String },
}

/// Ordered, append-only sequence of [`TurnRecord`]s.
///
/// Tool requests and results are only ever appended together via
/// [`Transcript::push_exchange`], so every request is immediately followed
/// by its result and the pairing invariant holds by construction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<TurnRecord>,
}

impl Transcript {
    pub fn for_question(question: &str) -> Self {
        Self { turns: vec![TurnRecord::UserQuestion { text: question.to_string() }] }
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    /// Append a tool request together with the output (or error text) it
    /// produced.
    pub fn push_exchange(
        &mut self,
        tool: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
    ) {
        let tool = tool.into();
        let command = command.into();
        self.turns.push(TurnRecord::ToolRequest { tool: tool.clone(), command: command.clone() });
        self.turns.push(TurnRecord::ToolResult { tool, command, output: output.into() });
    }

    pub fn push_final_answer(&mut self, text: impl Into<String>) {
        self.turns.push(TurnRecord::FinalAnswer { text: text.into() });
    }

    /// Number of completed tool request/result exchanges.
    pub fn tool_exchanges(&self) -> usize {
        self.turns
            .iter()
            .filter(|turn| matches!(turn, TurnRecord::ToolResult { .. }))
            .count()
    }
}

/// State owned by one session for the lifetime of one question. Counters
/// only ever move forward.
#[derive(Clone, Debug)]
pub struct SessionState {
    transcript: Transcript,
    rounds_used: u32,
    tool_calls_used: u32,
}

impl SessionState {
    pub fn new(question: &str) -> Self {
        Self { transcript: Transcript::for_question(question), rounds_used: 0, tool_calls_used: 0 }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn rounds_used(&self) -> u32 {
        self.rounds_used
    }

    pub fn tool_calls_used(&self) -> u32 {
        self.tool_calls_used
    }

    pub fn begin_round(&mut self) {
        self.rounds_used += 1;
    }

    pub fn note_tool_call(&mut self) {
        self.tool_calls_used += 1;
    }

    pub fn record_exchange(
        &mut self,
        tool: impl Into<String>,
        command: impl Into<String>,
        output: impl Into<String>,
    ) {
        self.transcript.push_exchange(tool, command, output);
    }

    pub fn record_final_answer(&mut self, text: impl Into<String>) {
        self.transcript.push_final_answer(text);
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionState, Transcript, TurnRecord};

    #[test]
    fn transcript_starts_with_the_user_question() {
        let transcript = Transcript::for_question("Is BGP healthy?");
        assert_eq!(
            transcript.turns(),
            [TurnRecord::UserQuestion { text: "Is BGP healthy?".to_string() }]
        );
    }

    #[test]
    fn exchanges_are_recorded_as_adjacent_request_result_pairs() {
        let mut transcript = Transcript::for_question("q");
        transcript.push_exchange("run_show", "show ip route", "Gateway of last resort...");
        transcript.push_exchange("run_ping", "ping 8.8.8.8", "Success rate is 100 percent");
        transcript.push_final_answer("Routing looks healthy.");

        let turns = transcript.turns();
        assert_eq!(turns.len(), 6);
        for pair in turns[1..5].chunks(2) {
            let [request, result] = pair else { panic!("odd exchange") };
            let TurnRecord::ToolRequest { tool: requested_tool, command: requested_command } =
                request
            else {
                panic!("expected request, got {request:?}")
            };
            let TurnRecord::ToolResult { tool, command, .. } = result else {
                panic!("expected result, got {result:?}")
            };
            assert_eq!(tool, requested_tool);
            assert_eq!(command, requested_command);
        }
        assert_eq!(transcript.tool_exchanges(), 2);
        assert!(matches!(turns.last(), Some(TurnRecord::FinalAnswer { .. })));
    }

    #[test]
    fn session_counters_are_monotonic() {
        let mut state = SessionState::new("q");
        assert_eq!(state.rounds_used(), 0);
        assert_eq!(state.tool_calls_used(), 0);

        state.begin_round();
        state.note_tool_call();
        state.begin_round();

        assert_eq!(state.rounds_used(), 2);
        assert_eq!(state.tool_calls_used(), 1);
        assert_eq!(state.transcript().tool_exchanges(), 0);
    }
}
