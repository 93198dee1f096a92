//! OpenAI-compatible planner backend.
//!
//! Talks to any chat-completions endpoint that supports function calling.
//! The transcript is rendered to the classic function-calling message shape
//! (assistant `function_call` + `role: function` results), which keeps the
//! rendering a pure function of the turn sequence.

use std::time::Duration;

use netsleuth_core::config::LlmConfig;
use netsleuth_core::{ToolDescriptor, Transcript, TurnRecord};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::llm::{Planner, PlannerError, PlannerStep};

pub struct OpenAiPlanner {
    http: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    system_prompt: String,
}

impl OpenAiPlanner {
    pub fn new(
        config: &LlmConfig,
        device_name: &str,
        max_tool_calls: u32,
    ) -> Result<Self, PlannerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                PlannerError::Backend(format!("could not build http client: {error}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_prompt: system_prompt(device_name, max_tool_calls),
        })
    }
}

#[async_trait::async_trait]
impl Planner for OpenAiPlanner {
    async fn next_step(
        &self,
        transcript: &Transcript,
        tools: &[ToolDescriptor],
    ) -> Result<PlannerStep, PlannerError> {
        let body = json!({
            "model": self.model,
            "messages": render_messages(&self.system_prompt, transcript),
            "functions": render_functions(tools),
            "function_call": "auto",
        });

        let mut request = self.http.post(format!("{}/chat/completions", self.base_url)).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|error| PlannerError::Backend(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PlannerError::Backend(format!(
                "chat completion returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| PlannerError::Malformed(error.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::Malformed("response carried no choices".to_string()))?;

        debug!(event_name = "agent.planner.step_received", "planner responded");
        parse_step(choice.message)
    }
}

fn system_prompt(device_name: &str, max_tool_calls: u32) -> String {
    format!(
        "You are a senior network troubleshooting assistant for Cisco IOS.\n\
         \n\
         You must NOT ask the user what command to run.\n\
         You must decide and run the minimum commands yourself.\n\
         \n\
         Allowed actions ONLY via tool calls:\n\
         - run_show(command)   -> command must start with 'show'\n\
         - run_ping(command)   -> command must start with 'ping'\n\
         - run_traceroute(command) -> command must start with 'traceroute'\n\
         \n\
         Strict rules:\n\
         - NEVER request config mode commands (conf t, configure terminal, write, reload, clear, debug, copy, etc.).\n\
         - Use at most {max_tool_calls} tool calls per user question.\n\
         - Prefer filtered/short outputs (include/section/| last) instead of huge outputs.\n\
         - If the question cannot be answered reliably with allowed commands, state that clearly and propose the best next command(s) you would run.\n\
         \n\
         When you have enough information, STOP calling tools and provide a final answer with:\n\
         1) Findings (facts from outputs)\n\
         2) Conclusion (yes/no + evidence)\n\
         3) Recommendations (improvements)\n\
         \n\
         Device OS: Cisco IOS classic CLI. You are diagnosing device {device_name}.\n\
         Valid examples:\n\
         - show running-config | include tacacs\n\
         - show running-config | section aaa\n\
         - show ip route\n\
         - show interface GigabitEthernet0/1\n\
         - show logging | include TACACS\n"
    )
}

fn render_messages(system_prompt: &str, transcript: &Transcript) -> Vec<Value> {
    let mut messages = vec![json!({ "role": "system", "content": system_prompt })];

    for turn in transcript.turns() {
        match turn {
            TurnRecord::UserQuestion { text } => {
                messages.push(json!({ "role": "user", "content": text }));
            }
            TurnRecord::ToolRequest { tool, command } => {
                messages.push(json!({
                    "role": "assistant",
                    "content": Value::Null,
                    "function_call": {
                        "name": tool,
                        "arguments": json!({ "command": command }).to_string(),
                    },
                }));
            }
            TurnRecord::ToolResult { tool, command, output } => {
                messages.push(json!({
                    "role": "function",
                    "name": tool,
                    "content": format!("COMMAND: {command}\n\nOUTPUT:\n{output}"),
                }));
            }
            TurnRecord::FinalAnswer { text } => {
                messages.push(json!({ "role": "assistant", "content": text }));
            }
        }
    }

    messages
}

fn render_functions(tools: &[ToolDescriptor]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters_schema(),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

fn parse_step(message: ChatMessage) -> Result<PlannerStep, PlannerError> {
    if let Some(call) = message.function_call {
        let raw_arguments = call.arguments.unwrap_or_else(|| "{}".to_string());
        let arguments: Value = serde_json::from_str(&raw_arguments).map_err(|error| {
            PlannerError::Malformed(format!("function call arguments are not valid JSON: {error}"))
        })?;
        // A missing or non-string command degrades to an empty command,
        // which the policy rejects - recoverable, not fatal.
        let command =
            arguments.get("command").and_then(Value::as_str).unwrap_or("").trim().to_string();
        return Ok(PlannerStep::ToolCall { tool: call.name, command });
    }

    Ok(PlannerStep::FinalAnswer { text: message.content.unwrap_or_default() })
}

#[cfg(test)]
mod tests {
    use netsleuth_core::{ToolRegistry, Transcript};

    use super::{parse_step, render_functions, render_messages, ChatMessage, FunctionCall};
    use crate::llm::{PlannerError, PlannerStep};

    #[test]
    fn function_call_parses_to_a_tool_step() {
        let step = parse_step(ChatMessage {
            content: None,
            function_call: Some(FunctionCall {
                name: "run_show".to_string(),
                arguments: Some(r#"{"command": " show ip interface brief "}"#.to_string()),
            }),
        })
        .expect("step");

        assert_eq!(
            step,
            PlannerStep::ToolCall {
                tool: "run_show".to_string(),
                command: "show ip interface brief".to_string(),
            }
        );
    }

    #[test]
    fn missing_command_argument_degrades_to_empty_command() {
        let step = parse_step(ChatMessage {
            content: None,
            function_call: Some(FunctionCall { name: "run_ping".to_string(), arguments: None }),
        })
        .expect("step");

        assert_eq!(
            step,
            PlannerStep::ToolCall { tool: "run_ping".to_string(), command: String::new() }
        );
    }

    #[test]
    fn unparseable_arguments_are_a_malformed_response() {
        let result = parse_step(ChatMessage {
            content: None,
            function_call: Some(FunctionCall {
                name: "run_show".to_string(),
                arguments: Some("not json".to_string()),
            }),
        });

        assert!(matches!(result, Err(PlannerError::Malformed(_))));
    }

    #[test]
    fn plain_content_is_a_final_answer() {
        let step = parse_step(ChatMessage {
            content: Some("All interfaces are up.".to_string()),
            function_call: None,
        })
        .expect("step");

        assert_eq!(step, PlannerStep::FinalAnswer { text: "All interfaces are up.".to_string() });
    }

    #[test]
    fn transcript_renders_in_causal_order() {
        let mut transcript = Transcript::for_question("Is Gi0/1 up?");
        transcript.push_exchange(
            "run_show",
            "show interface GigabitEthernet0/1",
            "GigabitEthernet0/1 is up",
        );

        let messages = render_messages("prompt", &transcript);
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["function_call"]["name"], "run_show");
        assert_eq!(messages[3]["role"], "function");
        assert_eq!(messages[3]["name"], "run_show");
        let content = messages[3]["content"].as_str().expect("content");
        assert!(content.starts_with("COMMAND: show interface GigabitEthernet0/1\n\nOUTPUT:\n"));
    }

    #[test]
    fn function_declarations_match_the_registry() {
        let registry = ToolRegistry::for_device("R1");
        let functions = render_functions(registry.list());
        assert_eq!(functions.len(), 3);
        assert_eq!(functions[0]["name"], "run_show");
        assert_eq!(functions[0]["parameters"]["required"][0], "command");
    }
}
