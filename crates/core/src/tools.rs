//! The static tool surface exposed to the planner.
//!
//! Three tools, declared once at startup and never mutated. Each maps to a
//! command verb family; the orchestrator cross-checks a requested command
//! against its tool's verb on top of the policy's own verb scan.

use serde_json::{json, Value};

use crate::policy::CommandVerb;

/// One callable tool as advertised to the planner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: String,
    pub verb: CommandVerb,
    argument_hint: Option<&'static str>,
}

impl ToolDescriptor {
    /// JSON schema for the tool's single `command` argument, in the shape
    /// chat-completions function declarations expect.
    pub fn parameters_schema(&self) -> Value {
        let command = match self.argument_hint {
            Some(hint) => json!({ "type": "string", "description": hint }),
            None => json!({ "type": "string" }),
        };
        json!({
            "type": "object",
            "properties": { "command": command },
            "required": ["command"],
        })
    }
}

/// Ordered, immutable table of the callable tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    /// Build the registry for one managed device. The device name only
    /// feeds the descriptions shown to the planner.
    pub fn for_device(device_name: &str) -> Self {
        Self {
            tools: vec![
                ToolDescriptor {
                    name: "run_show",
                    description: format!(
                        "Run a read-only Cisco IOS SHOW command on device {device_name}"
                    ),
                    verb: CommandVerb::Show,
                    argument_hint: None,
                },
                ToolDescriptor {
                    name: "run_ping",
                    description: format!(
                        "Run a ping command on device {device_name} to test reachability."
                    ),
                    verb: CommandVerb::Ping,
                    argument_hint: Some("A Cisco IOS ping command, e.g. ping 8.8.8.8"),
                },
                ToolDescriptor {
                    name: "run_traceroute",
                    description: format!("Run a traceroute command on device {device_name}."),
                    verb: CommandVerb::Traceroute,
                    argument_hint: Some("A Cisco IOS traceroute command"),
                },
            ],
        }
    }

    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Verb constraint implied by a tool name, or `None` for a tool this
    /// registry never declared.
    pub fn resolve(&self, tool_name: &str) -> Option<CommandVerb> {
        self.tools.iter().find(|tool| tool.name == tool_name).map(|tool| tool.verb)
    }
}

#[cfg(test)]
mod tests {
    use super::ToolRegistry;
    use crate::policy::CommandVerb;

    #[test]
    fn registry_declares_three_tools_in_order() {
        let registry = ToolRegistry::for_device("R1");
        let names = registry.list().iter().map(|tool| tool.name).collect::<Vec<_>>();
        assert_eq!(names, ["run_show", "run_ping", "run_traceroute"]);
        assert!(registry.list()[0].description.contains("R1"));
    }

    #[test]
    fn resolve_maps_tool_names_to_verbs() {
        let registry = ToolRegistry::for_device("R1");
        assert_eq!(registry.resolve("run_show"), Some(CommandVerb::Show));
        assert_eq!(registry.resolve("run_ping"), Some(CommandVerb::Ping));
        assert_eq!(registry.resolve("run_traceroute"), Some(CommandVerb::Traceroute));
        assert_eq!(registry.resolve("run_config"), None);
    }

    #[test]
    fn every_tool_takes_a_single_required_command_string() {
        let registry = ToolRegistry::for_device("R1");
        for tool in registry.list() {
            let schema = tool.parameters_schema();
            assert_eq!(schema["type"], "object");
            assert_eq!(schema["properties"]["command"]["type"], "string");
            assert_eq!(schema["required"][0], "command");
        }
    }
}
