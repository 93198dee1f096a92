//! Admission policy for device commands.
//!
//! A command proposed by the planner is plain text. Before it may reach a
//! device it must clear three checks, applied in fixed order with first
//! match winning:
//!
//! 1. forbidden-keyword substring scan (config-mode and disruptive verbs)
//! 2. allowed-verb prefix match (`show` / `ping` / `traceroute`)
//! 3. bare `show running-config` block (filtered variants are fine)
//!
//! The forbidden scan runs first so a forbidden keyword can never be
//! smuggled in behind an otherwise-legal prefix.

/// Keywords that reject a command outright, matched case-insensitively as
/// substrings anywhere in the command. Changing this list is a security
/// policy change, not a code change.
///
/// `conf t` rather than bare `conf`: `running-config` contains the latter,
/// and filtered running-config reads are legal.
pub const FORBIDDEN_KEYWORDS: [&str; 7] =
    ["configure", "conf t", "reload", "write", "copy", "clear", "debug"];

const FULL_CONFIG_DUMP: &str = "show running-config";

/// Why a command was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    ForbiddenKeyword,
    UnrecognizedVerb,
    FullConfigDump,
}

impl RejectReason {
    /// The literal text fed back to the planner in place of command output.
    /// The planner sees rejections on the same channel as device output so
    /// it can recover within the session.
    pub fn feedback_text(&self) -> &'static str {
        match self {
            Self::ForbiddenKeyword => {
                "ERROR: Configuration or disruptive commands are forbidden."
            }
            Self::UnrecognizedVerb => {
                "ERROR: Only 'show', 'ping', and 'traceroute' are allowed."
            }
            Self::FullConfigDump => {
                "ERROR: Full running-config is not allowed. Use filtered commands like '| include' or '| section'."
            }
        }
    }
}

/// Outcome of validating one command. Never partially allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Rejected(RejectReason),
}

/// The three read-only command families the broker will ever execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandVerb {
    Show,
    Ping,
    Traceroute,
}

impl CommandVerb {
    pub const ALL: [CommandVerb; 3] = [Self::Show, Self::Ping, Self::Traceroute];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Ping => "ping",
            Self::Traceroute => "traceroute",
        }
    }

    /// Case-insensitive prefix match after leading whitespace. `show`
    /// requires at least one argument; `ping` and `traceroute` may be bare.
    pub fn matches(&self, command: &str) -> bool {
        let trimmed = command.trim_start();
        let Some(rest) = strip_prefix_ignore_ascii_case(trimmed, self.as_str()) else {
            return false;
        };
        match self {
            Self::Show => rest.starts_with(char::is_whitespace),
            Self::Ping | Self::Traceroute => {
                rest.is_empty() || rest.starts_with(char::is_whitespace)
            }
        }
    }
}

fn strip_prefix_ignore_ascii_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    if input.is_char_boundary(prefix.len()) && input[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

/// The command validator. Pure: no I/O, no state beyond the keyword set,
/// and the verdict depends only on the input string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPolicy {
    forbidden_keywords: Vec<String>,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::new(FORBIDDEN_KEYWORDS.iter().map(|keyword| keyword.to_string()))
    }
}

impl CommandPolicy {
    pub fn new(forbidden_keywords: impl IntoIterator<Item = String>) -> Self {
        Self {
            forbidden_keywords: forbidden_keywords
                .into_iter()
                .map(|keyword| keyword.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn validate(&self, command: &str) -> Verdict {
        let trimmed = command.trim();
        let lowered = trimmed.to_ascii_lowercase();

        if self.forbidden_keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return Verdict::Rejected(RejectReason::ForbiddenKeyword);
        }

        if !CommandVerb::ALL.iter().any(|verb| verb.matches(trimmed)) {
            return Verdict::Rejected(RejectReason::UnrecognizedVerb);
        }

        if lowered == FULL_CONFIG_DUMP {
            return Verdict::Rejected(RejectReason::FullConfigDump);
        }

        Verdict::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandPolicy, CommandVerb, RejectReason, Verdict};

    fn validate(command: &str) -> Verdict {
        CommandPolicy::default().validate(command)
    }

    #[test]
    fn plain_show_commands_are_allowed() {
        assert_eq!(validate("show ip interface brief"), Verdict::Allowed);
        assert_eq!(validate("show ip route"), Verdict::Allowed);
        assert_eq!(validate("  SHOW Interface GigabitEthernet0/1"), Verdict::Allowed);
    }

    #[test]
    fn ping_and_traceroute_are_allowed_bare_or_with_target() {
        assert_eq!(validate("ping 8.8.8.8"), Verdict::Allowed);
        assert_eq!(validate("ping"), Verdict::Allowed);
        assert_eq!(validate("traceroute 10.0.0.1"), Verdict::Allowed);
        assert_eq!(validate("TRACEROUTE"), Verdict::Allowed);
    }

    #[test]
    fn bare_show_without_arguments_is_not_a_recognized_command() {
        assert_eq!(validate("show"), Verdict::Rejected(RejectReason::UnrecognizedVerb));
        assert_eq!(validate("shower 1"), Verdict::Rejected(RejectReason::UnrecognizedVerb));
        assert_eq!(validate("pingx"), Verdict::Rejected(RejectReason::UnrecognizedVerb));
    }

    #[test]
    fn forbidden_keywords_reject_anywhere_any_case() {
        for command in [
            "configure terminal",
            "conf t",
            "show conf t",
            "RELOAD",
            "write memory",
            "copy running-config startup-config",
            "clear counters",
            "debug ip packet",
            "show ip route | append Debug",
        ] {
            assert_eq!(
                validate(command),
                Verdict::Rejected(RejectReason::ForbiddenKeyword),
                "expected forbidden: {command}"
            );
        }
    }

    #[test]
    fn forbidden_keyword_wins_over_a_legal_verb_prefix() {
        assert_eq!(
            validate("show running-config | include configure"),
            Verdict::Rejected(RejectReason::ForbiddenKeyword)
        );
        assert_eq!(
            validate("ping 8.8.8.8 ; reload"),
            Verdict::Rejected(RejectReason::ForbiddenKeyword)
        );
    }

    #[test]
    fn unrecognized_verbs_are_rejected() {
        for command in ["telnet 10.0.0.1", "ssh admin@r2", "dir flash:", ""] {
            assert_eq!(
                validate(command),
                Verdict::Rejected(RejectReason::UnrecognizedVerb),
                "expected unrecognized: {command}"
            );
        }
    }

    #[test]
    fn full_running_config_dump_is_blocked_but_filtered_forms_pass() {
        assert_eq!(
            validate("show running-config"),
            Verdict::Rejected(RejectReason::FullConfigDump)
        );
        assert_eq!(
            validate("  Show Running-Config  "),
            Verdict::Rejected(RejectReason::FullConfigDump)
        );
        assert_eq!(validate("show running-config | include tacacs"), Verdict::Allowed);
        assert_eq!(validate("show running-config | section aaa"), Verdict::Allowed);
    }

    #[test]
    fn verb_matching_is_prefix_shaped() {
        assert!(CommandVerb::Show.matches("show version"));
        assert!(!CommandVerb::Show.matches("show"));
        assert!(!CommandVerb::Show.matches("ping 1.1.1.1"));
        assert!(CommandVerb::Ping.matches("   ping"));
        assert!(CommandVerb::Traceroute.matches("traceroute 1.1.1.1"));
        assert!(!CommandVerb::Traceroute.matches("trace 1.1.1.1"));
    }
}
