//! The Device Gateway: one validated command in, sanitized output or an
//! explicit failure out.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::session::DeviceConnector;

/// Markers the device's own parser emits when it accepts a syntactically
/// valid SSH exchange but rejects the command line itself.
const INVALID_INPUT_MARKERS: [&str; 2] = ["% Invalid input", "% Incomplete command"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("device rejected the command as invalid")]
    InvalidDeviceCommand,
    #[error("device transport failed: {0}")]
    TransportFailure(String),
}

impl ExecutionError {
    /// The literal text fed back to the planner in place of command output.
    pub fn feedback_text(&self) -> String {
        match self {
            Self::InvalidDeviceCommand => "ERROR: Invalid Cisco IOS command.".to_string(),
            Self::TransportFailure(detail) => format!("ERROR: CLI execution failed: {detail}"),
        }
    }
}

/// Executes one command per checked-out session against one device.
///
/// Precondition: every command passed to [`DeviceGateway::execute`] has
/// already been allowed by the command policy. The gateway performs no
/// policy checks of its own.
pub struct DeviceGateway {
    connector: Arc<dyn DeviceConnector>,
    read_timeout: Duration,
    // Single exclusive CLI slot per device: overlapping sessions must not
    // interleave commands on the same live connection.
    slot: Mutex<()>,
}

impl DeviceGateway {
    pub fn new(connector: Arc<dyn DeviceConnector>, read_timeout: Duration) -> Self {
        Self { connector, read_timeout, slot: Mutex::new(()) }
    }

    pub async fn execute(&self, command: &str) -> Result<String, ExecutionError> {
        let _slot = self.slot.lock().await;

        let mut session = self
            .connector
            .open()
            .await
            .map_err(|error| ExecutionError::TransportFailure(error.to_string()))?;

        let outcome = timeout(self.read_timeout, session.send_command(command)).await;
        // Teardown happens before the outcome is inspected so no exit path
        // leaks a session.
        session.close().await;

        let output = match outcome {
            Err(_elapsed) => {
                warn!(
                    event_name = "device.gateway.read_timeout",
                    timeout_secs = self.read_timeout.as_secs(),
                    "device did not answer in time"
                );
                return Err(ExecutionError::TransportFailure(format!(
                    "no response within {}s",
                    self.read_timeout.as_secs()
                )));
            }
            Ok(Err(transport)) => {
                warn!(
                    event_name = "device.gateway.transport_failure",
                    error = %transport,
                    "device session failed"
                );
                return Err(ExecutionError::TransportFailure(transport.to_string()));
            }
            Ok(Ok(output)) => output,
        };

        if INVALID_INPUT_MARKERS.iter().any(|marker| output.contains(marker)) {
            debug!(
                event_name = "device.gateway.invalid_command",
                "device parser rejected the command"
            );
            return Err(ExecutionError::InvalidDeviceCommand);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{DeviceGateway, ExecutionError};
    use crate::testing::{ScriptedConnector, ScriptedReply};

    fn gateway(connector: &ScriptedConnector) -> DeviceGateway {
        DeviceGateway::new(Arc::new(connector.clone()), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn successful_command_returns_device_output() {
        let connector = ScriptedConnector::new(vec![ScriptedReply::Output(
            "GigabitEthernet0/1 is up, line protocol is up".to_string(),
        )]);
        let gateway = gateway(&connector);

        let output = gateway.execute("show interface GigabitEthernet0/1").await.expect("output");
        assert!(output.contains("line protocol is up"));
        assert_eq!(connector.commands_sent(), vec!["show interface GigabitEthernet0/1"]);
        assert_eq!(connector.sessions_opened(), 1);
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn device_parser_rejection_maps_to_invalid_command() {
        let connector = ScriptedConnector::new(vec![ScriptedReply::Output(
            "show ip intreface brief\n% Invalid input detected at '^' marker.".to_string(),
        )]);
        let gateway = gateway(&connector);

        let error = gateway.execute("show ip intreface brief").await.expect_err("rejected");
        assert_eq!(error, ExecutionError::InvalidDeviceCommand);
        assert_eq!(error.feedback_text(), "ERROR: Invalid Cisco IOS command.");
        // The exchange itself succeeded, so the session still closed cleanly.
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_reported_with_detail() {
        let connector =
            ScriptedConnector::new(vec![ScriptedReply::Fail("connection refused".to_string())]);
        let gateway = gateway(&connector);

        let error = gateway.execute("show ip route").await.expect_err("failed");
        let ExecutionError::TransportFailure(detail) = &error else {
            panic!("expected transport failure, got {error:?}")
        };
        assert!(detail.contains("connection refused"));
        assert!(error.feedback_text().starts_with("ERROR: CLI execution failed:"));
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn read_timeout_still_tears_the_session_down() {
        let connector = ScriptedConnector::new(vec![ScriptedReply::Hang]);
        let gateway = gateway(&connector);

        let error = gateway.execute("show tech-support full").await.expect_err("timed out");
        assert!(matches!(error, ExecutionError::TransportFailure(_)));
        assert_eq!(connector.sessions_opened(), 1);
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn concurrent_executes_are_serialized_on_one_device() {
        let connector = ScriptedConnector::new(vec![
            ScriptedReply::Output("first".to_string()),
            ScriptedReply::Output("second".to_string()),
        ]);
        let gateway = Arc::new(gateway(&connector));

        let (first, second) = tokio::join!(
            gateway.execute("show ip route"),
            gateway.execute("show ip interface brief"),
        );
        first.expect("first output");
        second.expect("second output");

        // Two sessions, never overlapping.
        assert_eq!(connector.sessions_opened(), 2);
        assert_eq!(connector.sessions_closed(), 2);
        assert_eq!(connector.max_concurrent_sessions(), 1);
    }
}
