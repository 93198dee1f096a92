//! The device session seam and the default SSH transport.
//!
//! A session runs exactly one command and is torn down afterwards; there is
//! no pooling and no reuse. The default transport spawns the system `ssh`
//! client per command, which gives the same cadence with no long-lived
//! connection state to manage.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use netsleuth_core::config::DeviceConfig;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("could not open device session: {0}")]
    Connect(String),
    #[error("command execution failed: {0}")]
    Execute(String),
}

/// Opens sessions to one managed device.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn open(&self) -> Result<Box<dyn DeviceSession>, TransportError>;
}

/// A checked-out session. One command, then [`DeviceSession::close`].
#[async_trait]
pub trait DeviceSession: Send {
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError>;
    async fn close(&mut self);
}

/// Connector that runs commands through the system `ssh` client in batch
/// mode (key-based auth; no interactive prompts).
#[derive(Clone, Debug)]
pub struct SshProcessConnector {
    device: DeviceConfig,
    ssh_path: PathBuf,
}

impl SshProcessConnector {
    pub fn new(device: DeviceConfig) -> Result<Self, TransportError> {
        let ssh_path = which::which("ssh")
            .map_err(|error| TransportError::Connect(format!("ssh client not found: {error}")))?;
        Ok(Self { device, ssh_path })
    }
}

#[async_trait]
impl DeviceConnector for SshProcessConnector {
    async fn open(&self) -> Result<Box<dyn DeviceSession>, TransportError> {
        if self.device.host.trim().is_empty() {
            return Err(TransportError::Connect(
                "device host is not configured (set NETSLEUTH_DEVICE_HOST or [device] host)"
                    .to_string(),
            ));
        }
        Ok(Box::new(SshProcessSession {
            device: self.device.clone(),
            ssh_path: self.ssh_path.clone(),
        }))
    }
}

struct SshProcessSession {
    device: DeviceConfig,
    ssh_path: PathBuf,
}

#[async_trait]
impl DeviceSession for SshProcessSession {
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        debug!(
            event_name = "device.session.send_command",
            device = %self.device.name,
            "spawning ssh for one command"
        );

        let output = Command::new(&self.ssh_path)
            .arg("-o")
            .arg("BatchMode=yes")
            .arg("-o")
            .arg("StrictHostKeyChecking=accept-new")
            .arg("-p")
            .arg(self.device.port.to_string())
            .arg(format!("{}@{}", self.device.username, self.device.host))
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| TransportError::Execute(format!("ssh spawn failed: {error}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Execute(format!(
                "ssh exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(stdout)
    }

    async fn close(&mut self) {
        // One process per command; nothing stays open between commands.
    }
}
