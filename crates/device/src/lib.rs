//! Device access for netsleuth.
//!
//! This crate is pure mechanism: it executes one already-validated command
//! against one managed device and reports what happened. Policy (what may
//! run at all) lives upstream in `netsleuth-core` and is enforced by the
//! session orchestrator before anything reaches this crate.
//!
//! - `session` - the `DeviceConnector` / `DeviceSession` seam plus the
//!   default transport, which shells out to the system `ssh` client one
//!   command at a time
//! - `gateway` - the `DeviceGateway`: single-slot serialization per device,
//!   bounded read timeout, unconditional session teardown, device parser
//!   error detection
//! - `testing` - a scripted connector for exercising the gateway and the
//!   orchestrator without a live device

pub mod gateway;
pub mod session;
pub mod testing;

pub use gateway::{DeviceGateway, ExecutionError};
pub use session::{DeviceConnector, DeviceSession, SshProcessConnector, TransportError};
