//! Scripted device connector for tests.
//!
//! Plays back a fixed sequence of replies and records how sessions were
//! used, so gateway and orchestrator tests can assert on command counts,
//! teardown, and serialization without a live device.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::session::{DeviceConnector, DeviceSession, TransportError};

/// One canned reply: device output, a transport failure, or a hang that
/// never resolves (exercises the gateway's read timeout).
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    Output(String),
    Fail(String),
    Hang,
}

#[derive(Clone)]
pub struct ScriptedConnector {
    inner: Arc<Inner>,
}

struct Inner {
    replies: Mutex<VecDeque<ScriptedReply>>,
    commands: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl ScriptedConnector {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            inner: Arc::new(Inner {
                replies: Mutex::new(replies.into()),
                commands: Mutex::new(Vec::new()),
                opened: AtomicUsize::new(0),
                closed: AtomicUsize::new(0),
                live: AtomicUsize::new(0),
                max_live: AtomicUsize::new(0),
            }),
        }
    }

    /// Commands sent over any session, in order.
    pub fn commands_sent(&self) -> Vec<String> {
        self.inner.commands.lock().expect("commands lock").clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Highest number of sessions open at the same time.
    pub fn max_concurrent_sessions(&self) -> usize {
        self.inner.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceConnector for ScriptedConnector {
    async fn open(&self) -> Result<Box<dyn DeviceSession>, TransportError> {
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        let live = self.inner.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_live.fetch_max(live, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession { inner: Arc::clone(&self.inner) }))
    }
}

struct ScriptedSession {
    inner: Arc<Inner>,
}

#[async_trait]
impl DeviceSession for ScriptedSession {
    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        self.inner.commands.lock().expect("commands lock").push(command.to_string());
        let reply = self.inner.replies.lock().expect("replies lock").pop_front();
        match reply {
            Some(ScriptedReply::Output(output)) => Ok(output),
            Some(ScriptedReply::Fail(detail)) => Err(TransportError::Execute(detail)),
            Some(ScriptedReply::Hang) => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
            None => Err(TransportError::Execute("scripted connector ran out of replies".to_string())),
        }
    }

    async fn close(&mut self) {
        self.inner.closed.fetch_add(1, Ordering::SeqCst);
        self.inner.live.fetch_sub(1, Ordering::SeqCst);
    }
}
