//! Scoped session acquisition.
//!
//! A session is one authenticated management connection, owned by exactly
//! one tool invocation. [`with_session`] brackets the connect/disconnect
//! pair: the release step runs on every exit path, including when the
//! operation inside the scope errors, so no invocation can leak a
//! connection.
//!
//! The transport is abstracted behind [`DeviceConnector`] /
//! [`DeviceSession`] so the tools can be exercised against a fake
//! transport that records the exact commands sent.

use async_trait::async_trait;
use futures::future::BoxFuture;
use russh::{client, keys};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::DeviceProfile;
use super::error::AgentError;

/// One open management connection.
#[async_trait]
pub trait DeviceSession: Send {
    /// Send one command (or a newline-joined batch sharing a single
    /// channel) and return the collected plain-text output.
    async fn send_command(&mut self, command: &str) -> Result<String, AgentError>;

    /// Tear the connection down. Invoked exactly once per session by
    /// [`with_session`].
    async fn close(&mut self) -> Result<(), AgentError>;
}

/// Opens sessions against one device profile.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn connect(&self, profile: &DeviceProfile) -> Result<SessionHandle, AgentError>;
}

pub type SessionHandle = Box<dyn DeviceSession>;

/// Run `op` inside a freshly opened session, guaranteeing teardown.
///
/// The connection is opened once (no retry), the operation runs, and
/// `close` is always awaited before the result is returned. A teardown
/// failure is logged but never masks the operation's own result.
pub async fn with_session<T, F>(
    connector: &dyn DeviceConnector,
    profile: &DeviceProfile,
    op: F,
) -> Result<T, AgentError>
where
    T: Send,
    F: for<'s> FnOnce(&'s mut SessionHandle) -> BoxFuture<'s, Result<T, AgentError>> + Send,
{
    let invocation = Uuid::new_v4();
    debug!(%invocation, host = %profile.host, "opening device session");

    let mut session = connector.connect(profile).await?;
    let result = op(&mut session).await;

    if let Err(teardown) = session.close().await {
        warn!(%invocation, "session teardown failed: {}", teardown);
    }
    debug!(%invocation, "device session closed");

    result
}

/// russh client handler that accepts all host keys, similar to
/// `StrictHostKeyChecking=no` in OpenSSH. Management networks pinning
/// host keys should extend this to verify against known_hosts.
pub struct ClientHandler;

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fake transport shared by the tool tests: records every command,
    //! counts connects/teardowns, and emulates the interface
    //! administrative state so idempotence can be exercised end to end.

    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Default)]
    pub(crate) struct FakeDevice {
        /// Canned replies by exact command string.
        pub replies: HashMap<String, String>,
        /// Command that fails with a remote error when sent.
        pub fail_on: Option<String>,
        /// Emulated interface administrative state (true = shut down).
        pub admin_down: bool,
    }

    #[derive(Clone, Default)]
    pub(crate) struct FakeConnector {
        pub device: Arc<StdMutex<FakeDevice>>,
        pub connects: Arc<AtomicUsize>,
        pub closes: Arc<AtomicUsize>,
        /// (session index, command) in dispatch order.
        pub commands: Arc<StdMutex<Vec<(usize, String)>>>,
        pub refuse_connect: bool,
    }

    impl FakeConnector {
        pub fn refusing() -> Self {
            FakeConnector {
                refuse_connect: true,
                ..FakeConnector::default()
            }
        }

        pub fn with_reply(command: &str, reply: &str) -> Self {
            let connector = FakeConnector::default();
            connector
                .device
                .lock()
                .unwrap()
                .replies
                .insert(command.to_string(), reply.to_string());
            connector
        }

        pub fn failing_on(command: &str) -> Self {
            let connector = FakeConnector::default();
            connector.device.lock().unwrap().fail_on = Some(command.to_string());
            connector
        }

        pub fn sent_commands(&self) -> Vec<String> {
            self.commands
                .lock()
                .unwrap()
                .iter()
                .map(|(_, command)| command.clone())
                .collect()
        }
    }

    #[async_trait]
    impl DeviceConnector for FakeConnector {
        async fn connect(&self, profile: &DeviceProfile) -> Result<SessionHandle, AgentError> {
            if self.refuse_connect {
                return Err(AgentError::Connection {
                    host: profile.host.clone(),
                    reason: "connection refused".to_string(),
                });
            }
            let index = self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSession {
                index,
                shared: self.clone(),
            }))
        }
    }

    pub(crate) struct FakeSession {
        pub index: usize,
        shared: FakeConnector,
    }

    #[async_trait]
    impl DeviceSession for FakeSession {
        async fn send_command(&mut self, command: &str) -> Result<String, AgentError> {
            self.shared
                .commands
                .lock()
                .unwrap()
                .push((self.index, command.to_string()));

            let mut device = self.shared.device.lock().unwrap();
            if device.fail_on.as_deref() == Some(command) {
                return Err(AgentError::RemoteCommand("channel failure".to_string()));
            }

            if let Some(reply) = device.replies.get(command) {
                return Ok(reply.clone());
            }

            if command.starts_with("show running-config interface") {
                let body = if device.admin_down { " shutdown\n" } else { "" };
                return Ok(format!("Building configuration...\n!\ninterface Fake0\n{}end\n", body));
            }

            if command.starts_with("configure terminal") {
                if command.lines().any(|line| line.trim() == "no shutdown") {
                    device.admin_down = false;
                } else if command.lines().any(|line| line.trim() == "shutdown") {
                    device.admin_down = true;
                }
                return Ok(String::new());
            }

            Ok(format!("output of `{}`", command))
        }

        async fn close(&mut self) -> Result<(), AgentError> {
            self.shared.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    pub(crate) fn test_profile() -> DeviceProfile {
        use crate::netops::config::DeviceType;
        DeviceProfile {
            device_type: DeviceType::CiscoIos,
            host: "192.0.2.1".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    }
}
