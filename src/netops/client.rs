//! russh-backed device transport.
//!
//! Connection lifecycle per tool invocation:
//!
//! 1. Parse the profile host into host and port components (`host:port`
//!    format with default port 22).
//! 2. Build the russh client configuration with timeout and keepalive.
//! 3. Establish the TCP connection, bounded by the connection timeout.
//! 4. Authenticate with the profile's username/password.
//! 5. Execute commands on exec channels, collecting stdout and stderr.
//!
//! There is no retry: a single failed attempt surfaces immediately as
//! [`AgentError::Connection`]. Device-side rejections (`% Invalid
//! input ...`) arrive in the collected text and are passed through to
//! the caller; only transport-level failures become errors.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::{client, ChannelMsg, Disconnect};
use tracing::debug;

use super::config::{DeviceProfile, Settings};
use super::error::AgentError;
use super::session::{ClientHandler, DeviceConnector, DeviceSession, SessionHandle};

/// Build the russh client configuration.
///
/// Keepalives run every 30 seconds with a cap of 3 missed probes; the
/// inactivity timeout closes sessions abandoned mid-invocation.
pub(crate) fn build_client_config(timeout: Duration) -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

/// Parse an address string into host and port components.
///
/// Supports `host:port` and bare `host` (default SSH port 22). Uses
/// `rsplit_once` so bracketed IPv6 literals (`[::1]:22`) keep their
/// brackets on the host side.
pub(crate) fn parse_address(address: &str) -> Result<(String, u16), String> {
    if let Some((host, port_str)) = address.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|e| format!("invalid port number: {}", e))?;
        Ok((host.to_string(), port))
    } else {
        Ok((address.to_string(), 22))
    }
}

/// Connector opening one authenticated SSH session per tool invocation.
pub struct SshConnector {
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl SshConnector {
    pub fn new(settings: &Settings) -> Self {
        SshConnector {
            connect_timeout: settings.connect_timeout,
            command_timeout: settings.command_timeout,
        }
    }
}

fn connection_error(profile: &DeviceProfile, reason: String) -> AgentError {
    AgentError::Connection {
        host: profile.host.clone(),
        reason,
    }
}

#[async_trait]
impl DeviceConnector for SshConnector {
    async fn connect(&self, profile: &DeviceProfile) -> Result<SessionHandle, AgentError> {
        let (host, port) = parse_address(&profile.host)
            .map_err(|reason| connection_error(profile, reason))?;

        let config = build_client_config(self.connect_timeout);
        let connect_future = client::connect(config, (host.as_str(), port), ClientHandler);

        let mut handle = tokio::time::timeout(self.connect_timeout, connect_future)
            .await
            .map_err(|_| {
                connection_error(
                    profile,
                    format!("connection timed out after {:?}", self.connect_timeout),
                )
            })?
            .map_err(|e| connection_error(profile, format!("failed to connect: {}", e)))?;

        let auth = handle
            .authenticate_password(&profile.username, &profile.password)
            .await
            .map_err(|e| {
                connection_error(profile, format!("password authentication failed: {}", e))
            })?;

        if !auth.success() {
            return Err(connection_error(
                profile,
                "authentication rejected".to_string(),
            ));
        }

        debug!(host = %profile.host, username = %profile.username, "authenticated");

        Ok(Box::new(SshSession {
            handle,
            command_timeout: self.command_timeout,
        }))
    }
}

/// One open SSH connection. Commands run on fresh exec channels; a
/// newline-joined batch shares a single channel so configuration mode
/// survives the sequence.
pub struct SshSession {
    handle: client::Handle<ClientHandler>,
    command_timeout: Duration,
}

#[async_trait]
impl DeviceSession for SshSession {
    async fn send_command(&mut self, command: &str) -> Result<String, AgentError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| AgentError::RemoteCommand(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| AgentError::RemoteCommand(format!("failed to dispatch command: {}", e)))?;

        let mut stdout = Vec::with_capacity(4096);
        let mut stderr = Vec::with_capacity(1024);

        let collected = tokio::time::timeout(self.command_timeout, async {
            loop {
                match channel.wait().await {
                    Some(ChannelMsg::Data { data }) => {
                        stdout.extend_from_slice(&data);
                    }
                    Some(ChannelMsg::ExtendedData { data, ext }) => {
                        // ext == 1 is stderr in the SSH protocol
                        if ext == 1 {
                            stderr.extend_from_slice(&data);
                        }
                    }
                    Some(ChannelMsg::ExitStatus { .. }) => {
                        // Device-side errors surface in the output text.
                    }
                    Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => break,
                    Some(_) => {}
                }
            }
        })
        .await;

        let _ = channel.close().await;

        if collected.is_err() {
            return Err(AgentError::RemoteCommand(format!(
                "command timed out after {:?}: {}",
                self.command_timeout, command
            )));
        }

        let mut output = String::from_utf8_lossy(&stdout).into_owned();
        if !stderr.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&String::from_utf8_lossy(&stderr));
        }
        Ok(output)
    }

    async fn close(&mut self) -> Result<(), AgentError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "session closed", "en")
            .await
            .map_err(|e| AgentError::RemoteCommand(format!("disconnect failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod address_parsing {
        use super::*;

        #[test]
        fn test_host_with_port() {
            let (host, port) = parse_address("192.0.2.1:2222").unwrap();
            assert_eq!(host, "192.0.2.1");
            assert_eq!(port, 2222);
        }

        #[test]
        fn test_host_without_port_defaults_to_22() {
            let (host, port) = parse_address("edge-router-1").unwrap();
            assert_eq!(host, "edge-router-1");
            assert_eq!(port, 22);
        }

        #[test]
        fn test_bracketed_ipv6_with_port() {
            let (host, port) = parse_address("[2001:db8::1]:22").unwrap();
            assert_eq!(host, "[2001:db8::1]");
            assert_eq!(port, 22);
        }

        #[test]
        fn test_invalid_port_returns_error() {
            let result = parse_address("edge-router-1:console");
            assert!(result.is_err());
            assert!(result.unwrap_err().contains("invalid port number"));
        }

        #[test]
        fn test_port_out_of_range() {
            assert!(parse_address("edge-router-1:99999").is_err());
        }
    }

    mod client_config {
        use super::*;

        #[test]
        fn test_builds_config_with_timeout() {
            let config = build_client_config(Duration::from_secs(45));
            assert_eq!(config.inactivity_timeout, Some(Duration::from_secs(45)));
        }

        #[test]
        fn test_builds_config_with_keepalive() {
            let config = build_client_config(Duration::from_secs(30));
            assert_eq!(config.keepalive_interval, Some(Duration::from_secs(30)));
            assert_eq!(config.keepalive_max, 3);
        }
    }
}
