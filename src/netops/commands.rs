//! The device operation tools.
//!
//! Each tool validates its own arguments, acquires a scoped session,
//! issues its command(s), and returns the device's plain-text output.
//! Nothing is cached between invocations; every call opens and closes
//! its own connection.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use once_cell::sync::Lazy;
use serde_json::Value;

use super::config::DeviceProfile;
use super::error::AgentError;
use super::registry::{parse_args, schema_value, AgentTool};
use super::session::{with_session, DeviceConnector, SessionHandle};
use super::types::{
    AdminState, GetRouteProtoStateArgs, GetRouteTableArgs, GetVersionArgs, IfaceConfigArgs,
    PingArgs, ProtoStateKind, RouteFamily, RouteProtocol,
};

/// Command templates per (protocol, state-kind) pair. Narrowing a
/// deployment means removing entries here, not editing tool logic; a
/// pair absent from the table is rejected during validation.
static PROTO_STATE_COMMANDS: Lazy<HashMap<(RouteProtocol, ProtoStateKind), &'static str>> =
    Lazy::new(|| {
        HashMap::from([
            (
                (RouteProtocol::Bgp, ProtoStateKind::Summary),
                "show ip bgp summary",
            ),
            (
                (RouteProtocol::Bgp, ProtoStateKind::Neighbors),
                "show ip bgp neighbors",
            ),
            (
                (RouteProtocol::Ospf, ProtoStateKind::Neighbors),
                "show ip ospf neighbor",
            ),
            (
                (RouteProtocol::Ospf, ProtoStateKind::Summary),
                "show ip ospf",
            ),
        ])
    });

/// Retrieve the device's software version information.
pub struct GetVersion {
    connector: Arc<dyn DeviceConnector>,
    profile: DeviceProfile,
}

impl GetVersion {
    pub fn new(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        GetVersion { connector, profile }
    }
}

#[async_trait]
impl AgentTool for GetVersion {
    fn name(&self) -> &'static str {
        "GetVersion"
    }

    fn description(&self) -> &'static str {
        "Run 'show version' on the router and return the raw output. Takes no arguments."
    }

    fn schema(&self) -> Value {
        schema_value::<GetVersionArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let GetVersionArgs {} = parse_args(args)?;
        with_session(self.connector.as_ref(), &self.profile, |session: &mut SessionHandle| {
            async move { session.send_command("show version").await }.boxed()
        })
        .await
    }
}

/// Retrieve the IPv4 or IPv6 routing table.
pub struct GetRouteTable {
    connector: Arc<dyn DeviceConnector>,
    profile: DeviceProfile,
}

impl GetRouteTable {
    pub fn new(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        GetRouteTable { connector, profile }
    }
}

#[async_trait]
impl AgentTool for GetRouteTable {
    fn name(&self) -> &'static str {
        "GetRouteTable"
    }

    fn description(&self) -> &'static str {
        "Show the router's routing table. 'family' is 'ipv4' or 'ipv6'; defaults to ipv4."
    }

    fn schema(&self) -> Value {
        schema_value::<GetRouteTableArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let args: GetRouteTableArgs = parse_args(args)?;
        let command = match args.family {
            RouteFamily::Ipv4 => "show ip route",
            RouteFamily::Ipv6 => "show ipv6 route",
        };
        with_session(self.connector.as_ref(), &self.profile, move |session: &mut SessionHandle| {
            async move { session.send_command(command).await }.boxed()
        })
        .await
    }
}

/// Inspect dynamic routing protocol state (BGP/OSPF).
pub struct GetRouteProtoState {
    connector: Arc<dyn DeviceConnector>,
    profile: DeviceProfile,
}

impl GetRouteProtoState {
    pub fn new(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        GetRouteProtoState { connector, profile }
    }
}

#[async_trait]
impl AgentTool for GetRouteProtoState {
    fn name(&self) -> &'static str {
        "GetRouteProtoState"
    }

    fn description(&self) -> &'static str {
        "Show dynamic routing protocol state. 'protocol' is 'bgp' or 'ospf'; \
         'state' is 'neighbors' or 'summary'."
    }

    fn schema(&self) -> Value {
        schema_value::<GetRouteProtoStateArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let args: GetRouteProtoStateArgs = parse_args(args)?;
        let command = *PROTO_STATE_COMMANDS
            .get(&(args.protocol, args.state))
            .ok_or_else(|| {
                AgentError::Validation(format!(
                    "unsupported state query: {} {}",
                    args.protocol, args.state
                ))
            })?;
        with_session(self.connector.as_ref(), &self.profile, move |session: &mut SessionHandle| {
            async move { session.send_command(command).await }.boxed()
        })
        .await
    }
}

/// Ping a destination address from the router.
pub struct Ping {
    connector: Arc<dyn DeviceConnector>,
    profile: DeviceProfile,
}

impl Ping {
    pub fn new(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        Ping { connector, profile }
    }
}

#[async_trait]
impl AgentTool for Ping {
    fn name(&self) -> &'static str {
        "Ping"
    }

    fn description(&self) -> &'static str {
        "Ping a destination from the router and return the packet-loss/latency summary. \
         'target' must be an IPv4 or IPv6 address."
    }

    fn schema(&self) -> Value {
        schema_value::<PingArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let args: PingArgs = parse_args(args)?;
        // Only a syntactically valid address literal ever reaches the
        // remote command line.
        let target: IpAddr = args.target.trim().parse().map_err(|_| {
            AgentError::Validation(format!(
                "'{}' is not an IPv4 or IPv6 address",
                args.target
            ))
        })?;
        let command = format!("ping {}", target);
        with_session(self.connector.as_ref(), &self.profile, move |session: &mut SessionHandle| {
            async move { session.send_command(&command).await }.boxed()
        })
        .await
    }
}

/// Change an interface's administrative state, with a read-before-write
/// precheck so repeated identical calls never re-apply the command.
pub struct IfaceConfig {
    connector: Arc<dyn DeviceConnector>,
    profile: DeviceProfile,
}

impl IfaceConfig {
    pub fn new(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        IfaceConfig { connector, profile }
    }
}

#[async_trait]
impl AgentTool for IfaceConfig {
    fn name(&self) -> &'static str {
        "IfaceConfig"
    }

    fn description(&self) -> &'static str {
        "Shut down or bring up an interface. 'interface' is the device-native name \
         (e.g. 'GigabitEthernet0/1'); 'state' is 'shutdown' or 'no_shutdown'. \
         Checks the current state first and skips the change if it already matches."
    }

    fn schema(&self) -> Value {
        schema_value::<IfaceConfigArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<String, AgentError> {
        let args: IfaceConfigArgs = parse_args(args)?;
        let interface = validate_interface_name(&args.interface)?;
        let desired = args.state;

        with_session(self.connector.as_ref(), &self.profile, move |session: &mut SessionHandle| {
            async move {
                let query = format!("show running-config interface {}", interface);
                let current = session.send_command(&query).await?;

                if let Some(line) = device_error_line(&current) {
                    // The precondition could not be verified; never
                    // configure blind.
                    return Err(AgentError::RemoteCommand(line.to_string()));
                }

                let currently_shut = interface_is_shutdown(&current);
                let wants_shut = desired == AdminState::Shutdown;
                if currently_shut == wants_shut {
                    return Ok(format!(
                        "Interface {} is already {}; no change applied.",
                        interface,
                        desired.label()
                    ));
                }

                // One exec channel for the whole batch so configuration
                // mode survives the sequence.
                let batch = format!(
                    "configure terminal\ninterface {}\n{}\nend",
                    interface,
                    desired.command()
                );
                let applied = session.send_command(&batch).await?;

                let mut message = format!(
                    "Applied '{}' to interface {}.",
                    desired.command(),
                    interface
                );
                if !applied.trim().is_empty() {
                    message.push('\n');
                    message.push_str(applied.trim());
                }
                Ok(message)
            }
            .boxed()
        })
        .await
    }
}

fn validate_interface_name(raw: &str) -> Result<String, AgentError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AgentError::validation("interface name is empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AgentError::Validation(format!(
            "invalid interface name: '{}'",
            raw
        )));
    }
    Ok(name.to_string())
}

/// IOS reports a rejected command with a `%`-prefixed line.
fn device_error_line(output: &str) -> Option<&str> {
    output.lines().map(str::trim).find(|line| line.starts_with('%'))
}

/// The running config lists a bare `shutdown` line only when the
/// interface is administratively down.
fn interface_is_shutdown(running_config: &str) -> bool {
    running_config.lines().any(|line| line.trim() == "shutdown")
}
