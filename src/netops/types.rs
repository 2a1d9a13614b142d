//! Serializable tool argument types.
//!
//! Every argument record derives `Deserialize` and `JsonSchema`: the
//! schema published to the agent and the validation applied on dispatch
//! come from the same definition, so an out-of-enumeration value is
//! rejected before any network action.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata describing one tool to the reasoning agent.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: Value,
}

/// Address family of a routing table query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RouteFamily {
    #[default]
    Ipv4,
    Ipv6,
}

impl fmt::Display for RouteFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteFamily::Ipv4 => write!(f, "ipv4"),
            RouteFamily::Ipv6 => write!(f, "ipv6"),
        }
    }
}

/// Dynamic routing protocol whose state can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RouteProtocol {
    Bgp,
    Ospf,
}

impl fmt::Display for RouteProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteProtocol::Bgp => write!(f, "bgp"),
            RouteProtocol::Ospf => write!(f, "ospf"),
        }
    }
}

/// Which view of a routing protocol's state to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProtoStateKind {
    Neighbors,
    Summary,
}

impl fmt::Display for ProtoStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtoStateKind::Neighbors => write!(f, "neighbors"),
            ProtoStateKind::Summary => write!(f, "summary"),
        }
    }
}

/// Desired administrative state of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminState {
    Shutdown,
    NoShutdown,
}

impl AdminState {
    /// The configuration command applying this state.
    pub fn command(self) -> &'static str {
        match self {
            AdminState::Shutdown => "shutdown",
            AdminState::NoShutdown => "no shutdown",
        }
    }

    /// Human-readable label for result messages.
    pub fn label(self) -> &'static str {
        match self {
            AdminState::Shutdown => "administratively down",
            AdminState::NoShutdown => "up",
        }
    }
}

/// Enumerated day offsets understood by the date helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DaySelector {
    Today,
    Tomorrow,
    DayAfterTomorrow,
}

impl DaySelector {
    pub(crate) fn offset_days(self) -> i64 {
        match self {
            DaySelector::Today => 0,
            DaySelector::Tomorrow => 1,
            DaySelector::DayAfterTomorrow => 2,
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetVersionArgs {}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct GetRouteTableArgs {
    /// Address family to query; defaults to ipv4.
    #[serde(default)]
    pub family: RouteFamily,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetRouteProtoStateArgs {
    /// Routing protocol to inspect.
    pub protocol: RouteProtocol,
    /// Which view of the protocol state to return.
    pub state: ProtoStateKind,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PingArgs {
    /// Destination IPv4 or IPv6 address, e.g. "192.0.2.1".
    pub target: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IfaceConfigArgs {
    /// Device-native interface name, e.g. "GigabitEthernet0/1".
    pub interface: String,
    /// Desired administrative state.
    pub state: AdminState,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDateArgs {
    /// Which day to resolve, relative to the current date in Japan.
    pub day: DaySelector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod enum_values {
        use super::*;

        #[test]
        fn test_route_family_accepts_declared_values() {
            let ipv4: RouteFamily = serde_json::from_value(json!("ipv4")).unwrap();
            let ipv6: RouteFamily = serde_json::from_value(json!("ipv6")).unwrap();
            assert_eq!(ipv4, RouteFamily::Ipv4);
            assert_eq!(ipv6, RouteFamily::Ipv6);
        }

        #[test]
        fn test_route_family_rejects_out_of_enumeration() {
            let result: Result<RouteFamily, _> = serde_json::from_value(json!("ipv5"));
            assert!(result.is_err());
        }

        #[test]
        fn test_admin_state_wire_names() {
            let shut: AdminState = serde_json::from_value(json!("shutdown")).unwrap();
            let no_shut: AdminState = serde_json::from_value(json!("no_shutdown")).unwrap();
            assert_eq!(shut, AdminState::Shutdown);
            assert_eq!(no_shut, AdminState::NoShutdown);
        }

        #[test]
        fn test_admin_state_commands() {
            assert_eq!(AdminState::Shutdown.command(), "shutdown");
            assert_eq!(AdminState::NoShutdown.command(), "no shutdown");
        }

        #[test]
        fn test_day_selector_offsets() {
            assert_eq!(DaySelector::Today.offset_days(), 0);
            assert_eq!(DaySelector::Tomorrow.offset_days(), 1);
            assert_eq!(DaySelector::DayAfterTomorrow.offset_days(), 2);
        }

        #[test]
        fn test_day_selector_rejects_unknown() {
            let result: Result<DaySelector, _> = serde_json::from_value(json!("yesterday"));
            assert!(result.is_err());
        }
    }

    mod argument_records {
        use super::*;

        #[test]
        fn test_route_table_family_defaults_to_ipv4() {
            let args: GetRouteTableArgs = serde_json::from_value(json!({})).unwrap();
            assert_eq!(args.family, RouteFamily::Ipv4);
        }

        #[test]
        fn test_proto_state_requires_both_fields() {
            let result: Result<GetRouteProtoStateArgs, _> =
                serde_json::from_value(json!({ "protocol": "bgp" }));
            assert!(result.is_err());
        }

        #[test]
        fn test_iface_config_args_round_trip() {
            let args: IfaceConfigArgs = serde_json::from_value(json!({
                "interface": "GigabitEthernet0/1",
                "state": "no_shutdown"
            }))
            .unwrap();
            assert_eq!(args.interface, "GigabitEthernet0/1");
            assert_eq!(args.state, AdminState::NoShutdown);
        }
    }

    mod schemas {
        use super::*;
        use schemars::schema_for;

        #[test]
        fn test_proto_state_schema_lists_enumerations() {
            let schema = serde_json::to_value(schema_for!(GetRouteProtoStateArgs)).unwrap();
            let rendered = schema.to_string();
            assert!(rendered.contains("bgp"));
            assert!(rendered.contains("ospf"));
            assert!(rendered.contains("neighbors"));
            assert!(rendered.contains("summary"));
        }

        #[test]
        fn test_admin_state_schema_lists_wire_names() {
            let schema = serde_json::to_value(schema_for!(IfaceConfigArgs)).unwrap();
            let rendered = schema.to_string();
            assert!(rendered.contains("no_shutdown"));
        }
    }
}
