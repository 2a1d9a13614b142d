//! Named tool dispatch exposed to the reasoning agent.
//!
//! The agent selects a tool by name and supplies a JSON argument record;
//! the registry validates both before any tool logic runs. Unknown names
//! and schema-violating arguments fail fast with a validation error and
//! never cause a partial network side effect.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use super::commands::{GetRouteProtoState, GetRouteTable, GetVersion, IfaceConfig, Ping};
use super::config::DeviceProfile;
use super::dates::GetDate;
use super::error::AgentError;
use super::session::DeviceConnector;
use super::types::ToolSpec;

/// One named, schema-validated operation.
#[async_trait]
pub trait AgentTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> Value;
    async fn invoke(&self, args: Value) -> Result<String, AgentError>;
}

/// Deserialize a tool's argument record, mapping schema violations to a
/// validation error before anything else happens.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, AgentError> {
    serde_json::from_value(args).map_err(|e| AgentError::Validation(e.to_string()))
}

/// Render a type's JSON schema for publication to the agent.
pub(crate) fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T))
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

pub struct ToolRegistry {
    tools: Vec<Arc<dyn AgentTool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn AgentTool>>) -> Self {
        ToolRegistry { tools }
    }

    /// The full tool set: the five device operations plus the date
    /// helper.
    pub fn with_device_tools(connector: Arc<dyn DeviceConnector>, profile: DeviceProfile) -> Self {
        ToolRegistry::new(vec![
            Arc::new(GetVersion::new(connector.clone(), profile.clone())),
            Arc::new(GetRouteTable::new(connector.clone(), profile.clone())),
            Arc::new(GetRouteProtoState::new(connector.clone(), profile.clone())),
            Arc::new(Ping::new(connector.clone(), profile.clone())),
            Arc::new(IfaceConfig::new(connector, profile)),
            Arc::new(GetDate),
        ])
    }

    pub fn list_tools(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                schema: tool.schema(),
            })
            .collect()
    }

    pub async fn invoke(&self, name: &str, args: Value) -> Result<String, AgentError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| AgentError::Validation(format!("unknown tool: {}", name)))?;

        info!(tool = name, "invoking tool");
        tool.invoke(args).await
    }
}
