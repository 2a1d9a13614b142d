//! Adapter between the tool registry and the language-model loop.
//!
//! The reasoning agent is an external collaborator: it selects tools by
//! name and supplies JSON arguments, and this module only relays those
//! requests through the registry. Per-call tool failures are rendered
//! back to the model as error text so it can phrase a user-facing reply;
//! they never abort the run.

use llm::builder::{FunctionBuilder, LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, ChatProvider};
use llm::{FunctionCall, LLMProvider, ToolCall};
use serde_json::Value;
use tracing::{info, warn};

use super::config::Settings;
use super::error::AgentError;
use super::registry::ToolRegistry;

/// Upper bound on reasoning turns for a single request.
const MAX_TURNS: usize = 8;

const SYSTEM_PROMPT: &str = "You are a network operations assistant for a Cisco IOS router. \
Use the provided tools to inspect or change the device, and GetDate when the user refers to \
relative days such as 'tomorrow'. Base your answer on the tool output and keep it concise.";

pub struct NetworkAgent {
    provider: Box<dyn LLMProvider>,
    registry: ToolRegistry,
}

impl NetworkAgent {
    /// Build the OpenAI-backed provider with every registry tool
    /// registered as a callable function.
    pub fn new(settings: &Settings, registry: ToolRegistry) -> Result<Self, AgentError> {
        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::OpenAI)
            .api_key(settings.openai_api_key.clone())
            .model(settings.model.clone())
            .temperature(0.0)
            .system(SYSTEM_PROMPT);

        for spec in registry.list_tools() {
            builder = builder.function(
                FunctionBuilder::new(spec.name)
                    .description(spec.description)
                    .json_schema(spec.schema),
            );
        }

        let provider = builder.build()?;
        Ok(NetworkAgent { provider, registry })
    }

    /// Drive one user request to a final natural-language answer.
    pub async fn run(&self, request: &str) -> Result<String, AgentError> {
        drive(&*self.provider, &self.registry, request).await
    }
}

/// The tool-calling conversation loop: ask the model, execute any tool
/// calls it makes, feed the results back, and stop at the first plain
/// text answer.
pub(crate) async fn drive<P>(
    provider: &P,
    registry: &ToolRegistry,
    request: &str,
) -> Result<String, AgentError>
where
    P: ChatProvider + ?Sized,
{
    let mut messages = vec![ChatMessage::user().content(request).build()];

    for _ in 0..MAX_TURNS {
        let response = provider.chat(&messages).await?;

        let calls = response.tool_calls().unwrap_or_default();
        if calls.is_empty() {
            return Ok(response.text().unwrap_or_default());
        }

        messages.push(ChatMessage::assistant().tool_use(calls.clone()).build());

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let outcome = dispatch(registry, &call).await;
            results.push(ToolCall {
                id: call.id,
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: call.function.name,
                    arguments: outcome,
                },
            });
        }
        messages.push(ChatMessage::user().tool_result(results).build());
    }

    Err(AgentError::AgentLoop(MAX_TURNS))
}

/// Run one tool call. Errors become error text for the model, never a
/// process failure.
async fn dispatch(registry: &ToolRegistry, call: &ToolCall) -> String {
    info!(tool = %call.function.name, "model requested tool");

    let args = if call.function.arguments.trim().is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        match serde_json::from_str(&call.function.arguments) {
            Ok(value) => value,
            Err(e) => return format!("[error] arguments were not valid JSON: {}", e),
        }
    };

    match registry.invoke(&call.function.name, args).await {
        Ok(output) => output,
        Err(e) => {
            warn!(tool = %call.function.name, "tool failed: {}", e);
            format!("[error] {}", e)
        }
    }
}
