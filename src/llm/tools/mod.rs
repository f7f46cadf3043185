use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub mod call_actions;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),
    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),
    #[error("Tool execution was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Success(String), // Confirmation text handed back to the model
}

impl ToolResult {
    pub fn text(&self) -> &str {
        match self {
            ToolResult::Success(text) => text,
        }
    }
}

/// An action the conversation model may invoke during a call
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Value,
    /// What invoking the action does outside the conversation
    pub side_effect: String,
}

pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool
    pub fn register_tool(&mut self, tool: Tool) {
        self.tools.push(tool);
    }

    /// Get available tools
    pub fn get_tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Find a tool by name
    pub fn find_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Execute a registered tool by name with cancellation support.
    /// `room` is the call the invocation belongs to and tags its log lines.
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: Value,
        room: &str,
        cancel_token: CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        if cancel_token.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        if self.find_tool(name).is_none() {
            return Err(ToolError::NotFound(format!("Tool '{}' not found", name)));
        }

        match name {
            call_actions::END_CALL => call_actions::end_call(arguments, room, cancel_token).await,
            call_actions::SEND_INFO => {
                call_actions::send_info(arguments, room, cancel_token).await
            }
            call_actions::SCHEDULE_DEMO => {
                call_actions::schedule_demo(arguments, room, cancel_token).await
            }
            _ => Err(ToolError::NotFound(format!("Tool '{}' has no handler", name))),
        }
    }

    /// Get tool definitions for LLM function calling
    pub fn get_tool_definitions(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize the registry with every action an outbound call agent offers
pub fn create_call_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register_tool(Tool {
        name: call_actions::END_CALL.to_string(),
        description: "End the call when the conversation is complete".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        }),
        side_effect: "none; returns a farewell line".to_string(),
    });

    registry.register_tool(Tool {
        name: call_actions::SEND_INFO.to_string(),
        description: "Offer to send more information about the company after the call"
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "channel": {
                    "type": "string",
                    "enum": ["whatsapp", "email"],
                    "description": "How the person wants to receive the information"
                }
            },
            "required": ["channel"]
        }),
        side_effect: "none; no message is actually sent".to_string(),
    });

    registry.register_tool(Tool {
        name: call_actions::SCHEDULE_DEMO.to_string(),
        description: "Schedule a product demo at a time that suits the person".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "preferred_time": {
                    "type": "string",
                    "description": "When the person would like the demo, in their own words"
                }
            },
            "required": []
        }),
        side_effect: "none; no calendar entry is created".to_string(),
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_registry_creation() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.get_tools().len(), 0);
    }

    #[test]
    fn test_tool_definitions() {
        let registry = create_call_registry();

        let definitions = registry.get_tool_definitions();
        assert_eq!(definitions.len(), 3);
        assert_eq!(definitions[0]["type"], "function");
        assert_eq!(definitions[0]["function"]["name"], "end_call");
        assert_eq!(
            definitions[1]["function"]["parameters"]["required"],
            json!(["channel"])
        );
    }

    #[test]
    fn test_call_registry_lists_side_effects() {
        let registry = create_call_registry();
        for name in ["end_call", "send_info", "schedule_demo"] {
            let tool = registry.find_tool(name).expect("registered");
            assert!(tool.side_effect.starts_with("none"));
        }
    }

    #[tokio::test]
    async fn test_unregistered_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let result = registry
            .execute_tool("end_call", json!({}), "call-0000-1", CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_execute_send_info() {
        let registry = create_call_registry();
        let result = registry
            .execute_tool(
                "send_info",
                json!({"channel": "email"}),
                "call-0000-1",
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(result.text().contains("email"));
    }

    #[tokio::test]
    async fn test_execute_cancelled() {
        let registry = create_call_registry();
        let cancel_token = CancellationToken::new();
        cancel_token.cancel();

        let result = registry
            .execute_tool("end_call", json!({}), "call-0000-1", cancel_token)
            .await;
        assert!(matches!(result, Err(ToolError::Cancelled)));
    }
}
