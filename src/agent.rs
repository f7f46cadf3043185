use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::llm::prompts::{PromptVariant, SystemPrompts};
use crate::llm::tools::{create_call_registry, ToolError, ToolRegistry, ToolResult};
use crate::session::{AgentSession, ReplyOptions, SessionError};

/// Conversational agent for one outbound call
pub struct OutboundCallAgent {
    room: String,
    caller_name: String,
    company_name: String,
    instructions: String,
    tools: ToolRegistry,
}

impl OutboundCallAgent {
    /// Build the agent; its instructions are fixed from here on.
    pub fn new(
        caller_name: impl Into<String>,
        company_name: impl Into<String>,
        variant: PromptVariant,
    ) -> Self {
        let caller_name = caller_name.into();
        let company_name = company_name.into();
        let instructions = SystemPrompts::outbound_call(variant, &caller_name, &company_name);

        Self {
            room: String::new(),
            caller_name,
            company_name,
            instructions,
            tools: create_call_registry(),
        }
    }

    /// Bind the agent to the room it will talk in; its log lines carry the room name.
    pub fn in_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn caller_name(&self) -> &str {
        &self.caller_name
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// System prompt for the conversation model
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// The line the agent opens the call with
    pub fn greeting(&self) -> String {
        SystemPrompts::greeting(&self.caller_name, &self.company_name)
    }

    /// Actions the conversation model may invoke
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Called by the session once the agent is live in the room.
    ///
    /// The agent speaks first, and the greeting cannot be interrupted.
    pub fn on_enter(&self, session: &dyn AgentSession) -> Result<(), SessionError> {
        log::info!(
            room = self.room.as_str();
            "Agent entered call - caller: {}, company: {}",
            self.caller_name,
            self.company_name
        );
        session.generate_reply(ReplyOptions {
            allow_interruptions: false,
        })
    }

    /// Run an action on behalf of the conversation model
    pub async fn invoke_tool(
        &self,
        name: &str,
        arguments: Value,
        cancel_token: CancellationToken,
    ) -> Result<ToolResult, ToolError> {
        self.tools
            .execute_tool(name, arguments, &self.room, cancel_token)
            .await
    }
}
