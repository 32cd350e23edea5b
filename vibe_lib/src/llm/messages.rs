use std::fmt::Display;
use serde_json::Value;


/// Speaker of a chat message, independent of the provider's wire names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Instructions that frame the conversation.
    System = 0,
    /// The language model (`assistant` on the wire).
    Model = 1,
    /// The person at the terminal.
    User = 2,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::System => "system",
            Role::Model => "assistant",
            Role::User => "user",
        })
    }
}

/// One entry of a conversation: plain text, a tool request from the model,
/// or the output of a tool sent back to it.
#[derive(Debug, Clone)]
pub enum Message {
    /// Text from the user or the model.
    Text(Text),
    /// Model asks to run a tool.
    ToolCall(ToolCall),
    /// Output of a tool run.
    ToolResult(ToolResult),
}

impl Message {
    /// Text message from `role`.
    pub fn text(role: Role, message: String) -> Self {
        Message::Text(Text { role, message })
    }

    /// Tool output answering the request `call_id`.
    pub fn tool_result(call_id: String, name: String, result: String) -> Self {
        Message::ToolResult(ToolResult { call_id, name, result })
    }

    #[cfg(test)]
    pub(crate) fn tool_use(call_id: String, name: String, params: Vec<ToolParam>) -> Self {
        Message::ToolCall(ToolCall { call_id, name, params })
    }

    /// Text content, `None` for tool requests and results.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Message::Text(txt) => Some(&txt.message),
            _ => None,
        }
    }
}

/// Text and its speaker.
#[derive(Debug, Clone)]
pub struct Text {
    /// Speaker.
    pub role: Role,
    /// Content.
    pub message: String,
}

/// Tool output returned to the model.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Id of the request this answers.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Output text, usually JSON.
    pub result: String
}

/// Tool run requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back in the result.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Decoded arguments.
    pub params: Vec<ToolParam>,
}

impl ToolCall {
    /// Argument value by name.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Named tool argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    /// Argument name.
    pub name: String,
    /// JSON value.
    pub value: Value,
}
