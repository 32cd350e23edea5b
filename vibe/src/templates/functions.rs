use tracing::debug;
use vibe_lib::llm::{LLMChat, Message, Role, ToolCall};
use vibe_lib::tools::ToolChoice;
use crate::error::AppError;
use crate::term::Console;
use crate::tools::Toolbox;
use super::{first_text, Session};

/// Native tool calling; the conversation is kept across turns.
pub struct Functions {
    chat: Box<dyn LLMChat>,
    toolbox: Toolbox,
}

impl Functions {
    /// Create an instance.
    pub fn new(chat: Box<dyn LLMChat>, toolbox: Toolbox) -> Self {
        Functions { chat, toolbox }
    }

    fn call_tools(&self, calls: &[&ToolCall], console: &mut dyn Console) -> Result<Vec<Message>, AppError> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let args = call.params.iter()
                .map(|p| format!("{}={}", p.name, p.value))
                .collect::<Vec<_>>()
                .join(", ");
            console.tool(&call.name, &format!("Calling function with args: {args}"));

            let output = self.toolbox.call(&call.name, &call.params)?;
            console.tool(&call.name, &format!("Tool output: {output}"));

            results.push(Message::tool_result(call.call_id.clone(), call.name.clone(), output));
        }

        Ok(results)
    }
}

impl Session for Functions {
    fn title(&self) -> &'static str {
        "I am an AI agent with native tool-calling ability."
    }

    fn intro(&self) -> Vec<String> {
        vec!["For example: 'What is the weather like in London?'".to_owned()]
    }

    fn help(&self) -> &'static str {
        "Ask about the weather in a city. The model decides whether to call\n\
the get_current_weather tool; tool calls and their output are shown."
    }

    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError> {
        console.info("Checking if a tool is needed...");
        let response = self.chat.get_inference(&[Message::text(Role::User, input.to_owned())], ToolChoice::Auto)?;

        let calls: Vec<&ToolCall> = response.iter()
            .filter_map(|m| match m {
                Message::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect();

        if response.iter().any(|m| matches!(m, Message::ToolResult(_))) {
            return Err(AppError::ApplicationError("Unexpected \"tool result\" message from LLM."));
        }

        let answer = if calls.is_empty() {
            first_text(&response).map(str::to_owned)
        } else {
            console.info("Tool call requested by the model.");
            let results = self.call_tools(&calls, console)?;
            debug!(calls = results.len(), "sending tool results");

            console.info("Getting final response from model...");
            let final_response = self.chat.get_inference(&results, ToolChoice::None)?;
            first_text(&final_response).map(str::to_owned)
        };

        console.assistant(answer.as_deref().unwrap_or_default());
        Ok(())
    }
}
