use crate::llm::completions::CompletionsChat;
use crate::config::Config;
use crate::error::Error;
use crate::request::Client;
use crate::tools::{ToolChoice, ToolSpec};
use super::Message;

/// Chat with LLM with storing history.
pub trait LLMChat {

    /// Add input messages to the message history.
    /// Input messages contains user message(s), and tool call results.
    /// Returns n messages as the result, and/or tool call requests.
    fn get_inference(&mut self, messages: &[Message], tools: ToolChoice) -> Result<Vec<Message>, Error>;

    /// Clear chat history. The system prompt is kept.
    fn clear_history(&mut self);

    /// Update system prompt.
    fn set_system_prompt(&mut self, prompt: String);
}

/// Create LLMChat instance.
pub fn get_llm_chat(config: Config, client: Box<dyn Client>, tools: Vec<ToolSpec>) -> Result<Box<dyn LLMChat>, Error> {
    if config.n.is_some_and(|n| n != 1) {
        return Err(Error::InvalidArgument("only n=1 is supported"));
    }
    Ok(Box::new(CompletionsChat::new(config, client, tools)))
}
