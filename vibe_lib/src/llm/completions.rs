use crate::llm::util::{role_to_llm, tool_params_to_value};
use crate::llm::LLMChat;
use crate::config::{Config, ModelProvider};
use crate::error::Error;
use crate::tools::{ToolChoice, ToolSpec};
use crate::val_as_str;
use serde_json::{json, Map, Value};
use tracing::debug;
use crate::request::Client;
use super::messages::Text;
use super::{Message, ToolCall, ToolParam};
use super::util::{self, llm_to_role};

/// Chat over the chat-completions API (OpenAI and Azure OpenAI).
pub struct CompletionsChat {
    system_prompt: Option<String>,
    history: Vec<Value>,
    config: Config,
    client: Box<dyn Client>,
    tools: Vec<ToolSpec>,
}

impl CompletionsChat {
    pub(super) fn new(config: Config, client: Box<dyn Client>, tools: Vec<ToolSpec>) -> Self {
        CompletionsChat {
            system_prompt: None,
            history: vec![],
            config,
            client,
            tools,
        }
    }

    fn prep_payload(&mut self, messages: &[Message], tools: ToolChoice) -> Value {

        let mut payload = json!({
            "model": self.config.name
        });

        for message in messages {
            match message {
                Message::Text(txt) => self.history.push(json!({
                    "role": role_to_llm(txt.role),
                    "content": txt.message
                })),
                Message::ToolResult(res) => self.history.push(json!({
                    "role": "tool",
                    "content": res.result,
                    "tool_call_id": res.call_id
                })),
                // Tool calls enter the history with the model response.
                Message::ToolCall(_) => {},
            }
        }

        let mut all_messages = Vec::with_capacity(self.history.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            all_messages.push(json!({
                "role": "system",
                "content": prompt,
            }));
        }
        all_messages.extend(self.history.iter().cloned());
        payload["messages"] = Value::Array(all_messages);

        let max_tokens_key = match self.config.provider {
            ModelProvider::OpenAI => "max_completion_tokens",
            ModelProvider::Azure => "max_tokens",
        };

        util::set_f64_param(&mut payload, "frequency_penalty", &self.config.frequency_penalty);
        util::set_f64_param(&mut payload, "presence_penalty", &self.config.presence_penalty);
        util::set_i64_param(&mut payload, "n", &self.config.n);
        util::set_f64_param(&mut payload, "top_p", &self.config.top_p);
        util::set_f64_param(&mut payload, "temperature", &self.config.temperature);
        util::set_i64_param(&mut payload, max_tokens_key, &self.config.max_tokens);

        if let Some(val) = &self.config.stop_sequence {
            payload["stop"] = Value::String(val.clone());
        }

        self.prep_tool_use(&mut payload, tools);

        payload
    }

    fn prep_tool_use(&self, payload: &mut Value, tools: ToolChoice) {
        if self.tools.is_empty() {
            return;
        }

        match tools {
            ToolChoice::None => return,
            ToolChoice::Auto => {
                payload["tool_choice"] = Value::String("auto".to_owned());
            },
            ToolChoice::CallOne => {
                payload["tool_choice"] = Value::String("required".to_owned());
            },
            ToolChoice::Force(tool) => {
                payload["tool_choice"] = json!({
                    "type": "function", 
                    "function": {
                        "name": tool
                    }
                });
            },
        };
        self.add_tools(payload);
    }

    fn add_tools(&self, payload: &mut Value) {
        let mut arr = Vec::with_capacity(self.tools.len());
        for spec in self.tools.iter() {
            let mut function = json!({
                "description": spec.description,
                "name": spec.name,
                "parameters": tool_params_to_value(&spec.params, self.config.provider),
            });
            if self.config.provider == ModelProvider::OpenAI {
                function["strict"] = Value::Bool(true);
            }
            arr.push(json!({
                "type": "function",
                "function": function
            }));
        }
        payload["tools"] = Value::Array(arr);
    }

    fn check_for_error(&self, response: &Value) -> Result<(), Error> {
        if let Some(error) = response.get("error") {
            let errmes = val_as_str!(error["message"], "error message").to_owned();
            return Err(Error::LLMErrorMessage(errmes));
        }
        Ok(())
    }

    // Keep only the fields the API accepts back in an assistant message.
    fn history_entry(msg: &Value) -> Value {
        let mut entry = Map::new();
        for key in ["role", "content", "tool_calls"] {
            if let Some(val) = msg.get(key) {
                if !val.is_null() {
                    entry.insert(key.to_owned(), val.clone());
                }
            }
        }
        if !entry.contains_key("content") {
            entry.insert("content".to_owned(), Value::Null);
        }
        Value::Object(entry)
    }

    fn parse_tool_call(call: &Value) -> Result<ToolCall, Error> {
        let call_id = val_as_str!(call["id"], "tool call id").to_owned();
        let name = val_as_str!(call["function"]["name"], "tool name").to_owned();
        let arguments = val_as_str!(call["function"]["arguments"], "tool arguments");

        let mut params = Vec::new();

        if !arguments.trim().is_empty() {
            let args_obj = serde_json::from_str::<Value>(arguments)?;

            for (k, v) in args_obj
                .as_object()
                .ok_or(Error::LLMResponseError("can't enumerate arguments."))?
            {
                params.push(ToolParam {name: k.clone(), value: v.clone()});
            }
        }

        Ok(ToolCall{call_id, name, params})
    }

    fn process_response(&mut self, response: Value) -> Result<Vec<Message>, Error> {

        self.check_for_error(&response)?;

        if let Some(usage) = response.get("usage") {
            debug!(prompt_tokens = %usage["prompt_tokens"], completion_tokens = %usage["completion_tokens"], "token usage");
        }

        let mut result = Vec::new();

        for choice in response["choices"].as_array()
            .ok_or(Error::LLMResponseError("unexpected answer format, can't enumerate response messages."))?
        {
            let msg = &choice["message"];

            self.history.push(Self::history_entry(msg));

            let role = llm_to_role(val_as_str!(msg["role"], "message role"))?;

            if !msg["content"].is_null() {
                let content = val_as_str!(msg["content"], "message content").to_owned();
                result.push(Message::Text(Text{role, message: content}));
            }

            if !msg["refusal"].is_null() {
                let content = val_as_str!(msg["refusal"], "refusal content").to_owned();
                result.push(Message::Text(Text{role, message: content}));
            }

            if !msg["tool_calls"].is_null() {
                for call in msg["tool_calls"].as_array()
                    .ok_or(Error::LLMResponseError("unexpected answer format, can't enumerate tool call requests."))?
                {
                    result.push(Message::ToolCall(Self::parse_tool_call(call)?));
                }
            }
        }

        Ok(result)
    }
}

impl LLMChat for CompletionsChat {

    fn get_inference(&mut self, messages: &[Message], tools: ToolChoice) -> Result<Vec<Message>, Error> {
        let payload = self.prep_payload(messages, tools);

        let response = match self.config.provider {
            ModelProvider::OpenAI => {
                let token = format!("Bearer {}", self.config.api_key);
                let headers = &[("Authorization", token.as_ref())];
                self.client.make_json_request(&self.config.api_url, payload, headers, &[])?
            },
            ModelProvider::Azure => {
                let headers = &[("api-key", self.config.api_key.as_ref())];
                let params: Vec<(&str, &str)> = self.config.api_version
                    .as_deref()
                    .map(|v| ("api-version", v))
                    .into_iter()
                    .collect();
                self.client.make_json_request(&self.config.api_url, payload, headers, &params)?
            },
        };

        self.process_response(response)
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn set_system_prompt(&mut self, prompt: String) {
        self.system_prompt = Some(prompt);
    }
}
