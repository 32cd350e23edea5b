use serde_json::Value;
use tracing::debug;
use vibe_lib::llm::{LLMChat, Message, Role, ToolParam as InputParam};
use vibe_lib::tools::ToolChoice;
use vibe_lib::Config as ModelParams;
use crate::error::AppError;
use crate::prompts::answer_with_tool_output;
use crate::term::Console;
use crate::tools::Toolbox;
use super::{first_text, Session};

/// Tool requested by the reasoning step.
#[derive(Debug, PartialEq)]
pub struct ToolRequest {
    /// Tool name.
    pub name: String,
    /// Arguments in request order.
    pub params: Vec<InputParam>,
}

/// Parse `{"tool_call": {...}}` or `{"tool_call": null}`, optionally wrapped in a code fence.
pub fn parse_tool_request(reply: &str) -> Result<Option<ToolRequest>, AppError> {
    let mut body = reply.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the language tag line.
        body = rest.split_once('\n').map_or("", |(_, b)| b);
        body = body.trim_end().strip_suffix("```").unwrap_or(body).trim();
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::Error(format!("the model did not return a valid tool request: {e}")))?;

    let call = match value.get("tool_call") {
        None | Some(Value::Null) => return Ok(None),
        Some(call) => call,
    };

    let name = call.get("name")
        .and_then(Value::as_str)
        .ok_or(AppError::ApplicationError("tool request without a tool name."))?;

    let params = match call.get("arguments") {
        Some(Value::Object(args)) => args.iter()
            .map(|(k, v)| InputParam { name: k.clone(), value: v.clone() })
            .collect(),
        None | Some(Value::Null) => vec![],
        Some(_) => return Err(AppError::ApplicationError("tool request arguments must be an object.")),
    };

    Ok(Some(ToolRequest { name: name.to_owned(), params }))
}

/// ReAct agent: reason about a tool, act, then answer.
pub struct Agent {
    reason: Box<dyn LLMChat>,
    answer: Box<dyn LLMChat>,
    toolbox: Toolbox,
}

impl Agent {
    /// Create an instance.
    pub fn new(reason: Box<dyn LLMChat>, answer: Box<dyn LLMChat>, toolbox: Toolbox) -> Self {
        Agent { reason, answer, toolbox }
    }

    /// Model parameters of the reasoning and the answering steps.
    pub fn model_params(params: Option<&ModelParams>) -> Result<(ModelParams, ModelParams), AppError> {
        let params = params.ok_or_else(|| AppError::MissingArgError("chat model".into()))?;

        let mut reason = params.clone();
        reason.temperature = Some(0.0);
        reason.max_tokens = Some(150);

        Ok((reason, params.clone().with_defaults(0.7, 250)))
    }
}

impl Session for Agent {
    fn title(&self) -> &'static str {
        "I am a basic AI agent. Ask me something that requires a tool."
    }

    fn intro(&self) -> Vec<String> {
        vec!["For example: 'What is the weather like in San Francisco?'".to_owned()]
    }

    fn help(&self) -> &'static str {
        "The agent first asks the model whether a tool is needed, runs the\n\
requested tool, then asks the model for a final answer using its output."
    }

    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError> {
        console.info("Thinking...");
        self.reason.clear_history();
        let reply = self.reason.get_inference(&[Message::text(Role::User, input.to_owned())], ToolChoice::None)?;
        let reply = first_text(&reply)
            .ok_or(AppError::ApplicationError("the model returned no tool decision."))?;
        debug!(reply, "tool decision");

        let prompt = match parse_tool_request(reply)? {
            Some(request) => {
                let args = Value::Object(request.params.iter()
                    .map(|p| (p.name.clone(), p.value.clone()))
                    .collect());
                console.tool(&request.name, &format!("Using tool with arguments {args}"));

                let output = self.toolbox.call(&request.name, &request.params)?;
                console.tool(&request.name, &format!("Tool output: {output}"));

                answer_with_tool_output(input, &output)
            },
            None => {
                console.info("No tool needed. Generating a direct response.");
                input.to_owned()
            }
        };

        self.answer.clear_history();
        let response = self.answer.get_inference(&[Message::text(Role::User, prompt)], ToolChoice::None)?;
        console.assistant(first_text(&response).unwrap_or_default());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::templates::fakes::ScriptedChat;
    use crate::term::Transcript;
    use super::*;

    #[test]
    fn test_parse_tool_request() {
        let req = parse_tool_request(r#"{"tool_call": {"name": "get_current_weather", "arguments": {"city": "Paris"}}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(req.name, "get_current_weather");
        assert_eq!(req.params, vec![InputParam { name: "city".into(), value: Value::String("Paris".into()) }]);

        assert_eq!(parse_tool_request(r#"{"tool_call": null}"#).unwrap(), None);
        assert_eq!(parse_tool_request("{}").unwrap(), None);

        let fenced = "```json\n{\"tool_call\": {\"name\": \"x\", \"arguments\": {}}}\n```";
        assert_eq!(parse_tool_request(fenced).unwrap().unwrap().name, "x");

        assert!(parse_tool_request("Sure! The weather is nice.").is_err());
        assert!(parse_tool_request(r#"{"tool_call": {"arguments": {}}}"#).is_err());
    }

    #[test]
    fn test_react_turn() {
        let (reason, reason_seen) = ScriptedChat::new(vec![Ok(vec![Message::text(
            Role::Model,
            r#"{"tool_call": {"name": "get_current_weather", "arguments": {"city": "San Francisco"}}}"#.into(),
        )])]);
        let (answer, answer_seen) = ScriptedChat::new(vec![
            Ok(vec![Message::text(Role::Model, "Sunny and 75°F.".into())]),
        ]);
        let mut agent = Agent::new(Box::new(reason), Box::new(answer), Toolbox::weather());
        let mut console = Transcript::default();

        agent.handle("weather in SF?", &mut console).unwrap();

        assert_eq!(reason_seen.borrow().clears, 1);
        let answer_seen = answer_seen.borrow();
        let prompt = answer_seen.calls[0].0[0].as_text().unwrap();
        assert!(prompt.starts_with("The user asked: 'weather in SF?'. A tool was run"));
        assert!(prompt.contains("\"condition\":\"Sunny\""));
        assert_eq!(console.lines.last().map(String::as_str), Some("AI: Sunny and 75°F."));
    }

    #[test]
    fn test_no_tool_needed() {
        let (reason, _) = ScriptedChat::new(vec![Ok(vec![Message::text(Role::Model, r#"{"tool_call": null}"#.into())])]);
        let (answer, answer_seen) = ScriptedChat::new(vec![Ok(vec![Message::text(Role::Model, "4".into())])]);
        let mut agent = Agent::new(Box::new(reason), Box::new(answer), Toolbox::weather());
        let mut console = Transcript::default();

        agent.handle("2+2?", &mut console).unwrap();

        assert_eq!(answer_seen.borrow().calls[0].0[0].as_text(), Some("2+2?"));
        assert!(console.text().contains("No tool needed."));
    }

    #[test]
    fn test_model_params() {
        let params = ModelParams::new(vibe_lib::ModelProvider::OpenAI, "m".into(), "k".into(), "u".into());
        let (reason, answer) = Agent::model_params(Some(&params)).unwrap();
        assert_eq!(reason.temperature, Some(0.0));
        assert_eq!(reason.max_tokens, Some(150));
        assert_eq!(answer.temperature, Some(0.7));
        assert_eq!(answer.max_tokens, Some(250));
    }
}
