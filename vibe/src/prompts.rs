use vibe_lib::tools::ToolSpec;

const CHAT: &str = "You are a helpful assistant.";

const FUNCTIONS: &str = "You are a helpful assistant that can access tools to get weather information.";

const RAG: &str = "You are a helpful AI assistant for the VibeCode platform. \
Answer the user's question based *only* on the provided context. \
If the context does not contain the answer, say that you don't know.";

const REASON: [&str;2] = [
"You are an AI agent that can use tools to answer questions. Your goal is to determine if a tool is needed to answer the user's query and to provide the necessary JSON to call that tool.

Available tools:
",
"
If the user's query requires a tool, respond with a JSON object like this:
{\"tool_call\": {\"name\": \"<tool_name>\", \"arguments\": {\"<arg_name>\": \"<arg_value>\"}}}

If no tool is needed, respond with:
{\"tool_call\": null}

Do not add any other text to your response."
];

const ANSWER: &str = "You are a helpful AI assistant. Answer the user's question based on the information provided.";

/// System prompts of the templates.
pub struct Prompts {
    extra: Option<String>,
}

impl Prompts {

    /// Create a new instance; `extra` is appended to every conversational system prompt.
    pub fn new(extra: &Option<String>) -> Self {
        Prompts {
            extra: extra.clone(),
        }
    }

    fn with_extra(&self, base: &str) -> String {
        let mut sys = base.to_owned();
        if let Some(instr) = &self.extra {
            sys += "\n\nIn addition, consider using the following information from the user:\n-----\n";
            sys += instr;
            sys += "\n-----";
        }
        sys
    }

    /// Basic chat.
    pub fn chat(&self) -> String {
        self.with_extra(CHAT)
    }

    /// Native function calling.
    pub fn functions(&self) -> String {
        self.with_extra(FUNCTIONS)
    }

    /// Question answering from retrieved context.
    pub fn rag(&self) -> String {
        self.with_extra(RAG)
    }

    /// Tool selection step of the agent. The reply must stay plain JSON, so no extra instructions.
    pub fn reason(&self, tools: &[ToolSpec]) -> String {
        let mut sys = REASON[0].to_owned();
        for tool in tools {
            sys += &format!("- `{}`: {}\n", tool.signature(), tool.description);
        }
        sys += REASON[1];
        sys
    }

    /// Final answer step of the agent.
    pub fn answer(&self) -> String {
        self.with_extra(ANSWER)
    }
}

/// User message carrying retrieved context.
pub fn rag_question(context: &str, query: &str) -> String {
    format!("Context:\n{context}\n\n---\n\nQuestion: {query}\n\nAnswer:")
}

/// User message carrying a tool result.
pub fn answer_with_tool_output(query: &str, tool_output: &str) -> String {
    format!("The user asked: '{query}'. A tool was run and returned this information: {tool_output}. Based on this, please provide a final, natural language answer.")
}
