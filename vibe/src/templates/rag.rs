use tracing::debug;
use vibe_lib::embeddings::Embedding;
use vibe_lib::llm::{LLMChat, Message, Role};
use vibe_lib::retrieval::{join_context, KnowledgeBase, Ranking, Retrieval};
use vibe_lib::tools::ToolChoice;
use crate::error::AppError;
use crate::prompts::rag_question;
use crate::term::Console;
use super::{first_text, Session};

const NOTHING_FOUND: &str = "I could not find any relevant information in the knowledge base to answer your question.";

/// Question answering over a local knowledge base.
pub struct Rag {
    chat: Box<dyn LLMChat>,
    embedding: Box<dyn Embedding>,
    knowledge_base: KnowledgeBase,
    ranking: Ranking,
}

impl Rag {
    /// Create an instance over an embedded knowledge base.
    pub fn new(chat: Box<dyn LLMChat>, embedding: Box<dyn Embedding>, knowledge_base: KnowledgeBase, ranking: Ranking) -> Self {
        Rag { chat, embedding, knowledge_base, ranking }
    }
}

impl Session for Rag {
    fn title(&self) -> &'static str {
        "Ask questions about the VibeCode platform."
    }

    fn intro(&self) -> Vec<String> {
        vec![format!("Answers use the {} most relevant of {} knowledge base chunks.", self.ranking.top_k, self.knowledge_base.len())]
    }

    fn help(&self) -> &'static str {
        "Ask a question. The most similar parts of the knowledge base are sent\n\
to the model as context, and the model answers from that context only."
    }

    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError> {
        let matches = match self.knowledge_base.retrieve(input, self.embedding.as_mut(), &self.ranking)? {
            Retrieval::Found(matches) => matches,
            Retrieval::NoResults => {
                console.assistant(NOTHING_FOUND);
                return Ok(());
            }
        };

        debug!(scores = ?matches.iter().map(|m| m.score).collect::<Vec<_>>(), "retrieved chunks");
        let context = join_context(&matches);

        self.chat.clear_history();
        let response = self.chat.get_inference(&[Message::text(Role::User, rag_question(&context, input))], ToolChoice::None)?;
        console.assistant(first_text(&response).unwrap_or_default());

        Ok(())
    }
}
