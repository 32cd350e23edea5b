//! Template applications and the read-eval-print loop driving them.

mod agent;
mod chat;
mod functions;
mod rag;
mod search;

use rustyline::error::ReadlineError;
use tracing::{error, info};
use vibe_lib::embeddings::{get_embedding, Embedding};
use vibe_lib::llm::{get_llm_chat, LLMChat, Message};
use vibe_lib::request::get_reqwest_client;
use vibe_lib::retrieval::{KnowledgeBase, VideoIndex};
use vibe_lib::tools::ToolSpec;
use vibe_lib::Config as ModelParams;

use crate::config::{Config, Template};
use crate::error::AppError;
use crate::prompts::Prompts;
use crate::term::{Console, Term};
use crate::tools::Toolbox;

pub use agent::Agent;
pub use chat::Chat;
pub use functions::Functions;
pub use rag::Rag;
pub use search::Search;

/// One running template.
pub trait Session {
    /// Title shown in the intro banner.
    fn title(&self) -> &'static str;

    /// Intro lines after the title.
    fn intro(&self) -> Vec<String>;

    /// Text printed for `?`.
    fn help(&self) -> &'static str;

    /// Process one user input.
    fn handle(&mut self, input: &str, console: &mut dyn Console) -> Result<(), AppError>;
}

/// What the loop does after a line of input.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Exit,
}

/// Handle a line of input; turn errors are printed, not returned.
fn dispatch(session: &mut dyn Session, line: &str, console: &mut dyn Console) -> Flow {
    let line = line.trim();

    if line.is_empty() {
        Flow::Continue
    } else if line.eq_ignore_ascii_case("exit") {
        Flow::Exit
    } else if line == "?" {
        console.help(session.help());
        Flow::Continue
    } else {
        if let Err(err) = session.handle(line, console) {
            error!(%err, "turn failed");
            console.info(&format!("An error occurred: {err}"));
        }
        Flow::Continue
    }
}

/// First text message of a model response.
fn first_text(messages: &[Message]) -> Option<&str> {
    messages.iter().find_map(Message::as_text)
}

fn chat_model(params: Option<&ModelParams>, tools: Vec<ToolSpec>) -> Result<Box<dyn LLMChat>, AppError> {
    let params = params.cloned()
        .ok_or_else(|| AppError::MissingArgError("chat model".into()))?;
    Ok(get_llm_chat(params, get_reqwest_client()?, tools)?)
}

fn embedding_model(config: &Config) -> Result<Box<dyn Embedding>, AppError> {
    let t = config.embeddings.clone()
        .ok_or_else(|| AppError::MissingArgError("embedding model".into()))?;
    Ok(get_embedding(t)?)
}

/// Build the configured template, loading its data files.
pub fn create(config: &Config, console: &mut dyn Console) -> Result<Box<dyn Session>, AppError> {
    let prompts = Prompts::new(&config.prompt);
    let params = config.model_params.as_ref();

    Ok(match config.template {
        Template::Chat => {
            let mut chat = chat_model(params, vec![])?;
            chat.set_system_prompt(prompts.chat());
            Box::new(Chat::new(chat, config.keep_history))
        },
        Template::Functions => {
            let toolbox = Toolbox::weather();
            let mut chat = chat_model(params, toolbox.specs())?;
            chat.set_system_prompt(prompts.functions());
            Box::new(Functions::new(chat, toolbox))
        },
        Template::Agent => {
            let toolbox = Toolbox::weather();
            let (reason_params, answer_params) = Agent::model_params(params)?;
            let mut reason = chat_model(Some(&reason_params), vec![])?;
            reason.set_system_prompt(prompts.reason(&toolbox.specs()));
            let mut answer = chat_model(Some(&answer_params), vec![])?;
            answer.set_system_prompt(prompts.answer());
            Box::new(Agent::new(reason, answer, toolbox))
        },
        Template::Rag => {
            let path = &config.rag.path;
            if !path.is_file() {
                return Err(AppError::MissingFile("knowledge base", path.display().to_string()));
            }
            let mut chat = chat_model(params.map(|p| p.clone().with_defaults(0.2, 250)).as_ref(), vec![])?;
            chat.set_system_prompt(prompts.rag());
            let mut embedding = embedding_model(config)?;

            console.info("Creating embeddings for knowledge base... This may take a moment.");
            let knowledge_base = KnowledgeBase::load(path, config.rag.chunk_size, embedding.as_mut())?;
            info!(path = %path.display(), chunks = knowledge_base.len(), "knowledge base loaded");
            console.info(&format!("Knowledge base '{}' loaded: {} chunks embedded.", path.display(), knowledge_base.len()));

            Box::new(Rag::new(chat, embedding, knowledge_base, config.rag.ranking))
        },
        Template::Search => {
            let path = &config.search.path;
            if !path.is_file() {
                return Err(AppError::MissingFile("embedding index", path.display().to_string()));
            }
            let index = VideoIndex::load(path)?;
            info!(path = %path.display(), rows = index.len(), "embedding index loaded");
            console.info(&format!("Embeddings index '{}' loaded: {} rows.", path.display(), index.len()));

            let embedding = embedding_model(config)?;
            Box::new(Search::new(embedding, index, config.search.ranking))
        },
    })
}

/// Run the configured template until the user exits.
pub fn run(config: Config) -> Result<(), AppError> {
    let mut term = Term::new(&config.settings)?;
    let mut session = create(&config, &mut term)?;

    term.print_intro(session.title(), &session.intro());

    if let Some(message) = &config.message {
        if dispatch(session.as_mut(), message, &mut term) == Flow::Exit {
            return Ok(());
        }
    }

    loop {
        match term.user_input() {
            Ok(line) => {
                if dispatch(session.as_mut(), &line, &mut term) == Flow::Exit {
                    break;
                }
            },
            Err(AppError::Rustyline(ReadlineError::Interrupted | ReadlineError::Eof)) => break,
            Err(err) => return Err(err),
        }
    }

    term.info("\nExiting application. Goodbye!");
    Ok(())
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::VecDeque;
    use vibe_lib::embeddings::Embedding;
    use vibe_lib::llm::{LLMChat, Message};
    use vibe_lib::tools::ToolChoice;
    use vibe_lib::Error;

    /// Inputs seen by a scripted chat.
    #[derive(Default, Debug)]
    pub struct Seen {
        pub calls: Vec<(Vec<Message>, ToolChoice)>,
        pub clears: usize,
        pub system: Option<String>,
    }

    /// Chat answering from a script.
    pub struct ScriptedChat {
        pub replies: VecDeque<Result<Vec<Message>, Error>>,
        pub seen: std::rc::Rc<std::cell::RefCell<Seen>>,
    }

    impl ScriptedChat {
        pub fn new(replies: Vec<Result<Vec<Message>, Error>>) -> (Self, std::rc::Rc<std::cell::RefCell<Seen>>) {
            let seen = std::rc::Rc::new(std::cell::RefCell::new(Seen::default()));
            (ScriptedChat { replies: replies.into(), seen: seen.clone() }, seen)
        }
    }

    impl LLMChat for ScriptedChat {
        fn get_inference(&mut self, messages: &[Message], tools: ToolChoice) -> Result<Vec<Message>, Error> {
            self.seen.borrow_mut().calls.push((messages.to_vec(), tools));
            self.replies.pop_front().unwrap_or(Err(Error::LLMResponseError("script exhausted")))
        }

        fn clear_history(&mut self) {
            self.seen.borrow_mut().clears += 1;
        }

        fn set_system_prompt(&mut self, prompt: String) {
            self.seen.borrow_mut().system = Some(prompt);
        }
    }

    /// Two-dimensional embedding: counts of `a` and `b`.
    pub struct LetterEmbedding;

    impl Embedding for LetterEmbedding {
        fn get_embeddings(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Error> {
            Ok(texts.iter()
                .map(|t| vec![t.matches('a').count() as f32, t.matches('b').count() as f32])
                .collect())
        }
    }
}
