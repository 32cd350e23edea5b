//! Vibe-lib holds the reusable parts of the vibe LLM templates.
//! It allows to chat with a hosted LLM, use tools/functions, compute
//! embeddings and rank text by similarity to a query.
//! 
//! ### Features
//! 
//!  - OpenAI and Azure OpenAI chat completions
//!  - tool/function calling
//!  - hosted or local (candle) embeddings
//!  - chunking and cosine ranking for retrieval-augmented generation
//! 
//! ### Examples
//! 
//! ```rust no_run
//! use vibe_lib::llm::{get_llm_chat, Message, Role};
//! use vibe_lib::tools::ToolChoice;
//! use vibe_lib::request::get_reqwest_client;
//! use vibe_lib::ModelProvider;
//! use vibe_lib::Config;
//!
//! let config = Config::new(ModelProvider::OpenAI, "gpt-4o-mini".into(), "<api-key>".into(), "https://api.openai.com/v1/chat/completions".into());
//! 
//! let reqwest_client = get_reqwest_client().expect("transport created");
//! 
//! let mut chat = get_llm_chat(config, reqwest_client, vec![]).expect("chat created");
//! 
//! chat.set_system_prompt("You are a helpful assistant.".into());
//! 
//! let user_message = Message::text(Role::User, "Hi assistant!".into());
//! 
//! let response = chat.get_inference(&[user_message], ToolChoice::None).expect("LLM response");
//!
//! for message in response.iter() {
//!     match message {
//!         Message::Text(text) => { /* process text message */ }
//!         Message::ToolCall(tool_call) => { /* process tool use request */ }
//!         Message::ToolResult(_) => { panic!("LLM must not respond with tool result!") }
//!     };
//! }
//! ```
//!
//! Ranking chunks of a document:
//!
//! ```rust
//! use vibe_lib::retrieval::{chunk_text, rank, Ranking, Retrieval};
//!
//! let chunks = chunk_text("alpha beta gamma", 6).unwrap();
//! let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]];
//! let ranking = Ranking { top_k: 1, threshold: None };
//!
//! match rank(&[1.0, 0.0], chunks.into_iter().zip(vectors), &ranking).unwrap() {
//!     Retrieval::Found(best) => assert_eq!(best[0].item, "alpha "),
//!     Retrieval::NoResults => unreachable!(),
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::suspicious)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::collapsible_if)]

mod error;
mod config;
pub mod embeddings;
pub mod llm;
pub mod request;
pub mod retrieval;
pub mod tools;

pub use error::Error;
pub use config::Config;
pub use config::EmbeddingConfig;
pub use config::LocalModel;
pub use config::ModelProvider;
