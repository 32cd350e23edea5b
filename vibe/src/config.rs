use std::path::PathBuf;
use vibe_lib::embeddings::Type as EmbeddingType;
use vibe_lib::retrieval::Ranking;
use vibe_lib::{Config as ModelParams, EmbeddingConfig, LocalModel, ModelProvider};

use crate::error::AppError;
use crate::options::Options;
use crate::util::{api_url_for_provider, Api, ColorPair};

const AZURE_API_VERSION: &str = "2024-02-01";
const AZURE_TOOLS_API_VERSION: &str = "2024-02-15-preview";

const DEFAULT_KNOWLEDGE_BASE: &str = "data.md";
const DEFAULT_CHUNK_SIZE: usize = 500;
const DEFAULT_TOP_K: usize = 3;

const DEFAULT_INDEX: &str = "embedding_index_3m.json";
const DEFAULT_ROWS: usize = 5;
const DEFAULT_THRESHOLD: f32 = 0.75;

/// Template (application) to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Template {
    /// Basic chat.
    Chat,
    /// Native function calling.
    Functions,
    /// ReAct agent.
    Agent,
    /// Retrieval-augmented generation.
    Rag,
    /// Semantic search.
    Search,
}

impl TryFrom<&str> for Template {
    type Error = AppError;

    fn try_from(val: &str) -> Result<Self, Self::Error> {
        match val {
            "chat" => Ok(Template::Chat),
            "functions" => Ok(Template::Functions),
            "agent" => Ok(Template::Agent),
            "rag" => Ok(Template::Rag),
            "search" => Ok(Template::Search),
            _ => Err(AppError::ConfigParseError("unknown template")),
        }
    }
}

/// Application settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// User messages color.
    pub user_color: ColorPair,
    /// Assistant messages color.
    pub assistant_color: ColorPair,
    /// Tool output color.
    pub tool_color: ColorPair,
}

/// Document retrieval settings.
#[derive(Clone, Debug)]
pub struct RagSettings {
    /// Knowledge base document.
    pub path: PathBuf,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Top-k and minimum score.
    pub ranking: Ranking,
}

/// Semantic search settings.
#[derive(Clone, Debug)]
pub struct SearchSettings {
    /// Embedding index file.
    pub path: PathBuf,
    /// Row limit and similarity threshold.
    pub ranking: Ranking,
}

/// App config
#[derive(Clone, Debug)]
pub struct Config {
    /// Template to run.
    pub template: Template,
    /// Chat model parameters, absent for search.
    pub model_params: Option<ModelParams>,
    /// Embedding backend, present for rag and search.
    pub embeddings: Option<EmbeddingType>,
    /// Knowledge base settings.
    pub rag: RagSettings,
    /// Video index settings.
    pub search: SearchSettings,
    /// Keep the basic chat conversation between turns.
    pub keep_history: bool,
    /// First message.
    pub message: Option<String>,
    /// Settings
    pub settings: Settings,
    /// Custom instructions to add to system prompt.
    pub prompt: Option<String>,
    /// Log verbosity.
    pub verbosity: u8,
}

fn to_count(val: Option<i64>, default: usize, err: &'static str) -> Result<usize, AppError> {
    match val {
        Some(v) if v >= 1 => usize::try_from(v).map_err(|_| AppError::InvalidArgError(err)),
        Some(_) => Err(AppError::InvalidArgError(err)),
        None => Ok(default),
    }
}

fn required(val: Option<String>, name: &str) -> Result<String, AppError> {
    val.ok_or_else(|| AppError::MissingArgError(name.to_owned()))
}

impl TryFrom<Options> for Config {
    type Error = AppError;

    fn try_from(options: Options) -> Result<Self, AppError> {
        let template: Template = options.template.as_deref()
            .ok_or_else(|| AppError::MissingArgError("template is not specified.".into()))?
            .try_into()?;

        let provider = ModelProvider::try_from(options.provider.as_deref().unwrap_or("azure"))
            .map_err(|_| AppError::InvalidArgError("provider must be one of: azure, openai"))?;

        let api_version = match provider {
            ModelProvider::Azure => Some(options.api_version.clone().unwrap_or_else(|| {
                match template {
                    Template::Functions => AZURE_TOOLS_API_VERSION,
                    _ => AZURE_API_VERSION,
                }.to_owned()
            })),
            ModelProvider::OpenAI => options.api_version.clone(),
        };

        let model_params = if template == Template::Search {
            None
        } else {
            let name = required(options.chat_model.clone(), "chat model")?;
            let api_url = api_url_for_provider(provider, options.endpoint.as_deref(), &name, Api::Chat)?;
            let api_key = required(options.api_key.clone(), "API key")?;
            let mut params = ModelParams::new(provider, name, api_key, api_url);
            params.api_version = api_version.clone();
            params.max_tokens = options.max_tokens;
            params.n = options.n;
            params.temperature = options.temperature;
            params.top_p = options.top_p;
            params.frequency_penalty = options.frequency_penalty;
            params.presence_penalty = options.presence_penalty;
            params.stop_sequence = options.stop_sequence.clone();
            Some(params)
        };

        let embeddings = match template {
            Template::Rag | Template::Search => {
                match options.embedding_backend.as_deref().unwrap_or("api") {
                    "api" => {
                        let name = required(options.embedding_model.clone(), "embedding model")?;
                        let api_url = api_url_for_provider(provider, options.endpoint.as_deref(), &name, Api::Embeddings)?;
                        let api_key = required(options.api_key.clone(), "API key")?;
                        let mut config = EmbeddingConfig::new(provider, name, api_key, api_url);
                        config.api_version = api_version;
                        config.batch_size = to_count(options.batch_size, EmbeddingConfig::DEFAULT_BATCH_SIZE, "batch-size must be at least 1")?;
                        Some(EmbeddingType::Api(config))
                    },
                    "local" => Some(EmbeddingType::HuggingFace(LocalModel {
                        batch_size: to_count(options.batch_size, EmbeddingConfig::DEFAULT_BATCH_SIZE, "batch-size must be at least 1")?,
                        ..LocalModel::default()
                    })),
                    _ => return Err(AppError::InvalidArgError("embedding-backend must be one of: api, local")),
                }
            },
            _ => None,
        };

        let rag = RagSettings {
            path: PathBuf::from(options.knowledge_base.as_deref().unwrap_or(DEFAULT_KNOWLEDGE_BASE)),
            chunk_size: to_count(options.chunk_size, DEFAULT_CHUNK_SIZE, "chunk-size must be at least 1")?,
            ranking: Ranking {
                top_k: to_count(options.top_k, DEFAULT_TOP_K, "top-k must be at least 1")?,
                threshold: options.min_score.map(|s| s as f32),
            },
        };

        let search = SearchSettings {
            path: PathBuf::from(options.index.as_deref().unwrap_or(DEFAULT_INDEX)),
            ranking: Ranking {
                top_k: to_count(options.rows, DEFAULT_ROWS, "rows must be at least 1")?,
                threshold: Some(options.threshold.map_or(DEFAULT_THRESHOLD, |t| t as f32)),
            },
        };

        let settings = Settings {
            user_color: options.user_color,
            assistant_color: options.assistant_color,
            tool_color: options.tool_color,
        };

        Ok(Config {
            template,
            model_params,
            embeddings,
            rag,
            search,
            keep_history: options.keep_history,
            message: options.message,
            settings,
            prompt: options.prompt,
            verbosity: options.verbosity,
        })
    }
}
