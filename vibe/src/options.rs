//! App initialization functions.

use anstyle::Style;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use std::ffi::OsString;
use std::str::FromStr;
use crate::error::AppError;
use crate::toml_parser::parse_toml_config;
use dirs::home_dir;
use crate::util::{parse_colors, ColorPair};

/// App options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Template to run (subcommand name).
    pub template: Option<String>,
    /// Model provider.
    pub provider: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// API endpoint (Azure resource URL or OpenAI-compatible base URL).
    pub endpoint: Option<String>,
    /// Model API version.
    pub api_version: Option<String>,
    /// Chat model or deployment name.
    pub chat_model: Option<String>,
    /// Embedding model or deployment name.
    pub embedding_model: Option<String>,
    /// Embedding backend: api or local.
    pub embedding_backend: Option<String>,
    /// Maximum number of texts per embeddings request.
    pub batch_size: Option<i64>,
    /// Maximum number of tokens that will be generated.
    pub max_tokens: Option<i64>,
    /// Number of variants to generate.
    pub n: Option<i64>,
    /// Level of randomization when choosing tokens.
    pub temperature: Option<f64>,
    /// Only the tokens comprising the top_p probability mass will be considered.
    pub top_p: Option<f64>,
    /// Penalize new tokens based on their existing frequency.
    pub frequency_penalty: Option<f64>,
    /// Penalize new tokens based on whether they appear in the text so far.
    pub presence_penalty: Option<f64>,
    /// Sequence at which model will stop generating.
    pub stop_sequence: Option<String>,
    /// First user message.
    pub message: Option<String>,
    /// Custom instructions to add to system prompt.
    pub prompt: Option<String>,
    /// Keep the conversation between turns of the basic chat.
    pub keep_history: bool,
    /// Knowledge base document for RAG.
    pub knowledge_base: Option<String>,
    /// Chunk size in characters.
    pub chunk_size: Option<i64>,
    /// Number of chunks to retrieve.
    pub top_k: Option<i64>,
    /// Minimum similarity of retrieved chunks.
    pub min_score: Option<f64>,
    /// Embedding index for semantic search.
    pub index: Option<String>,
    /// Maximum number of search results.
    pub rows: Option<i64>,
    /// Minimum similarity of search results.
    pub threshold: Option<f64>,
    /// User message color and prompt background.
    pub user_color: ColorPair,
    /// Assistant message color and prompt background.
    pub assistant_color: ColorPair,
    /// Tool message color and prompt background.
    pub tool_color: ColorPair,
    /// Log verbosity (number of -v flags).
    pub verbosity: u8,
}

// Subcommands don't all define the same arguments.
fn str_arg(m: &ArgMatches, id: &str) -> Option<String> {
    m.try_get_one::<String>(id).ok().flatten().cloned()
}

macro_rules! check_and_set_int_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = str_arg(&$m, $arg) {
            if let Ok(val) = x.parse::<i64>() {
                $option.replace(val);
            } else {
                return Err(AppError::InvalidArgError(concat!($arg, " must be integer")));
            }
        }
    }
}

macro_rules! check_and_set_float_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = str_arg(&$m, $arg) {
            match f64::from_str(&x) {
                Ok(val) if val.is_finite() => { $option.replace(val); },
                _ => return Err(AppError::InvalidArgError(concat!($arg, " must be a finite floating point number"))),
            }
        }
    }
}

macro_rules! check_and_set_color_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = str_arg(&$m, $arg) {
            if let Ok(colors) = parse_colors(&x) {
                $option = colors;
            } else {
                return Err(AppError::InvalidArgError(
                    concat!($arg, " must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'.")
                ));
            }
        }
    }
}

macro_rules! set_str_arg {
    ($arg:literal, $m:ident, $option:expr) => {
        if let Some(x) = str_arg(&$m, $arg) {
            $option.replace(x);
        }
    }
}

fn opt(id: &'static str, help: &'static str, env: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .help(help)
        .env(env)
        .required(false)
}

fn embedding_args() -> [Arg; 2] {
    [
        opt("embedding-backend", "Where embeddings are computed, one of: api, local", "VIBE_EMBEDDING_BACKEND"),
        opt("batch-size", "Maximum number of texts per embeddings request", "VIBE_BATCH_SIZE"),
    ]
}

impl Options {

    /// Create new unfilled options.
    pub fn new() -> Self {
        Self::default()
    }
    
    fn argument_parser<T>(args: impl IntoIterator<Item = T>) -> ArgMatches where T: Into<OsString> + Clone {
        let bold_underline = Style::new().underline().bold();
        let bold = Style::new().bold();

        Command::new("vibe")
            .about("Template applications for hosted LLM APIs: chat, function calling, agents, RAG and semantic search.")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(opt("provider", "Model provider, one of: azure, openai", "VIBE_PROVIDER").short('p').global(true))
            .arg(opt("api-key", "API key", "AZURE_OPENAI_API_KEY").short('k').global(true))
            .arg(opt("endpoint", "Azure OpenAI resource endpoint, or base URL of an OpenAI-compatible API", "AZURE_OPENAI_ENDPOINT").short('u').global(true))
            .arg(opt("api-version", "Model API version (Azure)", "VIBE_API_VERSION").global(true))
            .arg(opt("chat-model", "Chat model name (deployment name for Azure)", "AZURE_OPENAI_CHAT_DEPLOYMENT").short('m').global(true))
            .arg(opt("embedding-model", "Embedding model name (deployment name for Azure)", "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT").global(true))
            .arg(opt("config", "Config file path", "VIBE_CONFIG").short('c').global(true))
            .arg(opt("message", "First request, sent before the interactive loop starts", "VIBE_MESSAGE").short('e').global(true))
            .arg(opt("prompt", "Custom instructions to use in the system prompt", "VIBE_PROMPT").global(true))
            .arg(opt("max-tokens", "Maximum number of tokens that will be generated", "VIBE_MAX_TOKENS").global(true))
            .arg(opt("n", "Number of variants to generate per one LLM call", "VIBE_N").global(true))
            .arg(opt("temperature", "Level of randomization when LLM choose tokens", "VIBE_TEMPERATURE").global(true))
            .arg(opt("top-p", "Only the tokens comprising the top_p probability mass will be considered", "VIBE_TOP_P").global(true))
            .arg(opt("frequency-penalty", "Penalize new tokens based on their existing frequency", "VIBE_FREQUENCY_PENALTY").global(true))
            .arg(opt("presence-penalty", "Penalize new tokens based on whether they appear in the text so far", "VIBE_PRESENCE_PENALTY").global(true))
            .arg(opt("stop-sequence", "Sequence at which model will stop generating", "VIBE_STOP_SEQUENCE").global(true))
            .arg(opt("user-color", "User messages and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').", "VIBE_USER_COLOR").global(true))
            .arg(opt("assistant-color", "Assistant messages and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').", "VIBE_ASSISTANT_COLOR").global(true))
            .arg(opt("tool-color", "Tool messages and prompt background colors, rgb (e.g. 'fg(255,0,123);bg(0,123,255)').", "VIBE_TOOL_COLOR").global(true))
            .arg(
                Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more details to stderr (-v info, -vv debug)")
                .action(ArgAction::Count)
                .global(true)
            )
            .subcommand(
                Command::new("chat")
                .about("Basic chat with the model")
                .arg(
                    Arg::new("keep-history")
                    .long("keep-history")
                    .help("Send the whole conversation with every request")
                    .action(ArgAction::SetTrue)
                )
            )
            .subcommand(
                Command::new("functions")
                .about("Native tool calling with a mock weather tool")
            )
            .subcommand(
                Command::new("agent")
                .about("ReAct agent: the model picks a tool in JSON, then answers with its output")
            )
            .subcommand(
                Command::new("rag")
                .about("Answer questions from a local knowledge base (retrieval-augmented generation)")
                .arg(opt("knowledge-base", "Knowledge base document (default: data.md)", "VIBE_KNOWLEDGE_BASE"))
                .arg(opt("chunk-size", "Chunk size in characters (default: 500)", "VIBE_CHUNK_SIZE"))
                .arg(opt("top-k", "Number of chunks used as context (default: 3)", "VIBE_TOP_K"))
                .arg(opt("min-score", "Minimum similarity of a chunk to be used as context", "VIBE_MIN_SCORE"))
                .args(embedding_args())
            )
            .subcommand(
                Command::new("search")
                .about("Semantic search over a precomputed video embedding index")
                .arg(opt("index", "Embedding index JSON file (default: embedding_index_3m.json)", "VIBE_INDEX"))
                .arg(opt("rows", "Maximum number of results (default: 5)", "VIBE_ROWS"))
                .arg(opt("threshold", "Minimum similarity of a result (default: 0.75)", "VIBE_THRESHOLD"))
                .args(embedding_args())
            )
            .after_help(format!("{bold_underline}Example:{bold_underline:#} {bold}

    vibe rag --endpoint=https://<resource>.openai.azure.com --api-key=<your-key> --chat-model=gpt-35-turbo --embedding-model=text-embedding-ada-002{bold:#}

Settings are read from a .env file in the working directory, the environment (AZURE_OPENAI_API_KEY, AZURE_OPENAI_ENDPOINT,
AZURE_OPENAI_CHAT_DEPLOYMENT, AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT, VIBE_*), and the configuration file .vibe.toml from
user's home directory, or the one specified with -c option.
Command line arguments override environment variables, which override the configuration file.
Type 'exit' to leave a template."))
            .get_matches_from(args)
    }

    fn load_config_file(path: Option<&str>) -> Result<Option<String>, std::io::Error> {
        Ok(if let Some(p) = path {
            Some(std::fs::read_to_string(p)?)
        } else if let Some(mut p) = home_dir() {
            p.push(".vibe.toml");
            if std::fs::exists(p.as_path())? {
                Some(std::fs::read_to_string(p.as_path())?)
            } else {
                None
            }
        } else {
            None
        })
    }

    fn validate_mandatory_options(options: &Options) -> Result<(), AppError> {
        let template = options.template.as_deref()
            .ok_or_else(|| AppError::MissingArgError("template is not specified.".into()))?;

        let needs_chat = template != "search";
        let needs_api_embeddings = matches!(template, "rag" | "search")
            && options.embedding_backend.as_deref().unwrap_or("api") == "api";
        let azure = options.provider.as_deref().unwrap_or("azure") == "azure";

        let mut missing = Vec::new();
        if (needs_chat || needs_api_embeddings) && options.api_key.is_none() {
            missing.push("API key (--api-key or AZURE_OPENAI_API_KEY)");
        }
        if azure && (needs_chat || needs_api_embeddings) && options.endpoint.is_none() {
            missing.push("endpoint (--endpoint or AZURE_OPENAI_ENDPOINT)");
        }
        if needs_chat && options.chat_model.is_none() {
            missing.push("chat model (--chat-model or AZURE_OPENAI_CHAT_DEPLOYMENT)");
        }
        if needs_api_embeddings && options.embedding_model.is_none() {
            missing.push("embedding model (--embedding-model or AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT)");
        }
        if !missing.is_empty() {
            return Err(AppError::MissingArgError(missing.join(", ")));
        }

        // Values may come from the config file as well as from the command line.
        let minimums = [
            (options.max_tokens, 0, "max-tokens must be at least 0"),
            (options.batch_size, 1, "batch-size must be at least 1"),
            (options.chunk_size, 1, "chunk-size must be at least 1"),
            (options.top_k, 1, "top-k must be at least 1"),
            (options.rows, 1, "rows must be at least 1"),
        ];
        for (val, min, err) in minimums {
            if val.is_some_and(|v| v < min) {
                return Err(AppError::InvalidArgError(err));
            }
        }

        if let Some(n) = options.n {
            if n != 1 {
                return Err(AppError::InvalidArgError("Currently only n=1 is supported."));
            }
        }

        Ok(())
    }

    // Variables used by some of the original template .env files.
    fn apply_env_fallbacks(options: &mut Options) {
        if options.chat_model.is_none() {
            options.chat_model = std::env::var("AZURE_OPENAI_DEPLOYMENT").ok();
        }
        if options.api_key.is_none() && options.provider.as_deref() == Some("openai") {
            options.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
    }

    /// Load and validate options from env, command line arguments, config file.
    pub fn load<T>(args: impl IntoIterator<Item = T>) -> Result<Self, AppError> 
        where T: Into<OsString> + Clone 
    {
        let matches = Self::argument_parser(args);

        let mut options = Options::new();

        let (template, m) = matches.subcommand()
            .ok_or_else(|| AppError::MissingArgError("template is not specified.".into()))?;
        options.template = Some(template.to_owned());

        let config_path = str_arg(m, "config");

        if let Some(content) = Self::load_config_file(config_path.as_deref())
            .map_err(|err| AppError::Error(format!("Error loading config file: {}", err)))?
        {
            parse_toml_config(&content, &mut options)?;
        }

        set_str_arg!("provider", m, options.provider);
        set_str_arg!("api-key", m, options.api_key);
        set_str_arg!("endpoint", m, options.endpoint);
        set_str_arg!("api-version", m, options.api_version);
        set_str_arg!("chat-model", m, options.chat_model);
        set_str_arg!("embedding-model", m, options.embedding_model);
        set_str_arg!("embedding-backend", m, options.embedding_backend);
        set_str_arg!("stop-sequence", m, options.stop_sequence);
        set_str_arg!("prompt", m, options.prompt);
        set_str_arg!("knowledge-base", m, options.knowledge_base);
        set_str_arg!("index", m, options.index);

        check_and_set_int_arg!("max-tokens", m, options.max_tokens);
        check_and_set_int_arg!("n", m, options.n);
        check_and_set_int_arg!("batch-size", m, options.batch_size);
        check_and_set_int_arg!("chunk-size", m, options.chunk_size);
        check_and_set_int_arg!("top-k", m, options.top_k);
        check_and_set_int_arg!("rows", m, options.rows);

        check_and_set_float_arg!("temperature", m, options.temperature);
        check_and_set_float_arg!("top-p", m, options.top_p);
        check_and_set_float_arg!("frequency-penalty", m, options.frequency_penalty);
        check_and_set_float_arg!("presence-penalty", m, options.presence_penalty);
        check_and_set_float_arg!("min-score", m, options.min_score);
        check_and_set_float_arg!("threshold", m, options.threshold);

        check_and_set_color_arg!("assistant-color", m, options.assistant_color);
        check_and_set_color_arg!("user-color", m, options.user_color);
        check_and_set_color_arg!("tool-color", m, options.tool_color);

        options.keep_history |= m.try_get_one::<bool>("keep-history").ok().flatten().copied().unwrap_or(false);
        options.verbosity = m.get_count("verbose");
        options.message = str_arg(m, "message");

        Self::apply_env_fallbacks(&mut options);
        Self::validate_mandatory_options(&options)?;

        Ok(options)
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    fn base_args() -> Vec<OsString> {
        vec![
            OsString::from("/bin/path"),
            OsString::from("rag"),
            OsString::from("--provider=azure"),
            OsString::from("--api-key=<api-key>"),
            OsString::from("--endpoint=<endpoint>"),
            OsString::from("--chat-model=<chat-model>"),
            OsString::from("--embedding-model=<embedding-model>"),
            OsString::from("--api-version=<api-version>"),
            OsString::from("--n=1"),
            OsString::from("--max-tokens=789"),
            OsString::from("--temperature=0.456"),
            OsString::from("--top-p=0.123"),
            OsString::from("--frequency-penalty=1.234"),
            OsString::from("--presence-penalty=2.345"),
            OsString::from("--stop-sequence=<stop-sequence>"),
            OsString::from("--message=<message>"),
            OsString::from("--prompt=<prompt>"),
            OsString::from("--knowledge-base=kb.md"),
            OsString::from("--chunk-size=250"),
            OsString::from("--top-k=4"),
            OsString::from("--min-score=0.5"),
            OsString::from("--batch-size=8"),
            OsString::from("--assistant-color=fg(255,0,124);bg(0,124,255)"),
            OsString::from("--user-color='fg(255,0,125);bg(0,125,255)'"),
            OsString::from("--tool-color=\"fg(255,0,123);bg(0,123,255)\""),
            OsString::from("-vv"),
        ]
    }

    #[test]
    fn test_load_options() {
        let args = base_args();

        let options = Options::load(args.clone()).expect("load options");

        assert_eq!(options.template, Some("rag".into()));
        assert_eq!(options.provider, Some("azure".into()));
        assert_eq!(options.api_key, Some("<api-key>".into()));
        assert_eq!(options.endpoint, Some("<endpoint>".into()));
        assert_eq!(options.chat_model, Some("<chat-model>".into()));
        assert_eq!(options.embedding_model, Some("<embedding-model>".into()));
        assert_eq!(options.api_version, Some("<api-version>".into()));
        assert_eq!(options.n, Some(1));
        assert_eq!(options.max_tokens, Some(789));
        assert_eq!(options.temperature, Some(0.456));
        assert_eq!(options.top_p, Some(0.123));
        assert_eq!(options.frequency_penalty, Some(1.234));
        assert_eq!(options.presence_penalty, Some(2.345));
        assert_eq!(options.stop_sequence, Some("<stop-sequence>".into()));
        assert_eq!(options.message, Some("<message>".into()));
        assert_eq!(options.prompt, Some("<prompt>".into()));
        assert_eq!(options.knowledge_base, Some("kb.md".into()));
        assert_eq!(options.chunk_size, Some(250));
        assert_eq!(options.top_k, Some(4));
        assert_eq!(options.min_score, Some(0.5));
        assert_eq!(options.batch_size, Some(8));
        assert_eq!(options.assistant_color, (Some([255,0,124]), Some([0,124,255])));
        assert_eq!(options.user_color, (Some([255,0,125]), Some([0,125,255])));
        assert_eq!(options.tool_color, (Some([255,0,123]), Some([0,123,255])));
        assert_eq!(options.verbosity, 2);
        assert!(!options.keep_history);
    }

    #[test]
    fn test_missing_mandatory_options() {
        let args = base_args();

        for flag in ["--api-key", "--endpoint", "--chat-model", "--embedding-model"] {
            let args2: Vec<_> = args.iter()
                .filter(|a| !a.to_string_lossy().starts_with(flag))
                .cloned()
                .collect();
            assert!(matches!(Options::load(args2), Err(AppError::MissingArgError(_))), "{flag}");
        }

        // Search does not need a chat model.
        let search = vec!["/bin/path", "search", "--provider=openai", "--api-key=k", "--embedding-model=e"];
        let options = Options::load(search).expect("load search options");
        assert_eq!(options.template, Some("search".into()));

        // Local embeddings need no embedding model.
        let local = vec!["/bin/path", "rag", "--provider=openai", "--api-key=k", "--chat-model=c", "--embedding-backend=local"];
        assert!(Options::load(local).is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut args = base_args();
        args[8] = "--n=2".into();
        assert!(matches!(Options::load(args), Err(AppError::InvalidArgError(_))));

        let mut args = base_args();
        args[18] = "--chunk-size=0".into();
        assert!(matches!(Options::load(args), Err(AppError::InvalidArgError(_))));

        let mut args = base_args();
        args[20] = "--min-score=high".into();
        assert!(matches!(Options::load(args), Err(AppError::InvalidArgError(_))));
    }

    #[test]
    fn test_non_finite_floats() {
        for arg in ["--threshold=NaN", "--threshold=inf", "--temperature=-inf"] {
            let args = vec!["/bin/path", "search", "--provider=openai", "--api-key=k", "--embedding-model=e", arg];
            assert!(matches!(Options::load(args), Err(AppError::InvalidArgError(_))), "{arg}");
        }

        let mut args = base_args();
        args[20] = "--min-score=NaN".into();
        assert!(matches!(Options::load(args), Err(AppError::InvalidArgError(_))));
    }

    #[test]
    fn test_minimums_apply_to_config_file() {
        for (key, err) in [
            ("rows = 0", "rows must be at least 1"),
            ("top_k = 0", "top-k must be at least 1"),
            ("chunk_size = 0", "chunk-size must be at least 1"),
            ("batch_size = 0", "batch-size must be at least 1"),
            ("max_tokens = -5", "max-tokens must be at least 0"),
        ] {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            std::io::Write::write_all(&mut file, format!("default_context = \"work\"\n[work]\n{key}\n").as_bytes()).unwrap();
            let config = format!("--config={}", file.path().display());
            let args = vec!["/bin/path", "search", "--provider=openai", "--api-key=k", "--embedding-model=e", config.as_str()];

            match Options::load(args) {
                Err(AppError::InvalidArgError(msg)) => assert_eq!(msg, err),
                other => panic!("{key}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_chat_flags() {
        let args = vec!["/bin/path", "chat", "--keep-history", "--provider=openai", "--api-key=k", "--chat-model=c"];
        let options = Options::load(args).expect("load chat options");
        assert!(options.keep_history);
        assert_eq!(options.template, Some("chat".into()));
    }
}
