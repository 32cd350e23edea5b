use crate::error::Error;

/// Model providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelProvider {
    /// Open AI.
    OpenAI,
    /// Azure OpenAI service.
    Azure,
}

impl TryFrom<&str> for ModelProvider {
    type Error = Error;

    fn try_from(val: &str) -> Result<Self, Self::Error> {
        match val {
            "openai" => Ok(ModelProvider::OpenAI),
            "azure" => Ok(ModelProvider::Azure),
            _ => Err(Error::Error(format!("unknown provider: {val}"))),
        }
    }
}

/// Chat model parameters.
#[derive(Clone, Debug)]
pub struct Config {
    /// Model provider.
    pub provider: ModelProvider,
    /// Model name (deployment name for Azure).
    pub name: String,
    /// API key.
    pub api_key: String,
    /// Model API URL.
    pub api_url: String,
    /// Model API version.
    pub api_version: Option<String>,
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
    /// Sequences at which model will stop generating.
    pub stop_sequence: Option<String>,
}

impl Config {

    /// Create minimal config using provider, model name, API key, and API URL.
    pub fn new(provider: ModelProvider, name: String, api_key: String, api_url: String) -> Self {
        Config {
            provider,
            name,
            api_key,
            api_url,
            api_version: None,
            max_tokens: None,
            n: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop_sequence: None
        }
    }

    /// Fill in sampling parameters the user did not set explicitly.
    pub fn with_defaults(mut self, temperature: f64, max_tokens: i64) -> Self {
        self.temperature.get_or_insert(temperature);
        self.max_tokens.get_or_insert(max_tokens);
        self
    }
}

/// Embedding endpoint parameters.
#[derive(Clone, Debug)]
pub struct EmbeddingConfig {
    /// Model provider.
    pub provider: ModelProvider,
    /// Model name (deployment name for Azure).
    pub name: String,
    /// API key.
    pub api_key: String,
    /// Embeddings API URL.
    pub api_url: String,
    /// Model API version.
    pub api_version: Option<String>,
    /// Maximum number of inputs sent in one request.
    pub batch_size: usize,
}

impl EmbeddingConfig {
    /// Default number of inputs per request.
    pub const DEFAULT_BATCH_SIZE: usize = 64;

    /// Create config with the default batch size.
    pub fn new(provider: ModelProvider, name: String, api_key: String, api_url: String) -> Self {
        EmbeddingConfig {
            provider,
            name,
            api_key,
            api_url,
            api_version: None,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Local sentence embedding model from the Hugging Face hub.
#[derive(Clone, Debug)]
pub struct LocalModel {
    /// Hub model id.
    pub model_id: String,
    /// Repository revision.
    pub revision: String,
    /// Load `pytorch_model.bin` instead of `model.safetensors`.
    pub use_pth: bool,
    /// Use the tanh approximation of GELU.
    pub approximate_gelu: bool,
    /// Maximum number of texts per forward pass.
    pub batch_size: usize,
}

impl Default for LocalModel {
    fn default() -> Self {
        LocalModel {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_owned(),
            revision: "refs/pr/21".to_owned(),
            use_pth: true,
            approximate_gelu: false,
            batch_size: EmbeddingConfig::DEFAULT_BATCH_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_model_defaults() {
        let model = LocalModel::default();
        assert_eq!(model.model_id, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(model.batch_size, EmbeddingConfig::DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_provider_try_from() {
        assert_eq!(ModelProvider::try_from("openai").unwrap(), ModelProvider::OpenAI);
        assert_eq!(ModelProvider::try_from("azure").unwrap(), ModelProvider::Azure);
        assert!(ModelProvider::try_from("gcp").is_err());
    }

    #[test]
    fn test_with_defaults_keeps_user_values() {
        let mut config = Config::new(ModelProvider::OpenAI, "m".into(), "k".into(), "u".into());
        config.temperature = Some(0.9);

        let config = config.with_defaults(0.2, 250);
        assert_eq!(config.temperature, Some(0.9));
        assert_eq!(config.max_tokens, Some(250));
    }
}
