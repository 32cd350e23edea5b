use thiserror::Error as ThisError;

/// Library errors.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Transport error.
    #[error("Failed to call LLM: {0}")]
    LLMCallError(#[from] reqwest::Error),

    /// Payload or response is not valid JSON.
    #[error("Failed to process LLM call: {0}")]
    LLMJsonError(#[from] serde_json::Error),

    /// Response has unexpected shape.
    #[error("Failed to parse LLM response: {0}")]
    LLMResponseError(&'static str),

    /// LLM response error message.
    #[error("LLM provider responded with error: {0}")]
    LLMErrorMessage(String),

    /// Vectors of different length were compared.
    #[error("Embedding dimensions do not match: {0} != {1}")]
    DimensionMismatch(usize, usize),

    /// Argument value is out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Data file can't be parsed.
    #[error("Failed to parse {0}: {1}")]
    DataFormat(String, String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Local model error.
    #[error("Candle core error: {0}")]
    CandleCoreError(#[from] candle_core::Error),

    /// Hugging Face hub API error.
    #[error("Huggingface hub API call: {0}")]
    HfApiCall(#[from] hf_hub::api::sync::ApiError),

    /// General error.
    #[error("{0}")]
    Error(String),
}
