use thiserror::Error;

/// App errors
#[derive(Error, Debug)]
pub enum AppError {

    /// Toml parsing error
    #[error("Failed to parse config file: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Config parsing error
    #[error("Failed to parse config file: {0}")]
    ConfigParseError(&'static str),

    /// Missing arguments
    #[error("Missing mandatory arguments: {0}\nPlease create a .env file or pass the options on the command line, see `vibe --help`.")]
    MissingArgError(String),

    /// Invalid argument value
    #[error("Incorrect argument value: {0}")]
    InvalidArgError(&'static str),

    /// Input data file does not exist
    #[error("The {0} file '{1}' was not found.")]
    MissingFile(&'static str, String),

    /// Library error
    #[error("{0}")]
    LibError(#[from] vibe_lib::Error),

    /// Other errors
    #[error("Reading user input: {0}")]
    Rustyline(#[from] rustyline::error::ReadlineError),

    /// Config parsing error
    #[error("The format of the color value is incorrect")]
    ColorParseError,

    /// Application logic error.
    #[error("Application error: {0}")]
    ApplicationError(&'static str),

    /// General error.
    #[error("{0}")]
    Error(String),
}
