use toml::Table;
use toml::Value;
use crate::options::Options;
use crate::error::AppError;
use crate::util::{parse_colors, ColorPair};

fn get_str_val<'a>(val: &'a Value, err: &'static str) -> Result<&'a str, AppError> {
    val.as_str().ok_or(AppError::ConfigParseError(err))
}

fn get_int_val(val: &Value, err: &'static str) -> Result<i64, AppError> {
    val.as_integer().ok_or(AppError::ConfigParseError(err))
}

fn get_float_val(val: &Value, err: &'static str) -> Result<f64, AppError> {
    match val {
        Value::Float(f) if f.is_finite() => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        _ => Err(AppError::ConfigParseError(err)),
    }
}

fn get_bool_val(val: &Value, err: &'static str) -> Result<bool, AppError> {
    val.as_bool().ok_or(AppError::ConfigParseError(err))
}

fn get_color_val(val: &Value, err: &'static str) -> Result<ColorPair, AppError> {
    let s = get_str_val(val, err)?;
    parse_colors(s).map_err(|_| AppError::ConfigParseError(err))
}

macro_rules! set_str {
    ($table:ident, $key:literal, $option:expr) => {
        if let Some(val) = $table.get($key) {
            $option.replace(get_str_val(val, concat!($key, " must be a string value"))?.to_owned());
        }
    }
}

macro_rules! set_int {
    ($table:ident, $key:literal, $option:expr) => {
        if let Some(val) = $table.get($key) {
            $option.replace(get_int_val(val, concat!($key, " must be an integer value"))?);
        }
    }
}

macro_rules! set_float {
    ($table:ident, $key:literal, $option:expr) => {
        if let Some(val) = $table.get($key) {
            $option.replace(get_float_val(val, concat!($key, " must be a finite float value"))?);
        }
    }
}

macro_rules! set_color {
    ($table:ident, $key:literal, $option:expr) => {
        if let Some(val) = $table.get($key) {
            $option = get_color_val(val, concat!($key, " value must have valid format, e.g. 'fg(255,0,123);bg(0,123,255)'."))?;
        }
    }
}

/// Fill options from the TOML configuration file content.
pub fn parse_toml_config(content: &str, options: &mut Options) -> Result<(), AppError> {

    let toml_config: Table = toml::from_str(content)?;

    if let Some(default_context) = toml_config.get("default_context") {

        let context_name = get_str_val(default_context, "default_context must be a string value")?;

        let ct = toml_config.get(context_name)
            .ok_or(AppError::ConfigParseError("configuration for the default context is not specified"))?
            .as_table()
            .ok_or(AppError::ConfigParseError("default context must be a table"))?;

        set_str!(ct, "provider", options.provider);
        set_str!(ct, "api_key", options.api_key);
        set_str!(ct, "endpoint", options.endpoint);
        set_str!(ct, "api_version", options.api_version);
        set_str!(ct, "chat_model", options.chat_model);
        set_str!(ct, "embedding_model", options.embedding_model);
        set_str!(ct, "embedding_backend", options.embedding_backend);
        set_int!(ct, "batch_size", options.batch_size);
        set_int!(ct, "max_tokens", options.max_tokens);
        set_int!(ct, "n", options.n);
        set_float!(ct, "temperature", options.temperature);
        set_float!(ct, "top_p", options.top_p);
        set_float!(ct, "frequency_penalty", options.frequency_penalty);
        set_float!(ct, "presence_penalty", options.presence_penalty);
        set_str!(ct, "stop_sequence", options.stop_sequence);
        set_str!(ct, "prompt", options.prompt);
        set_str!(ct, "knowledge_base", options.knowledge_base);
        set_int!(ct, "chunk_size", options.chunk_size);
        set_int!(ct, "top_k", options.top_k);
        set_float!(ct, "min_score", options.min_score);
        set_str!(ct, "index", options.index);
        set_int!(ct, "rows", options.rows);
        set_float!(ct, "threshold", options.threshold);

        if let Some(val) = ct.get("keep_history") {
            options.keep_history = get_bool_val(val, "keep_history must be a boolean value")?;
        }
    }

    if let Some(settings_section) = toml_config.get("settings") {
        if let Some(settings) = settings_section.as_table() {
            set_color!(settings, "user_color", options.user_color);
            set_color!(settings, "assistant_color", options.assistant_color);
            set_color!(settings, "tool_color", options.tool_color);
        }
    }

    Ok(())
}
