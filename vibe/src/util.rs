use vibe_lib::ModelProvider;
use crate::AppError;

/// Foreground and background RGB colors.
pub type ColorPair = (Option<[u8;3]>, Option<[u8;3]>);

/// Endpoint kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Api {
    /// Chat completions.
    Chat,
    /// Embeddings.
    Embeddings,
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// API URL by provider. Azure routes by deployment name, OpenAI by the `model` field.
pub fn api_url_for_provider(provider: ModelProvider, endpoint: Option<&str>, model: &str, api: Api) -> Result<String, AppError> {
    let path = match api {
        Api::Chat => "chat/completions",
        Api::Embeddings => "embeddings",
    };

    match provider {
        ModelProvider::OpenAI => {
            let base = endpoint.unwrap_or(OPENAI_BASE_URL).trim_end_matches('/');
            Ok(format!("{base}/{path}"))
        },
        ModelProvider::Azure => {
            let base = endpoint
                .ok_or_else(|| AppError::MissingArgError("endpoint (--endpoint or AZURE_OPENAI_ENDPOINT)".into()))?
                .trim_end_matches('/');
            Ok(format!("{base}/openai/deployments/{model}/{path}"))
        },
    }
}

/// Parse foreground and background colors, e.g. `fg(255,0,123);bg(0,123,255)`.
pub fn parse_colors(s: &str) -> Result<ColorPair, AppError> {
    let s = s.trim().trim_matches(['\'', '"']);
    let mut colors: ColorPair = (None, None);

    for part in s.split(';').map(str::trim) {
        let (slot, rgb) = if let Some(rgb) = part.strip_prefix("fg") {
            (&mut colors.0, rgb)
        } else if let Some(rgb) = part.strip_prefix("bg") {
            (&mut colors.1, rgb)
        } else {
            return Err(AppError::ColorParseError);
        };
        *slot = Some(parse_color(rgb.trim())?);
    }

    Ok(colors)
}

fn parse_color(s: &str) -> Result<[u8;3], AppError> {
    let inner = s.strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(AppError::ColorParseError)?;

    let components = inner.split(',')
        .map(|c| c.trim().parse::<u8>().map_err(|_| AppError::ColorParseError))
        .collect::<Result<Vec<u8>, AppError>>()?;

    <[u8;3]>::try_from(components).map_err(|_| AppError::ColorParseError)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("( 0, 123, 255 )").unwrap(), [0,123,255]);
        assert_eq!(parse_color("(0,123,255)").unwrap(), [0,123,255]);
        assert!(matches!(parse_color("( 256, 123, 123 )").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("( 12, 123, -1 )").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("( 123, 123, 123, 123 )").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("(123, 123)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_color("asdfg").unwrap_err(), AppError::ColorParseError));
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(parse_colors(" bg ( 0, 123, 255 ) ").unwrap(), (None, Some([0,123,255])));
        assert_eq!(parse_colors("fg(0,123,255)").unwrap(), (Some([0,123,255]), None));
        assert_eq!(parse_colors("'fg(255,0,123);bg(0,123,255)'").unwrap(), (Some([255,0,123]), Some([0,123,255])));
        assert_eq!(parse_colors("fg(255,0,123);bg(0,123,255);bg(123,255,0)").unwrap(), (Some([255,0,123]), Some([123,255,0])));
        assert!(matches!(parse_colors("fg(255,0,123);gg(0,123,255)").unwrap_err(), AppError::ColorParseError));
        assert!(matches!(parse_colors("fg(255,0,123)bg(0,123,255)").unwrap_err(), AppError::ColorParseError));
    }

    #[test]
    fn test_api_urls() {
        assert_eq!(
            api_url_for_provider(ModelProvider::OpenAI, None, "gpt-4o-mini", Api::Chat).unwrap(),
            "https://api.openai.com/v1/chat/completions");
        assert_eq!(
            api_url_for_provider(ModelProvider::OpenAI, Some("http://localhost:8080/v1/"), "m", Api::Embeddings).unwrap(),
            "http://localhost:8080/v1/embeddings");
        assert_eq!(
            api_url_for_provider(ModelProvider::Azure, Some("https://res.openai.azure.com/"), "gpt35", Api::Chat).unwrap(),
            "https://res.openai.azure.com/openai/deployments/gpt35/chat/completions");
        assert_eq!(
            api_url_for_provider(ModelProvider::Azure, Some("https://res.openai.azure.com"), "ada", Api::Embeddings).unwrap(),
            "https://res.openai.azure.com/openai/deployments/ada/embeddings");
        assert!(matches!(
            api_url_for_provider(ModelProvider::Azure, None, "ada", Api::Embeddings),
            Err(AppError::MissingArgError(_))));
    }
}
