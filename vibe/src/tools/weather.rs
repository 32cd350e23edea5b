use serde_json::json;
use vibe_lib::tools::{ParamType, ToolParam, ToolSpec};
use vibe_lib::llm::ToolParam as InputParam;
use crate::error::AppError;
use super::Tool;

const CITIES: [(&str, &str, &str, &str);3] = [
    ("san francisco", "San Francisco", "75°F", "Sunny"),
    ("new york", "New York", "68°F", "Cloudy"),
    ("london", "London", "59°F", "Rainy"),
];

/// Mock weather service.
pub struct Weather;

impl Weather {
    /// Weather report as JSON text.
    pub fn report(city: &str) -> String {
        let lower = city.to_lowercase();
        match CITIES.iter().find(|(key, ..)| lower.contains(key)) {
            Some((_, name, temperature, condition)) => 
                json!({"city": name, "temperature": temperature, "condition": condition}).to_string(),
            None => json!({"city": city, "error": "City not found"}).to_string(),
        }
    }
}

impl Tool for Weather {

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_current_weather".to_owned(),
            description: "Gets the current weather for a given city.".to_owned(),
            params: vec![
                ToolParam {
                    name: "city".to_owned(),
                    description: "The city, e.g., San Francisco".to_owned(),
                    data_type: ParamType::String,
                    required: true,
                }
            ]
        }
    }

    fn call(&self, params: &[InputParam]) -> Result<String, AppError> {
        if params.len() == 1 {
            let param = &params[0];
            if param.name == "city" {
                if let Some(city) = param.value.as_str() {
                    Ok(Self::report(city))
                } else {
                    Ok("wrong parameter value type, expect 1 parameter called \"city\" of type string.".to_owned())
                }
            } else {
                Ok("wrong parameter name, expect 1 parameter called \"city\" of type string.".to_owned())
            }
        } else {
            Ok("wrong number of input parameters, expect 1 parameter called \"city\" of type string.".to_owned())
        }
    }
}
