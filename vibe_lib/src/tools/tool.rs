use serde::Serialize;

/// Tool parameter data types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// String.
    String,
    /// Integer.
    Integer,
    /// Number.
    Number,
    /// Boolean.
    Boolean,
}

/// Tool parameter specification.
#[derive(Debug, Clone)]
pub struct ToolParam {
    /// Parameter name.
    pub name: String,
    /// Parameter description.
    pub description: String,
    /// Parameter data type.
    pub data_type: ParamType,
    /// Value is required.
    pub required: bool,
}

/// Tool specification.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool/function name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Tool parameters.
    pub params: Vec<ToolParam>,
}

impl ToolSpec {
    /// Render as `name(param: type, ...)` for plain-text prompts.
    pub fn signature(&self) -> String {
        let params = self.params.iter()
            .map(|p| format!("{}: {}", p.name, p.data_type.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, params)
    }
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "str",
            ParamType::Integer => "int",
            ParamType::Number => "float",
            ParamType::Boolean => "bool",
        }
    }
}

/// Tool choice settings.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolChoice {
    /// Do not use tools.
    None,
    /// LLM decide whether to call any of provided tools or not.
    Auto,
    /// LLM must use any one of the provided tools.
    CallOne,
    /// LLM must call specified tool (name).
    Force(String)
}
