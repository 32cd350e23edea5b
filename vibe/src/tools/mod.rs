//! Tools the templates expose to the model.

mod weather;

use tracing::{debug, warn};
use vibe_lib::llm::ToolParam as InputParam;
use vibe_lib::tools::ToolSpec;
use crate::error::AppError;

pub use weather::Weather;

/// Tool callable by name.
pub trait Tool {
    /// Return tool specification.
    fn spec(&self) -> ToolSpec;

    /// Check params and execute tool. Bad input is reported back to the model as text.
    fn call(&self, params: &[InputParam]) -> Result<String, AppError>;
}

/// Tools available to a template.
#[derive(Default)]
pub struct Toolbox {
    tools: Vec<Box<dyn Tool>>,
}

impl Toolbox {

    /// Empty toolbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toolbox with the mock weather tool.
    pub fn weather() -> Self {
        Self::new().with(Box::new(Weather))
    }

    /// Add a tool.
    pub fn with(mut self, tool: Box<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Specifications of all tools.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Dispatch a call by tool name.
    pub fn call(&self, name: &str, params: &[InputParam]) -> Result<String, AppError> {
        match self.tools.iter().find(|t| t.spec().name == name) {
            Some(tool) => {
                debug!(tool = name, ?params, "calling tool");
                tool.call(params)
            },
            None => {
                warn!(tool = name, "model requested unknown tool");
                Ok(format!("Error: Tool '{name}' not found."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use super::*;

    #[test]
    fn test_dispatch() {
        let toolbox = Toolbox::weather();
        assert_eq!(toolbox.specs().len(), 1);

        let params = vec![InputParam { name: "city".into(), value: Value::String("London".into()) }];
        let out = toolbox.call("get_current_weather", &params).expect("tool output");
        assert!(out.contains("Rainy"));

        let out = toolbox.call("get_stock_price", &params).expect("tool output");
        assert_eq!(out, "Error: Tool 'get_stock_price' not found.");
    }
}
