//! Travel-data tools available to the planning model.
//!
//! Tools are registered once at startup into a fixed registry; the
//! planning loop dispatches model-requested calls by name. A lookup miss
//! or an argument payload that does not match the declared schema is a
//! dispatch-level defect and escalates to the caller. A tool whose
//! backend call fails reports the failure as its result instead, so the
//! model can adapt.

mod expenses;
mod flights;
mod hotels;
mod places;
mod weather;

pub use expenses::{DailyBudget, EstimateHotelCost, TotalExpense};
pub use flights::SearchFlights;
pub use hotels::SearchHotels;
pub use places::{SearchActivities, SearchAttractions, SearchRestaurants};
pub use weather::WeatherForecast;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::llm::ToolCall;

/// A named capability the model may request mid-conversation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name, as exposed to the model.
    fn name(&self) -> &str;

    /// What the tool does and when to use it.
    fn description(&self) -> &str;

    /// JSON schema for the argument object.
    fn parameters_schema(&self) -> Value;

    /// Run the tool. The argument object has already been validated
    /// against [`Tool::parameters_schema`].
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Why a dispatch failed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The model named a tool that was never registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The argument payload does not match the tool's declared schema.
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// The tool ran and failed; safe to report back to the model.
    #[error("{tool} failed: {source}")]
    ToolFailed {
        tool: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Name and description pair, for prompt rendering.
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Fixed name-to-handler mapping, built once at startup.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Register the standard travel tool set.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::new();

        Self::from_tools(vec![
            Arc::new(SearchFlights::new(config.serpapi_api_key.clone(), http.clone())),
            Arc::new(SearchHotels::new(config.serpapi_api_key.clone(), http.clone())),
            Arc::new(WeatherForecast::new(
                config.openweathermap_api_key.clone(),
                http.clone(),
            )),
            Arc::new(SearchAttractions::new(config.gplaces_api_key.clone(), http.clone())),
            Arc::new(SearchRestaurants::new(config.gplaces_api_key.clone(), http.clone())),
            Arc::new(SearchActivities::new(config.gplaces_api_key.clone(), http)),
            Arc::new(EstimateHotelCost),
            Arc::new(TotalExpense),
            Arc::new(DailyBudget),
        ])
    }

    /// Build a registry from an explicit tool set.
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Names and descriptions of every registered tool.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|tool| ToolInfo {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect()
    }

    /// Function schemas in the chat-completions wire format.
    pub fn tool_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema(),
                    }
                })
            })
            .collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Execute a tool by name with an already-parsed argument object.
    pub async fn run(&self, name: &str, args: Value) -> Result<String, DispatchError> {
        let tool = self
            .find(name)
            .ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        if let Err(reason) = validate_args(&tool.parameters_schema(), &args) {
            return Err(DispatchError::InvalidArguments {
                tool: name.to_string(),
                reason,
            });
        }

        tracing::debug!(tool = %name, "executing tool");
        tool.execute(args)
            .await
            .map_err(|source| DispatchError::ToolFailed {
                tool: name.to_string(),
                source,
            })
    }

    /// Dispatch a model-issued tool call.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<String, DispatchError> {
        let args: Value = serde_json::from_str(&call.function.arguments).map_err(|e| {
            DispatchError::InvalidArguments {
                tool: call.function.name.clone(),
                reason: format!("arguments are not valid JSON: {}", e),
            }
        })?;

        self.run(&call.function.name, args).await
    }
}

/// Check an argument object against a schema declaration: every required
/// property present and non-null, every present property matching its
/// declared primitive type. Unknown properties pass through untouched.
fn validate_args(schema: &Value, args: &Value) -> Result<(), String> {
    let Some(given) = args.as_object() else {
        return Err("argument payload must be a JSON object".to_string());
    };

    let required: Vec<&str> = schema["required"]
        .as_array()
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for key in &required {
        if !given.contains_key(*key) || given[*key].is_null() {
            return Err(format!("missing required argument '{}'", key));
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (key, value) in given {
            // Models sometimes send explicit nulls for omitted optionals.
            if value.is_null() {
                continue;
            }
            let Some(expected) = properties.get(key).and_then(|p| p["type"].as_str()) else {
                continue;
            };
            if !type_matches(expected, value) {
                return Err(format!("argument '{}' should be of type {}", key, expected));
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FunctionCall;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the message back."
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "repeat": { "type": "integer" }
                },
                "required": ["message"]
            })
        }

        async fn execute(&self, args: Value) -> anyhow::Result<String> {
            Ok(args["message"].as_str().unwrap_or_default().to_string())
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl Tool for AlwaysFails {
        fn name(&self) -> &str {
            "always_fails"
        }

        fn description(&self) -> &str {
            "Fails on every call."
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object", "properties": {}, "required": [] })
        }

        async fn execute(&self, _args: Value) -> anyhow::Result<String> {
            anyhow::bail!("backend unavailable")
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::from_tools(vec![Arc::new(Echo), Arc::new(AlwaysFails)])
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call-1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn dispatch_runs_the_named_tool() {
        let result = registry()
            .dispatch(&call("echo", r#"{"message":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_dispatch_error() {
        let err = registry()
            .dispatch(&call("no_such_tool", "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownTool(name) if name == "no_such_tool"));
    }

    #[tokio::test]
    async fn missing_required_argument_is_rejected() {
        let err = registry()
            .dispatch(&call("echo", r#"{"repeat":2}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn wrong_argument_type_is_rejected() {
        let err = registry()
            .dispatch(&call("echo", r#"{"message":"hi","repeat":"twice"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn null_optional_argument_is_accepted() {
        let result = registry()
            .dispatch(&call("echo", r#"{"message":"hi","repeat":null}"#))
            .await
            .unwrap();
        assert_eq!(result, "hi");
    }

    #[tokio::test]
    async fn malformed_argument_json_is_rejected() {
        let err = registry()
            .dispatch(&call("echo", "message=hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn tool_failure_is_wrapped_not_propagated() {
        let err = registry()
            .dispatch(&call("always_fails", "{}"))
            .await
            .unwrap_err();
        match err {
            DispatchError::ToolFailed { tool, source } => {
                assert_eq!(tool, "always_fails");
                assert!(source.to_string().contains("backend unavailable"));
            }
            other => panic!("expected ToolFailed, got {:?}", other),
        }
    }

    #[test]
    fn schemas_use_the_function_wire_format() {
        let schemas = registry().tool_schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0]["type"], "function");
        assert_eq!(schemas[0]["function"]["name"], "echo");
        assert!(schemas[0]["function"]["parameters"]["properties"].is_object());
    }
}
