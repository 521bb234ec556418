//! Configuration management for Wayfarer.
//!
//! Configuration can be set via environment variables:
//! - `MODEL_PROVIDER` - Optional. LLM backend: `openrouter` (default) or `groq`.
//! - `OPENROUTER_API_KEY` - Required when the provider is `openrouter`.
//! - `GROQ_API_KEY` - Required when the provider is `groq`.
//! - `DEFAULT_MODEL` - Optional. Model identifier in the provider's format.
//! - `SERPAPI_API_KEY` - Optional. Backend for flight and hotel search.
//! - `OPENWEATHERMAP_API_KEY` - Optional. Backend for weather forecasts.
//! - `GPLACES_API_KEY` - Optional. Backend for place search.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8001`.
//! - `MAX_TOOL_CALLS` - Optional. Ceiling on cumulative tool calls per
//!   planning request. Defaults to `10`.
//!
//! Data-source keys are not required at startup: a tool whose key is
//! missing reports that in its result, and the model plans around it.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which LLM backend to use. Selected once at startup; call sites only
/// ever see `dyn LlmClient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    OpenRouter,
    Groq,
}

impl ModelProvider {
    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Self::OpenRouter => "OPENROUTER_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    /// Default model identifier for this provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openai/gpt-oss-120b",
            Self::Groq => "meta-llama/llama-4-scout-17b-16e-instruct",
        }
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openrouter" => Ok(Self::OpenRouter),
            "groq" => Ok(Self::Groq),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM backend selection
    pub model_provider: ModelProvider,

    /// API key for the selected LLM backend
    pub llm_api_key: String,

    /// Default model identifier (provider's format)
    pub default_model: String,

    /// SerpAPI key (flight and hotel search)
    pub serpapi_api_key: Option<String>,

    /// OpenWeatherMap key (weather forecasts)
    pub openweathermap_api_key: Option<String>,

    /// Google Places key (attraction/restaurant/activity search)
    pub gplaces_api_key: Option<String>,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Ceiling on cumulative tool calls per planning request
    pub max_tool_calls: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the selected provider's API
    /// key is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_provider = std::env::var("MODEL_PROVIDER")
            .unwrap_or_else(|_| "openrouter".to_string())
            .parse::<ModelProvider>()
            .map_err(|e| ConfigError::InvalidValue("MODEL_PROVIDER".to_string(), e))?;

        let llm_api_key = std::env::var(model_provider.key_env_var())
            .map_err(|_| ConfigError::MissingEnvVar(model_provider.key_env_var().to_string()))?;

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| model_provider.default_model().to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let max_tool_calls = std::env::var("MAX_TOOL_CALLS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_TOOL_CALLS".to_string(), format!("{}", e)))?;

        Ok(Self {
            model_provider,
            llm_api_key,
            default_model,
            serpapi_api_key: std::env::var("SERPAPI_API_KEY").ok(),
            openweathermap_api_key: std::env::var("OPENWEATHERMAP_API_KEY").ok(),
            gplaces_api_key: std::env::var("GPLACES_API_KEY").ok(),
            host,
            port,
            max_tool_calls,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(llm_api_key: String, default_model: String) -> Self {
        Self {
            model_provider: ModelProvider::OpenRouter,
            llm_api_key,
            default_model,
            serpapi_api_key: None,
            openweathermap_api_key: None,
            gplaces_api_key: None,
            host: "127.0.0.1".to_string(),
            port: 8001,
            max_tool_calls: 10,
        }
    }
}
