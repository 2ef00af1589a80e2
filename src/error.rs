use thiserror::Error;

/// Errors that can occur while reading, validating or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration value: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Errors that can occur while talking to a chat provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("API key not configured. Please set it in the settings.")]
    MissingApiKey,

    #[error("API error: {0}")]
    BackendError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Worker failed: {0}")]
    WorkerError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::HttpError(err.to_string())
    }
}

/// Errors that can occur while registering or activating plugins
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    #[error("Failed to load plugin: {0}")]
    LoadError(String),

    #[error("Plugin does not expose a name")]
    MissingName,

    #[error("Plugin '{0}' does not expose a window factory")]
    MissingFactory(String),

    #[error("Plugin '{0}' is already registered")]
    DuplicateName(String),

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),
}
