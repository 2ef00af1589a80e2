use crate::error::ConfigError;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Directory holding the configuration file, relative to the working directory
pub const CONFIG_DIR: &str = "config";

/// Configuration file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.json";

/// Configuration shared between the sidebar and every plugin window
pub type SharedConfig = Arc<Mutex<ConfigManager>>;

/// Lock the shared configuration, recovering it if a previous holder panicked
pub fn lock_config(config: &SharedConfig) -> MutexGuard<'_, ConfigManager> {
    config
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Default location of the configuration file (`config/config.json`)
pub fn default_config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Language model provider selected in the settings window
///
/// Only `gemini`, `chatgpt` and `grok` can be chosen from the settings window.
/// Any other identifier found on disk is kept verbatim so that saving the
/// configuration writes back exactly what was read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LlmProvider {
    Gemini,
    ChatGpt,
    Grok,
    Other(String),
}

impl LlmProvider {
    /// Providers offered by the settings window, in display order
    pub const SELECTABLE: [LlmProvider; 3] =
        [LlmProvider::Gemini, LlmProvider::ChatGpt, LlmProvider::Grok];

    /// Identifier as stored in the configuration file
    pub fn as_str(&self) -> &str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::ChatGpt => "chatgpt",
            LlmProvider::Grok => "grok",
            LlmProvider::Other(name) => name,
        }
    }

    /// Whether this provider is one of the selectable identifiers
    pub fn is_selectable(&self) -> bool {
        !matches!(self, LlmProvider::Other(_))
    }
}

impl From<String> for LlmProvider {
    fn from(value: String) -> Self {
        match value.as_str() {
            "gemini" => LlmProvider::Gemini,
            "chatgpt" => LlmProvider::ChatGpt,
            "grok" => LlmProvider::Grok,
            _ => LlmProvider::Other(value),
        }
    }
}

impl From<&str> for LlmProvider {
    fn from(value: &str) -> Self {
        LlmProvider::from(value.to_string())
    }
}

impl From<LlmProvider> for String {
    fn from(value: LlmProvider) -> Self {
        match value {
            LlmProvider::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configuration mapping persisted to `config/config.json`
///
/// Missing keys take their defaults when the file is read, so both fields are
/// always present in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Selected language model provider
    pub llm: LlmProvider,
    /// Opaque API key for the provider, empty when unset
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmProvider::Gemini,
            api_key: String::new(),
        }
    }
}

impl Config {
    /// Whether an API key has been configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Loads and saves the launcher configuration on a best-effort basis
///
/// Neither [`ConfigManager::load`] nor [`ConfigManager::save`] surfaces an error:
/// unreadable or malformed files leave the in-memory configuration untouched,
/// and failed writes are logged. Saving overwrites the file in place with no
/// atomic rename and no backup.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Create a manager for the given file and load it
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut manager = Self {
            path: path.into(),
            config: Config::default(),
        };
        manager.load();
        manager
    }

    /// Create a manager for `config/config.json` and load it
    pub fn open_default() -> Self {
        Self::new(default_config_path())
    }

    /// Wrap this manager for sharing with plugin windows
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(Mutex::new(self))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mutable access to the in-memory configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Reload the configuration from disk
    ///
    /// Creates the containing directory if it is missing. If the file is
    /// absent, unreadable or malformed, the current configuration is kept.
    pub fn load(&mut self) {
        if let Err(e) = self.ensure_dir() {
            warn!(
                "Could not create configuration directory for {}: {}",
                self.path.display(),
                e
            );
        }

        if !self.path.exists() {
            debug!(
                "No configuration file at {}, using defaults",
                self.path.display()
            );
            return;
        }

        match Self::read_file(&self.path) {
            Ok(config) => {
                info!(
                    "Loaded configuration from {} (llm={})",
                    self.path.display(),
                    config.llm
                );
                self.config = config;
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable configuration {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }

    /// Persist the configuration, logging instead of returning any failure
    pub fn save(&self) {
        if let Err(e) = self.try_save() {
            error!(
                "Failed to save configuration to {}: {}",
                self.path.display(),
                e
            );
        }
    }

    /// Persist the configuration as 2-space indented JSON
    pub fn try_save(&self) -> Result<(), ConfigError> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.path, json)?;
        info!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    fn read_file(path: &Path) -> Result<Config, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn ensure_dir(&self) -> Result<(), ConfigError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                fs::create_dir_all(dir)?;
                debug!("Created configuration directory {}", dir.display());
                Ok(())
            }
            _ => Ok(()),
        }
    }
}


// Property-based tests
#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use tempfile::TempDir;

    /// Saving then loading reproduces the exact mapping, including empty and multi-byte keys
    #[quickcheck]
    fn prop_save_load_round_trip(llm: String, api_key: String) -> bool {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);

        let mut manager = ConfigManager::new(&path);
        manager.config_mut().llm = LlmProvider::from(llm);
        manager.config_mut().api_key = api_key;
        let expected = manager.config().clone();
        manager.save();

        let reloaded = ConfigManager::new(&path);
        reloaded.config() == &expected
    }

    #[quickcheck]
    fn prop_multibyte_api_key_round_trip(suffix: String) -> bool {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let key = format!("ключ-密钥-🔑{}", suffix);

        let mut manager = ConfigManager::new(&path);
        manager.config_mut().api_key = key.clone();
        manager.save();

        ConfigManager::new(&path).config().api_key == key
    }
}
