use crate::config::{lock_config, LlmProvider, SharedConfig};
use crate::error::{ConfigError, PluginError};
use crate::plugins::{PluginContext, PluginManifest, PluginWindow};
use log::{debug, info, warn};
use std::time::Instant;

pub const PLUGIN_NAME: &str = "Settings";

/// Acknowledgement shown after a successful save
pub const SAVED_MESSAGE: &str = "Configuration saved successfully.";

/// Settings window: provider selection and API key
///
/// Fields are pre-filled from the shared configuration when the window is
/// created. Nothing is written back until [`SettingsWindow::save`].
pub struct SettingsWindow {
    config: SharedConfig,
    llm: LlmProvider,
    api_key: String,
    status: Option<String>,
    visible: bool,
    closed: bool,
}

impl SettingsWindow {
    pub fn new(config: SharedConfig) -> Self {
        let (llm, api_key) = {
            let manager = lock_config(&config);
            let current = manager.config();
            // Identifiers outside the selectable set fall back to the first choice
            let llm = if current.llm.is_selectable() {
                current.llm.clone()
            } else {
                LlmProvider::Gemini
            };
            (llm, current.api_key.clone())
        };

        Self {
            config,
            llm,
            api_key,
            status: None,
            visible: false,
            closed: false,
        }
    }

    /// Currently selected provider
    pub fn llm(&self) -> &LlmProvider {
        &self.llm
    }

    /// Current contents of the API key field
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Last acknowledgement or validation message
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Choose a provider from the selectable set
    pub fn select_llm(&mut self, choice: &str) -> Result<(), ConfigError> {
        let provider = LlmProvider::from(choice.trim());
        if !provider.is_selectable() {
            return Err(ConfigError::ValidationError(format!(
                "Unknown LLM '{}', expected one of: {}",
                choice.trim(),
                selectable_list()
            )));
        }
        self.llm = provider;
        Ok(())
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = key.to_string();
    }

    /// Write both fields to the configuration, persist it and close
    ///
    /// The API key is trimmed before it is stored. If the file cannot be
    /// written the in-memory configuration keeps the new values and the window
    /// stays open with the error as its status.
    pub fn save(&mut self) -> Result<(), ConfigError> {
        let result = {
            let mut manager = lock_config(&self.config);
            let config = manager.config_mut();
            config.llm = self.llm.clone();
            config.api_key = self.api_key.trim().to_string();
            manager.try_save()
        };

        match result {
            Ok(()) => {
                info!("Settings saved (llm={})", self.llm);
                self.status = Some(SAVED_MESSAGE.to_string());
                self.close();
                Ok(())
            }
            Err(e) => {
                warn!("Settings could not be saved: {}", e);
                self.status = Some(format!("Failed to save configuration: {}", e));
                Err(e)
            }
        }
    }

    fn masked_key(&self) -> String {
        "*".repeat(self.api_key.chars().count())
    }
}

fn selectable_list() -> String {
    LlmProvider::SELECTABLE
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PluginWindow for SettingsWindow {
    fn title(&self) -> String {
        PLUGIN_NAME.to_string()
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn render(&self) -> String {
        let mut lines = vec![
            format!("== {} ==", PLUGIN_NAME),
            format!("LLM: {} ({})", self.llm, selectable_list()),
            format!("API key: {}", self.masked_key()),
            "Commands: llm <name>, key <value>, save, cancel".to_string(),
        ];
        if let Some(status) = &self.status {
            lines.push(status.clone());
        }
        lines.join("\n")
    }

    fn input(&mut self, line: &str) {
        let line = line.trim_start();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest),
            None => (line.trim_end(), ""),
        };

        match command {
            "llm" => match self.select_llm(rest) {
                Ok(()) => self.status = None,
                Err(e) => self.status = Some(e.to_string()),
            },
            "key" => {
                self.set_api_key(rest);
                self.status = None;
            }
            "save" => {
                if let Err(e) = self.save() {
                    debug!("Save command failed, window stays open: {}", e);
                }
            }
            "cancel" => self.close(),
            other => self.status = Some(format!("Unknown command: {}", other)),
        }
    }

    fn poll(&mut self, _now: Instant) {}

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) {
        self.visible = false;
        self.closed = true;
    }
}

fn create(context: PluginContext) -> Box<dyn PluginWindow> {
    Box::new(SettingsWindow::new(context.config))
}

/// Registration entry point for the Settings plugin
pub fn register() -> Result<PluginManifest, PluginError> {
    Ok(PluginManifest::new(PLUGIN_NAME, create))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::fs;
    use tempfile::TempDir;

    fn shared_config(dir: &TempDir, llm: &str, api_key: &str) -> SharedConfig {
        let mut manager = ConfigManager::new(dir.path().join("config").join("config.json"));
        manager.config_mut().llm = LlmProvider::from(llm);
        manager.config_mut().api_key = api_key.to_string();
        manager.into_shared()
    }

    #[test]
    fn test_prefills_current_values() {
        let dir = TempDir::new().unwrap();
        let window = SettingsWindow::new(shared_config(&dir, "grok", "abc"));

        assert_eq!(window.llm(), &LlmProvider::Grok);
        assert_eq!(window.api_key(), "abc");
        assert!(window.status().is_none());
    }

    #[test]
    fn test_unknown_llm_prefills_gemini() {
        let dir = TempDir::new().unwrap();
        let window = SettingsWindow::new(shared_config(&dir, "claude", ""));
        assert_eq!(window.llm(), &LlmProvider::Gemini);
    }

    #[test]
    fn test_select_llm_closed_set() {
        let dir = TempDir::new().unwrap();
        let mut window = SettingsWindow::new(shared_config(&dir, "gemini", ""));

        assert!(window.select_llm("chatgpt").is_ok());
        assert_eq!(window.llm(), &LlmProvider::ChatGpt);

        let err = window.select_llm("llama").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert_eq!(window.llm(), &LlmProvider::ChatGpt);
    }

    #[test]
    fn test_save_trims_key_persists_and_closes() {
        let dir = TempDir::new().unwrap();
        let config = shared_config(&dir, "gemini", "");
        let mut window = SettingsWindow::new(config.clone());
        window.show();

        window.select_llm("grok").unwrap();
        window.set_api_key("  my-key \n");
        window.save().unwrap();

        assert_eq!(window.status(), Some(SAVED_MESSAGE));
        assert!(window.is_closed());

        {
            let manager = lock_config(&config);
            assert_eq!(manager.config().llm, LlmProvider::Grok);
            assert_eq!(manager.config().api_key, "my-key");
        }

        let path = dir.path().join("config").join("config.json");
        let reloaded = ConfigManager::new(&path);
        assert_eq!(reloaded.config().llm, LlmProvider::Grok);
        assert_eq!(reloaded.config().api_key, "my-key");
    }

    #[test]
    fn test_save_failure_keeps_window_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::create_dir_all(&path).unwrap();
        let config = ConfigManager::new(&path).into_shared();
        let mut window = SettingsWindow::new(config);

        window.set_api_key("k");
        assert!(window.save().is_err());
        assert!(!window.is_closed());
        assert!(window
            .status()
            .unwrap()
            .starts_with("Failed to save configuration"));
    }

    #[test]
    fn test_line_commands() {
        let dir = TempDir::new().unwrap();
        let config = shared_config(&dir, "gemini", "");
        let mut window = SettingsWindow::new(config.clone());

        window.input("llm chatgpt");
        assert_eq!(window.llm(), &LlmProvider::ChatGpt);

        window.input("llm nonsense");
        assert!(window.status().unwrap().contains("nonsense"));
        assert_eq!(window.llm(), &LlmProvider::ChatGpt);

        window.input("key  secret value ");
        assert_eq!(window.api_key(), " secret value ");
        assert!(window.render().contains(&format!("API key: {}", "*".repeat(14))));
        assert!(!window.render().contains("secret"));

        window.input("frobnicate");
        assert_eq!(window.status(), Some("Unknown command: frobnicate"));

        window.input("save");
        assert!(window.is_closed());
        assert_eq!(lock_config(&config).config().api_key, "secret value");
    }

    #[test]
    fn test_save_command_failure_reports_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::create_dir_all(&path).unwrap();
        let mut window = SettingsWindow::new(ConfigManager::new(&path).into_shared());

        window.input("key k");
        window.input("save");

        assert!(!window.is_closed());
        assert!(window
            .render()
            .contains("Failed to save configuration"));
    }

    #[test]
    fn test_cancel_discards_changes() {
        let dir = TempDir::new().unwrap();
        let config = shared_config(&dir, "gemini", "kept-key");
        let mut window = SettingsWindow::new(config.clone());

        window.input("key replaced");
        window.input("cancel");

        assert!(window.is_closed());
        assert_eq!(lock_config(&config).config().api_key, "kept-key");
    }

    #[test]
    fn test_render_masks_key() {
        let dir = TempDir::new().unwrap();
        let window = SettingsWindow::new(shared_config(&dir, "gemini", "abcd"));
        let rendered = window.render();

        assert!(rendered.contains("API key: ****"));
        assert!(rendered.contains("LLM: gemini (gemini, chatgpt, grok)"));
        assert!(!rendered.contains("abcd"));
    }
}
