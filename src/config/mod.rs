/// JSON-backed launcher configuration
pub mod manager;

pub use manager::{
    default_config_path, lock_config, Config, ConfigManager, LlmProvider, SharedConfig, CONFIG_DIR,
    CONFIG_FILE,
};
