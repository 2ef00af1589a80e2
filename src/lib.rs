/// Error types for the launcher
pub mod error;

/// Configuration management
pub mod config;

/// Chat providers and the background request worker
pub mod providers;

/// Plugin registration, ordering and the window interface
pub mod plugins;

/// Built-in plugin windows
pub mod windows;

/// Sidebar and the open-window table
pub mod sidebar;

/// Line-oriented front end
pub mod launcher;

// Re-export commonly used types
pub use error::{ConfigError, PluginError, ProviderError};
pub use launcher::Launcher;
pub use sidebar::{Sidebar, WindowId};
