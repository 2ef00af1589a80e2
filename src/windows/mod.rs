/// Pilot chat window
pub mod chat;

/// Tools, Reporting and Academy windows
pub mod placeholder;

/// Settings window
pub mod settings;

/// Chat transcript
pub mod transcript;

pub use chat::{ChatState, ChatWindow, TypingIndicator};
pub use placeholder::PlaceholderWindow;
pub use settings::SettingsWindow;
pub use transcript::{Sender, Transcript, TranscriptEntry};

use crate::plugins::PluginCandidate;

/// Registration entry points for the plugins shipped with the launcher
///
/// Listed in module order; the sidebar order comes from the priority list.
pub fn builtin_candidates() -> Vec<PluginCandidate> {
    vec![
        PluginCandidate::new("windows::placeholder (Academy)", placeholder::register_academy),
        PluginCandidate::new("windows::chat", chat::register),
        PluginCandidate::new(
            "windows::placeholder (Reporting)",
            placeholder::register_reporting,
        ),
        PluginCandidate::new("windows::settings", settings::register),
        PluginCandidate::new("windows::placeholder (Tools)", placeholder::register_tools),
    ]
}
