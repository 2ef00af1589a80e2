//! Append-only chat transcript
//!
//! Each chat window owns one transcript. Entries are never removed, and the
//! scroll position always follows the newest entry.

use chrono::{DateTime, Utc};
use std::fmt;

/// Who a transcript entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    /// The person typing into the window
    You,
    /// The provider's reply
    Ai,
    /// Errors and other local notices
    System,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::You => "You",
            Sender::Ai => "AI",
            Sender::System => "System",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    scroll_position: usize,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and scroll to it
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        });
        self.scroll_position = self.entries.len() - 1;
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry the view is scrolled to
    pub fn scroll_position(&self) -> usize {
        self.scroll_position
    }

    /// Number of entries attributed to `sender`
    pub fn count_from(&self, sender: Sender) -> usize {
        self.entries.iter().filter(|e| e.sender == sender).count()
    }
}
