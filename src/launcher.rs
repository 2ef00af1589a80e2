//! Line-oriented front end over the sidebar
//!
//! The launcher turns typed lines into sidebar actions and routes everything
//! else to the focused window. It never prints; callers get the text to show.

use crate::sidebar::{Sidebar, WindowId};
use log::debug;
use std::time::Instant;

const HELP: &str = "\
Commands:
  help            show this help
  list            list sidebar buttons
  open <Name>     open a new plugin window and focus it
  windows         list open windows
  focus <id>      focus an open window
  close [id]      close a window (default: the focused one)
  quit            close every window and exit
Any other line is sent to the focused window.";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Open(String),
    Windows,
    Focus(WindowId),
    Close(Option<WindowId>),
    Quit,
    /// Input for the focused window
    Forward(String),
}

impl Command {
    /// Parse a line; `Err` carries a usage message
    pub fn parse(line: &str) -> Result<Command, String> {
        let trimmed = line.trim();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        match word {
            "help" if rest.is_empty() => Ok(Command::Help),
            "list" if rest.is_empty() => Ok(Command::List),
            "windows" if rest.is_empty() => Ok(Command::Windows),
            "quit" if rest.is_empty() => Ok(Command::Quit),
            "open" => {
                if rest.is_empty() {
                    Err("Usage: open <Name>".to_string())
                } else {
                    Ok(Command::Open(rest.to_string()))
                }
            }
            "focus" => WindowId::parse(rest)
                .map(Command::Focus)
                .ok_or_else(|| format!("Invalid window id: '{}'", rest)),
            "close" if rest.is_empty() => Ok(Command::Close(None)),
            "close" => WindowId::parse(rest)
                .map(|id| Command::Close(Some(id)))
                .ok_or_else(|| format!("Invalid window id: '{}'", rest)),
            _ => Ok(Command::Forward(line.to_string())),
        }
    }
}

pub struct Launcher {
    sidebar: Sidebar,
    focused: Option<WindowId>,
    last_render: Option<String>,
    running: bool,
}

impl Launcher {
    pub fn new(sidebar: Sidebar) -> Self {
        Self {
            sidebar,
            focused: None,
            last_render: None,
            running: true,
        }
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    /// `false` once `quit` has been handled
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Text shown when the launcher starts
    pub fn banner(&self) -> String {
        format!(
            "Nova sidebar: {}\nType 'help' for commands.",
            self.sidebar.buttons().join(" | ")
        )
    }

    /// Handle one line of input and return the output to show
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        if !self.running {
            return Vec::new();
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(usage) => return vec![usage],
        };
        debug!("Launcher command {:?}", command);

        match command {
            Command::Help => vec![HELP.to_string()],
            Command::List => self
                .sidebar
                .buttons()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            Command::Open(name) => match self.sidebar.activate(&name) {
                Ok(id) => {
                    self.focused = Some(id);
                    self.render_focused().into_iter().collect()
                }
                Err(e) => vec![e.to_string()],
            },
            Command::Windows => self.list_windows(),
            Command::Focus(id) => {
                if self.sidebar.window(id).is_some() {
                    self.focused = Some(id);
                    self.render_focused().into_iter().collect()
                } else {
                    vec![format!("No open window {}", id)]
                }
            }
            Command::Close(target) => self.close(target),
            Command::Quit => {
                self.sidebar.close_all();
                self.focused = None;
                self.running = false;
                vec!["Goodbye.".to_string()]
            }
            Command::Forward(text) => self.forward(&text),
        }
    }

    /// Pump the sidebar; returns the focused window's rendering if it changed
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        let released = self.sidebar.tick(now);

        if let Some(id) = self.focused {
            if released.contains(&id) {
                self.focused = None;
                self.last_render = None;
                return Some(format!("Window {} closed.", id));
            }
        }

        let id = self.focused?;
        let rendered = self.sidebar.window(id)?.render();
        if self.last_render.as_deref() == Some(rendered.as_str()) {
            return None;
        }
        self.last_render = Some(rendered.clone());
        Some(rendered)
    }

    fn forward(&mut self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let id = match self.focused {
            Some(id) => id,
            None => return vec!["No window is focused. Use 'open <Name>' first.".to_string()],
        };

        match self.sidebar.window_mut(id) {
            Some(window) => {
                window.input(text);
                self.render_focused().into_iter().collect()
            }
            None => {
                self.focused = None;
                vec![format!("Window {} is no longer open.", id)]
            }
        }
    }

    fn close(&mut self, target: Option<WindowId>) -> Vec<String> {
        let id = match target.or(self.focused) {
            Some(id) => id,
            None => return vec!["No window to close.".to_string()],
        };

        if !self.sidebar.close(id) {
            return vec![format!("No open window {}", id)];
        }
        if self.focused == Some(id) {
            self.focused = None;
            self.last_render = None;
        }
        vec![format!("Window {} closed.", id)]
    }

    fn list_windows(&self) -> Vec<String> {
        if self.sidebar.open_count() == 0 {
            return vec!["No open windows.".to_string()];
        }

        self.sidebar
            .open_windows()
            .map(|(id, plugin, window)| {
                let marker = if self.focused == Some(id) { "*" } else { " " };
                format!("{}{} {} - {}", marker, id, plugin, window.title())
            })
            .collect()
    }

    fn render_focused(&mut self) -> Option<String> {
        let id = self.focused?;
        let rendered = self.sidebar.window(id)?.render();
        self.last_render = Some(rendered.clone());
        Some(rendered)
    }
}
