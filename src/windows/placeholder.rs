//! Tools, Reporting and Academy: fixed-text windows with no behavior yet

use crate::error::PluginError;
use crate::plugins::{PluginContext, PluginManifest, PluginWindow};
use log::debug;
use std::time::Instant;

pub const TOOLS: &str = "Tools";
pub const REPORTING: &str = "Reporting";
pub const ACADEMY: &str = "Academy";

pub const TOOLS_TEXT: &str = "This is the Tools plugin window.";
pub const REPORTING_TEXT: &str = "Reporting plugin – future reports can be shown here.";
pub const ACADEMY_TEXT: &str = "Academy plugin – tutorials, courses, and guides will appear here.";

/// A window showing one line of text until it is closed
#[derive(Debug, Clone)]
pub struct PlaceholderWindow {
    title: String,
    body: String,
    visible: bool,
    closed: bool,
}

impl PlaceholderWindow {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            visible: false,
            closed: false,
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl PluginWindow for PlaceholderWindow {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn render(&self) -> String {
        format!("== {} ==\n{}", self.title, self.body)
    }

    fn input(&mut self, line: &str) {
        if line.trim() == "close" {
            self.close();
        } else {
            debug!("{} window ignores input", self.title);
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

fn create_tools(_context: PluginContext) -> Box<dyn PluginWindow> {
    Box::new(PlaceholderWindow::new(TOOLS, TOOLS_TEXT))
}

fn create_reporting(_context: PluginContext) -> Box<dyn PluginWindow> {
    Box::new(PlaceholderWindow::new(REPORTING, REPORTING_TEXT))
}

fn create_academy(_context: PluginContext) -> Box<dyn PluginWindow> {
    Box::new(PlaceholderWindow::new(ACADEMY, ACADEMY_TEXT))
}

pub fn register_tools() -> Result<PluginManifest, PluginError> {
    Ok(PluginManifest::new(TOOLS, create_tools))
}

pub fn register_reporting() -> Result<PluginManifest, PluginError> {
    Ok(PluginManifest::new(REPORTING, create_reporting))
}

pub fn register_academy() -> Result<PluginManifest, PluginError> {
    Ok(PluginManifest::new(ACADEMY, create_academy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> PluginContext {
        PluginContext::new(ConfigManager::new(dir.path().join("config.json")).into_shared())
    }

    #[test]
    fn test_fixed_texts() {
        let dir = TempDir::new().unwrap();
        let cases = [
            (register_tools(), TOOLS, TOOLS_TEXT),
            (register_reporting(), REPORTING, REPORTING_TEXT),
            (register_academy(), ACADEMY, ACADEMY_TEXT),
        ];

        for (manifest, name, text) in cases {
            let descriptor = manifest.unwrap().validate().unwrap();
            assert_eq!(descriptor.name(), name);

            let window = descriptor.create(context(&dir));
            assert_eq!(window.title(), name);
            assert!(window.render().ends_with(text));
        }
    }

    #[test]
    fn test_body_texts_keep_en_dash() {
        assert_eq!(
            REPORTING_TEXT,
            "Reporting plugin \u{2013} future reports can be shown here."
        );
        assert_eq!(
            ACADEMY_TEXT,
            "Academy plugin \u{2013} tutorials, courses, and guides will appear here."
        );
    }

    #[test]
    fn test_close_command() {
        let mut window = PlaceholderWindow::new(TOOLS, TOOLS_TEXT);
        window.show();
        assert!(window.is_visible());

        window.input("hello");
        assert!(!window.is_closed());

        window.input(" close ");
        assert!(window.is_closed());
        assert!(!window.is_visible());
    }

    #[test]
    fn test_poll_is_inert() {
        let mut window = PlaceholderWindow::new(ACADEMY, ACADEMY_TEXT);
        let before = window.render();
        window.poll(Instant::now());
        assert_eq!(window.render(), before);
        assert_eq!(window.body(), ACADEMY_TEXT);
    }
}
