use crate::config::SharedConfig;
use std::time::Instant;

/// A plugin's window, as seen by the sidebar and the front end
///
/// Windows live on the UI thread. [`PluginWindow::poll`] is called on every
/// tick of the event loop so windows can advance timers and collect results
/// from background work without blocking.
#[cfg_attr(test, mockall::automock)]
pub trait PluginWindow {
    /// Window title
    fn title(&self) -> String;

    /// Make the window visible; must return immediately
    fn show(&mut self);

    /// Plain-text rendering of the window's current state
    fn render(&self) -> String;

    /// Handle one line of user input
    fn input(&mut self, line: &str);

    /// Advance timers and drain pending results
    fn poll(&mut self, now: Instant);

    /// Whether the window has been closed and can be released
    fn is_closed(&self) -> bool;

    /// Close the window
    fn close(&mut self);
}

/// Dependencies handed to a plugin factory
#[derive(Clone)]
pub struct PluginContext {
    /// Configuration shared by every window
    pub config: SharedConfig,
}

impl PluginContext {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }
}

/// Constructs a plugin's window
pub type PluginFactory = fn(PluginContext) -> Box<dyn PluginWindow>;
