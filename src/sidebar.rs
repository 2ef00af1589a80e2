//! The sidebar: plugin buttons and the windows they open
//!
//! The sidebar owns every open window. Windows are keyed by a [`WindowId`]
//! that is never reused, stay alive until they report themselves closed (or
//! are closed through the sidebar), and are released on the next tick after
//! that.

use crate::config::SharedConfig;
use crate::error::PluginError;
use crate::plugins::{PluginContext, PluginSet, PluginWindow};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Identifier of an open window, unique for the lifetime of a sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Parse `"3"` or `"#3"`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let digits = text.strip_prefix('#').unwrap_or(text);
        digits.parse().ok().map(Self)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct OpenWindow {
    plugin: String,
    window: Box<dyn PluginWindow>,
}

/// Vertical list of plugin buttons plus the table of open windows
///
/// Every activation of a button creates a fresh window, so several windows of
/// the same plugin can be open at once. Windows are polled from [`Sidebar::tick`]
/// on the caller's thread.
pub struct Sidebar {
    plugins: PluginSet,
    context: PluginContext,
    windows: BTreeMap<WindowId, OpenWindow>,
    next_id: u64,
}

impl Sidebar {
    /// Create a sidebar for the loaded plugins
    ///
    /// # Arguments
    ///
    /// * `plugins` - Plugins in display order, as returned by `load_plugins`
    /// * `config` - Configuration shared with every window the sidebar opens
    pub fn new(plugins: PluginSet, config: SharedConfig) -> Self {
        info!("Sidebar created with buttons {:?}", plugins.names());
        Self {
            plugins,
            context: PluginContext::new(config),
            windows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Button labels, top to bottom
    pub fn buttons(&self) -> Vec<&str> {
        self.plugins.names()
    }

    pub fn config(&self) -> &SharedConfig {
        &self.context.config
    }

    /// Open a new window for the named plugin and show it
    ///
    /// # Returns
    ///
    /// The id of the new window, or `PluginError::UnknownPlugin` when no
    /// loaded plugin has that name
    pub fn activate(&mut self, name: &str) -> Result<WindowId, PluginError> {
        let descriptor = self
            .plugins
            .get(name)
            .ok_or_else(|| PluginError::UnknownPlugin(name.to_string()))?;

        let plugin = descriptor.name().to_string();
        let mut window = descriptor.create(self.context.clone());
        window.show();

        let id = self.adopt(plugin, window);
        info!("Opened {} window {}", name, id);
        Ok(id)
    }

    fn adopt(&mut self, plugin: String, window: Box<dyn PluginWindow>) -> WindowId {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.windows.insert(id, OpenWindow { plugin, window });
        id
    }

    /// Poll every open window, then release the ones that have closed
    ///
    /// Returns the ids released by this tick, in ascending order.
    pub fn tick(&mut self, now: Instant) -> Vec<WindowId> {
        for open in self.windows.values_mut() {
            open.window.poll(now);
        }

        let closed: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(_, open)| open.window.is_closed())
            .map(|(id, _)| *id)
            .collect();

        for id in &closed {
            if let Some(open) = self.windows.remove(id) {
                debug!("Released {} window {}", open.plugin, id);
            }
        }

        closed
    }

    /// Close and release a window; `false` if no such window is open
    pub fn close(&mut self, id: WindowId) -> bool {
        match self.windows.remove(&id) {
            Some(mut open) => {
                open.window.close();
                info!("Closed {} window {}", open.plugin, id);
                true
            }
            None => false,
        }
    }

    /// Close every open window
    pub fn close_all(&mut self) {
        let ids: Vec<WindowId> = self.windows.keys().copied().collect();
        for id in ids {
            self.close(id);
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&dyn PluginWindow> {
        self.windows.get(&id).map(|open| &*open.window)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut (dyn PluginWindow + 'static)> {
        self.windows.get_mut(&id).map(|open| &mut *open.window)
    }

    /// Name of the plugin that opened a window
    pub fn plugin_name(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).map(|open| open.plugin.as_str())
    }

    /// Open windows in id order, with their plugin names
    pub fn open_windows(&self) -> impl Iterator<Item = (WindowId, &str, &dyn PluginWindow)> + '_ {
        self.windows
            .iter()
            .map(|(id, open)| (*id, open.plugin.as_str(), &*open.window))
    }

    pub fn open_count(&self) -> usize {
        self.windows.len()
    }
}
