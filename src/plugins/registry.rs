use crate::error::PluginError;
use crate::plugins::{PluginContext, PluginFactory, PluginWindow};
use log::{debug, info, warn};
use std::fmt;

/// Order in which plugins appear in the sidebar
///
/// Registered plugins whose names are not listed here are left out of the
/// loaded [`PluginSet`].
pub const PLUGIN_PRIORITY: [&str; 5] = ["Pilot", "Tools", "Settings", "Reporting", "Academy"];

/// What a plugin module hands over when it registers
///
/// Both fields are optional so that incomplete registrations can be reported
/// and skipped instead of failing the whole load.
#[derive(Clone, Default)]
pub struct PluginManifest {
    pub name: Option<String>,
    pub factory: Option<PluginFactory>,
}

impl PluginManifest {
    /// Manifest with both a name and a factory
    pub fn new(name: &str, factory: PluginFactory) -> Self {
        Self {
            name: Some(name.to_string()),
            factory: Some(factory),
        }
    }

    /// Check the manifest and turn it into a descriptor
    pub fn validate(self) -> Result<PluginDescriptor, PluginError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(PluginError::MissingName),
        };
        let factory = self
            .factory
            .ok_or_else(|| PluginError::MissingFactory(name.clone()))?;

        Ok(PluginDescriptor { name, factory })
    }
}

/// A validated plugin: display name plus window factory
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    factory: PluginFactory,
}

impl PluginDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a new window for this plugin
    pub fn create(&self, context: PluginContext) -> Box<dyn PluginWindow> {
        (self.factory)(context)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A plugin module's registration entry point
#[derive(Clone, Copy)]
pub struct PluginCandidate {
    /// Where the candidate comes from, used in diagnostics
    pub source: &'static str,
    /// Registration call; may fail
    pub register: fn() -> Result<PluginManifest, PluginError>,
}

impl PluginCandidate {
    pub const fn new(
        source: &'static str,
        register: fn() -> Result<PluginManifest, PluginError>,
    ) -> Self {
        Self { source, register }
    }
}

/// Collects plugin registrations before they are ordered for display
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<PluginDescriptor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one candidate
    ///
    /// Names are unique: a second registration under an existing name is
    /// rejected and the first one is kept.
    pub fn register(&mut self, candidate: &PluginCandidate) -> Result<(), PluginError> {
        let descriptor = (candidate.register)()?.validate()?;

        if self.plugins.iter().any(|p| p.name == descriptor.name) {
            return Err(PluginError::DuplicateName(descriptor.name));
        }

        debug!(
            "Registered plugin '{}' from {}",
            descriptor.name, candidate.source
        );
        self.plugins.push(descriptor);
        Ok(())
    }

    /// Register every candidate, warning about and skipping the ones that fail
    pub fn register_all(&mut self, candidates: &[PluginCandidate]) {
        for candidate in candidates {
            if let Err(e) = self.register(candidate) {
                warn!("Failed to load {}: {}", candidate.source, e);
            }
        }
    }

    /// Number of registered plugins, before priority filtering
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Order the registered plugins by [`PLUGIN_PRIORITY`], dropping unlisted ones
    pub fn into_ordered(self) -> PluginSet {
        for plugin in &self.plugins {
            if !PLUGIN_PRIORITY.contains(&plugin.name.as_str()) {
                debug!("Plugin '{}' is not in the priority list", plugin.name);
            }
        }

        let mut plugins = self.plugins;
        let entries = PLUGIN_PRIORITY
            .iter()
            .filter_map(|name| {
                plugins
                    .iter()
                    .position(|p| p.name == *name)
                    .map(|index| plugins.swap_remove(index))
            })
            .collect();

        PluginSet { entries }
    }
}

/// Register all candidates and return them in sidebar order
pub fn load_plugins(candidates: &[PluginCandidate]) -> PluginSet {
    let mut registry = PluginRegistry::new();
    registry.register_all(candidates);
    let set = registry.into_ordered();
    info!("Loaded {} plugins: {:?}", set.len(), set.names());
    set
}

/// Plugins in display order, keyed by name
#[derive(Debug, Clone, Default)]
pub struct PluginSet {
    entries: Vec<PluginDescriptor>,
}

impl PluginSet {
    pub fn get(&self, name: &str) -> Option<&PluginDescriptor> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PluginDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
