/// Plugin registration, ordering and the window interface
pub mod registry;
pub mod window;

pub use registry::{
    load_plugins, PluginCandidate, PluginDescriptor, PluginManifest, PluginRegistry, PluginSet,
    PLUGIN_PRIORITY,
};
pub use window::{PluginContext, PluginFactory, PluginWindow};

#[cfg(test)]
pub use window::MockPluginWindow;
