//! Plugin registry - manages panel plugin lifecycle and routes host events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::placement::Placement;
use crate::plugins::{PanelPlugin, PluginId};

/// Registry for managing panel plugins.
pub struct PluginRegistry {
    plugins: HashMap<PluginId, PanelPlugin>,
    commands: HashMap<&'static str, PluginId>,
    next_id: AtomicU64,
}

impl PluginRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            commands: HashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Load a plugin and take ownership of it.
    ///
    /// # Errors
    /// Returns an error if a plugin for the same placement is already
    /// registered, or if the plugin's configuration cannot be loaded.
    pub async fn register(&mut self, mut plugin: PanelPlugin) -> Result<PluginId> {
        let placement = plugin.placement();
        if self.commands.contains_key(placement.command_id()) {
            return Err(Error::PlacementTaken(placement));
        }
        plugin.load().await?;

        let id = PluginId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.commands.insert(placement.command_id(), id);
        self.plugins.insert(id, plugin);
        Ok(id)
    }

    /// Unload and drop a plugin.
    ///
    /// # Errors
    /// Returns an error if the plugin is not found.
    pub fn unregister(&mut self, id: PluginId) -> Result<()> {
        let mut plugin = self.plugins.remove(&id).ok_or(Error::PluginNotFound(id.0))?;
        self.commands.retain(|_, owner| *owner != id);
        plugin.unload();
        Ok(())
    }

    /// Get a plugin by id.
    #[must_use]
    pub fn get(&self, id: PluginId) -> Option<&PanelPlugin> {
        self.plugins.get(&id)
    }

    /// Get the plugin for a placement.
    #[must_use]
    pub fn find(&self, placement: Placement) -> Option<&PanelPlugin> {
        self.commands
            .get(placement.command_id())
            .and_then(|id| self.plugins.get(id))
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if no plugin is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run the command registered under `command_id`.
    ///
    /// # Errors
    /// Returns an error if no plugin registered the command.
    pub async fn execute(&self, command_id: &str) -> Result<()> {
        let plugin = self
            .commands
            .get(command_id)
            .and_then(|id| self.plugins.get(id))
            .ok_or_else(|| Error::UnknownCommand(command_id.to_string()))?;
        plugin.toggle().await;
        Ok(())
    }

    /// Tell every plugin the active document changed.
    pub async fn active_document_changed(&self) {
        for plugin in self.plugins.values() {
            plugin.active_document_changed().await;
        }
    }

    /// Unload every plugin.
    pub fn unload_all(&mut self) {
        self.commands.clear();
        for (_, mut plugin) in self.plugins.drain() {
            plugin.unload();
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.len())
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
