//! Panel plugins.
//!
//! A [`PanelPlugin`] ties one placement's configuration, runtime state and
//! [`PanelManager`] to the host. The [`PluginRegistry`] holds several of them
//! and routes host events.

mod context;
mod registry;

pub use context::PluginContext;
pub use registry::PluginRegistry;

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigStore, PanelConfig, SharedConfig};
use crate::error::Result;
use crate::host::CommandSpec;
use crate::manager::PanelManager;
use crate::placement::Placement;
use crate::state::{RuntimeState, SharedState};

/// Unique identifier for a plugin instance.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct PluginId(pub u64);

impl std::fmt::Display for PluginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One directory-scoped panel: footer, left sidebar or right sidebar.
///
/// Configuration operations persist immediately and never touch the
/// runtime state or the shown panel. Toggling and resizing only touch the
/// runtime state and never save.
pub struct PanelPlugin {
    placement: Placement,
    store: Arc<dyn ConfigStore>,
    context: PluginContext,
    settings: SharedConfig,
    runtime: SharedState,
    manager: Option<PanelManager>,
}

impl PanelPlugin {
    /// Create an unloaded plugin.
    #[must_use]
    pub fn new(placement: Placement, store: Arc<dyn ConfigStore>, context: PluginContext) -> Self {
        let config = PanelConfig::for_placement(placement);
        let runtime = RuntimeState::from_config(&config);
        Self {
            placement,
            store,
            context,
            settings: SharedConfig::new(config),
            runtime: SharedState::new(runtime),
            manager: None,
        }
    }

    /// Panel placement.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Returns true between [`load`](Self::load) and [`unload`](Self::unload).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.manager.is_some()
    }

    /// Snapshot of the persisted configuration.
    #[must_use]
    pub fn settings(&self) -> PanelConfig {
        self.settings.get()
    }

    /// Snapshot of the session state.
    #[must_use]
    pub fn runtime(&self) -> RuntimeState {
        self.runtime.get()
    }

    /// The panel manager, once loaded.
    #[must_use]
    pub fn manager(&self) -> Option<&PanelManager> {
        self.manager.as_ref()
    }

    /// Read the configuration, seed the session, register the toggle
    /// command and show the panel if it is visible by default.
    ///
    /// Loading an already loaded plugin does nothing.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded.
    pub async fn load(&mut self) -> Result<()> {
        if self.manager.is_some() {
            return Ok(());
        }

        let config = self.store.load(self.placement).await?;
        let runtime = RuntimeState::from_config(&config);
        self.settings.set(config);
        self.runtime.update(|state| *state = runtime);

        let manager = PanelManager::new(
            self.placement,
            self.context.clone(),
            self.settings.clone(),
            self.runtime.clone(),
        );
        self.context.host.register_command(CommandSpec::new(
            self.placement.command_id(),
            self.placement.command_name(),
        ));
        info!(placement = %self.placement, visible = runtime.visible, size = runtime.current_size, "panel plugin loaded");

        if runtime.visible {
            manager.show().await;
        }
        self.manager = Some(manager);
        Ok(())
    }

    /// Hide the panel and withdraw the command. Safe to call without
    /// [`load`](Self::load).
    pub fn unload(&mut self) {
        let Some(manager) = self.manager.take() else {
            return;
        };
        manager.hide();
        self.context
            .host
            .unregister_command(self.placement.command_id());
        info!(placement = %self.placement, "panel plugin unloaded");
    }

    /// Flip the session visibility and show or hide the panel.
    pub async fn toggle(&self) {
        let Some(manager) = &self.manager else {
            debug!(placement = %self.placement, "toggle before load ignored");
            return;
        };

        let visible = self.runtime.update(|state| {
            state.visible = !state.visible;
            state.visible
        });
        if visible {
            manager.show().await;
        } else {
            manager.hide();
        }
    }

    /// Re-render for a new active document. Does nothing while hidden.
    pub async fn active_document_changed(&self) {
        if !self.runtime.get().visible {
            return;
        }
        if let Some(manager) = &self.manager {
            manager.refresh().await;
        }
    }

    /// Apply `f` to the configuration and persist the result.
    ///
    /// Nothing is saved when `f` fails.
    ///
    /// # Errors
    /// Returns the error from `f` or from the store.
    pub async fn update_settings<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut PanelConfig) -> Result<R> + Send,
    {
        let (value, snapshot) = self
            .settings
            .update(|config| f(config).map(|value| (value, config.clone())))?;
        self.store.save(&snapshot).await?;
        debug!(placement = %self.placement, "configuration saved");
        Ok(value)
    }

    /// Persist whether the panel is shown at startup.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be saved.
    pub async fn set_default_visible(&self, visible: bool) -> Result<()> {
        self.update_settings(|config| {
            config.default_visible = visible;
            Ok(())
        })
        .await
    }

    /// Persist the startup size, clamped and snapped to the slider.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be saved.
    pub async fn set_default_size(&self, size: u16) -> Result<()> {
        self.update_settings(|config| {
            config.set_default_size(size);
            Ok(())
        })
        .await
    }

    /// Persist the placement's default startup size.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be saved.
    pub async fn reset_default_size(&self) -> Result<()> {
        let size = self.placement.default_size();
        self.update_settings(|config| {
            config.default_size = size;
            Ok(())
        })
        .await
    }

    /// Append an empty mapping at the lowest priority and return its id.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be saved.
    pub async fn add_mapping(&self) -> Result<String> {
        self.update_settings(|config| Ok(config.add_mapping())).await
    }

    /// Remove a mapping.
    ///
    /// # Errors
    /// Returns an error if the mapping does not exist or saving fails.
    pub async fn remove_mapping(&self, id: &str) -> Result<()> {
        self.update_settings(|config| config.remove_mapping(id).map(drop))
            .await
    }

    /// Change the directory a mapping applies to.
    ///
    /// # Errors
    /// Returns an error if the mapping does not exist or saving fails.
    pub async fn set_mapping_path(&self, id: &str, directory_path: &str) -> Result<()> {
        self.update_settings(|config| config.set_mapping_path(id, directory_path))
            .await
    }

    /// Replace a mapping's markup.
    ///
    /// # Errors
    /// Returns an error if the mapping does not exist or saving fails.
    pub async fn set_mapping_content(&self, id: &str, content: &str) -> Result<()> {
        self.update_settings(|config| config.set_mapping_content(id, content))
            .await
    }

    /// Raise a mapping's priority. Returns false if it was already first.
    ///
    /// # Errors
    /// Returns an error if the mapping does not exist or saving fails.
    pub async fn move_mapping_up(&self, id: &str) -> Result<bool> {
        self.update_settings(|config| config.move_mapping_up(id)).await
    }

    /// Lower a mapping's priority. Returns false if it was already last.
    ///
    /// # Errors
    /// Returns an error if the mapping does not exist or saving fails.
    pub async fn move_mapping_down(&self, id: &str) -> Result<bool> {
        self.update_settings(|config| config.move_mapping_down(id)).await
    }
}

impl Drop for PanelPlugin {
    fn drop(&mut self) {
        self.unload();
    }
}

impl std::fmt::Debug for PanelPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelPlugin")
            .field("placement", &self.placement)
            .field("runtime", &self.runtime.get())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
