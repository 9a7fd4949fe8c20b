//! Session-only panel state.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::PanelConfig;

/// Visibility and size for the current session. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeState {
    /// Whether the panel is currently shown.
    pub visible: bool,
    /// Current size along the resize axis, in pixels.
    pub current_size: u16,
}

impl RuntimeState {
    /// Seed the session from the persisted template.
    #[must_use]
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            visible: config.default_visible,
            current_size: config.default_size,
        }
    }
}

/// Runtime state shared between a plugin and its panel manager.
#[derive(Clone, Debug)]
pub struct SharedState(Arc<RwLock<RuntimeState>>);

impl SharedState {
    /// Wrap an initial state.
    #[must_use]
    pub fn new(state: RuntimeState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    /// Copy of the current state.
    #[must_use]
    pub fn get(&self) -> RuntimeState {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the state in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut RuntimeState) -> R) -> R {
        f(&mut self.0.write().unwrap_or_else(PoisonError::into_inner))
    }
}
