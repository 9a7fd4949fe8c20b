//! Plugin context - the host services a panel plugin works against.

use std::sync::Arc;

use crate::host::{ActiveDocumentProvider, MarkupRenderer, UiHost};

/// Host services shared by every panel plugin.
#[derive(Clone)]
pub struct PluginContext {
    /// Source of the active document path.
    pub documents: Arc<dyn ActiveDocumentProvider>,
    /// Markup renderer for panel content.
    pub renderer: Arc<dyn MarkupRenderer>,
    /// Global UI root panels attach to.
    pub host: Arc<dyn UiHost>,
}

impl PluginContext {
    /// Create a new plugin context.
    #[must_use]
    pub fn new(
        documents: Arc<dyn ActiveDocumentProvider>,
        renderer: Arc<dyn MarkupRenderer>,
        host: Arc<dyn UiHost>,
    ) -> Self {
        Self {
            documents,
            renderer,
            host,
        }
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("active_path", &self.documents.active_path())
            .field("viewport", &self.host.viewport())
            .finish_non_exhaustive()
    }
}
