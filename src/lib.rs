//! # dirpanel
//!
//! Directory-scoped Markdown panels for Ratatui applications.
//!
//! A footer and two sidebars show Markdown chosen by the directory of the
//! active document. Each panel can be toggled and resized by dragging its
//! handle; toggles and drags last for the session while the persisted
//! configuration stays the template for the next one.
//!
//! ## Features
//!
//! - **Directory Rules**: Ordered prefix rules with a `*` fallback
//! - **Single-Flight Rendering**: Overlapping refreshes are dropped, never interleaved
//! - **Drag-to-Resize**: Pointer-driven handles with hover and active styling
//! - **Markdown**: `pulldown-cmark` rendering with wiki links and note embeds
//! - **Ratatui Integration**: Widgets for drawing the attached panels
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dirpanel::{
//!     ActiveDocument, JsonFileStore, PanelPlugin, Placement, PluginContext, PluginRegistry,
//!     TerminalMarkdown, Workbench,
//! };
//!
//! #[tokio::main]
//! async fn main() -> dirpanel::Result<()> {
//!     let workbench = Arc::new(Workbench::default());
//!     let documents = Arc::new(ActiveDocument::new());
//!     let context = PluginContext::new(
//!         documents.clone(),
//!         Arc::new(TerminalMarkdown::new().with_vault_root("vault")),
//!         workbench.clone(),
//!     );
//!
//!     let mut registry = PluginRegistry::new();
//!     let store = Arc::new(JsonFileStore::new("footer.json"));
//!     registry
//!         .register(PanelPlugin::new(Placement::Footer, store, context))
//!         .await?;
//!
//!     documents.set("Goals/2024.md");
//!     registry.execute("toggle-custom-footer").await?;
//!     registry.active_document_changed().await;
//!
//!     registry.unload_all();
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod host;
mod layout;
mod manager;
mod markdown;
mod panel;
mod placement;
mod plugins;
mod resize;
mod rules;
mod state;
mod widget;
mod workbench;

#[cfg(test)]
mod test_support;

// Re-export public API
pub use config::{
    ConfigStore, JsonFileStore, MemoryStore, PanelConfig, SharedConfig, SIZE_SLIDER_MAX,
    SIZE_SLIDER_MIN, SIZE_SLIDER_STEP,
};
pub use error::{Error, RenderError, Result};
pub use host::{
    ActiveDocument, ActiveDocumentProvider, CommandSpec, ListenerId, MarkupRenderer,
    PointerEvent, PointerKind, PointerListener, PointerSubscription, ResizeCursor, UiHost,
};
pub use layout::{
    Axis, CellMetrics, Edge, LayoutCalculator, PanelRegions, HANDLE_THICKNESS, MIN_PANEL_SIZE,
};
pub use manager::PanelManager;
pub use markdown::{MarkdownTheme, TerminalMarkdown};
pub use panel::{ContentNode, ContentRegion, HandleStyle, PanelSurface, SurfaceHandle, SurfaceId};
pub use placement::Placement;
pub use plugins::{PanelPlugin, PluginContext, PluginId, PluginRegistry};
pub use resize::{DragState, ResizeController};
pub use rules::{path_matches, resolve, DirectoryMapping, WILDCARD};
pub use state::{RuntimeState, SharedState};
pub use widget::{PanelWidget, WorkbenchWidget};
pub use workbench::Workbench;
