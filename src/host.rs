//! Interfaces to the host application.
//!
//! The panel core never talks to a terminal, a file tree or a Markdown
//! engine directly. It sees them through the traits below.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use ratatui::text::Text;

use crate::error::RenderError;
use crate::layout::CellMetrics;
use crate::panel::{SurfaceHandle, SurfaceId};

/// Reports the document the user is looking at.
pub trait ActiveDocumentProvider: Send + Sync {
    /// Path of the active document, if any.
    fn active_path(&self) -> Option<String>;
}

/// Turns markup into styled text.
#[async_trait]
pub trait MarkupRenderer: Send + Sync {
    /// Render `markup` into `target`. `source_path` is the document the
    /// markup is shown for, used to resolve relative references.
    ///
    /// # Errors
    /// Returns an error on malformed input or unavailable resources.
    async fn render(
        &self,
        markup: &str,
        source_path: &str,
        target: &mut Text<'static>,
    ) -> Result<(), RenderError>;
}

/// Kind of pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Primary button pressed.
    Down,
    /// Pointer moved, with or without a button held.
    Moved,
    /// Primary button released.
    Up,
}

/// A pointer event in host pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Pixels covered by the pointer. One pixel for precise pointers, a
    /// whole cell for terminal mice.
    pub area: Rect,
}

impl PointerEvent {
    /// A precise pointer event at `position`.
    #[must_use]
    pub fn new(kind: PointerKind, position: Position) -> Self {
        Self {
            kind,
            area: Rect::new(position.x, position.y, 1, 1),
        }
    }

    /// Convert a terminal mouse event. Only the left button and plain
    /// movement are mapped.
    #[must_use]
    pub fn from_mouse(event: &MouseEvent, metrics: CellMetrics) -> Option<Self> {
        let kind = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerKind::Down,
            MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => PointerKind::Moved,
            _ => return None,
        };
        Some(Self {
            kind,
            area: metrics.to_pixels(Rect::new(event.column, event.row, 1, 1)),
        })
    }

    /// Pointer position, the top-left of its area.
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.area.x, self.area.y)
    }

    /// Returns true if the pointer overlaps `region`.
    #[must_use]
    pub fn hits(&self, region: Rect) -> bool {
        region.intersects(self.area)
    }
}

/// Callback invoked for global pointer events.
///
/// Returns true when the listener claims the event. A claimed press is not
/// delivered to later listeners, so overlapping handles never start two
/// drags at once.
pub type PointerListener = Arc<dyn Fn(&PointerEvent) -> bool + Send + Sync>;

/// Identifier of a registered pointer listener.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct ListenerId(pub u64);

/// Cursor shown while a panel is being resized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeCursor {
    /// North-south resize (footer).
    Row,
    /// East-west resize (sidebars).
    Column,
}

/// A command the user can invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    /// Stable id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl CommandSpec {
    /// Create a command spec.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The application's global UI root.
pub trait UiHost: Send + Sync {
    /// Area panels are attached within, in pixels.
    fn viewport(&self) -> Rect;

    /// Attach a panel surface to the root.
    fn attach(&self, surface: SurfaceHandle);

    /// Detach a panel surface. Unknown ids are ignored.
    fn detach(&self, id: SurfaceId);

    /// Add or remove a global marker.
    fn set_marker(&self, marker: &str, present: bool);

    /// Show a resize cursor and suppress text selection, or restore both
    /// with `None`.
    fn set_drag_feedback(&self, cursor: Option<ResizeCursor>);

    /// Register a pointer listener. Listeners see events in registration
    /// order.
    fn add_pointer_listener(&self, listener: PointerListener) -> ListenerId;

    /// Deregister a pointer listener. Unknown ids are ignored.
    fn remove_pointer_listener(&self, id: ListenerId);

    /// Expose a command.
    fn register_command(&self, command: CommandSpec);

    /// Withdraw a command.
    fn unregister_command(&self, id: &str);
}

/// A pointer listener that stays registered until dropped.
pub struct PointerSubscription {
    host: Arc<dyn UiHost>,
    id: ListenerId,
}

impl PointerSubscription {
    /// Register `listener` with `host`.
    #[must_use]
    pub fn new(host: Arc<dyn UiHost>, listener: PointerListener) -> Self {
        let id = host.add_pointer_listener(listener);
        Self { host, id }
    }

    /// Listener id.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        self.host.remove_pointer_listener(self.id);
    }
}

impl std::fmt::Debug for PointerSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerSubscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// An [`ActiveDocumentProvider`] the application updates on navigation.
#[derive(Debug, Default)]
pub struct ActiveDocument {
    path: RwLock<Option<String>>,
}

impl ActiveDocument {
    /// Create a provider with no active document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active document.
    pub fn set(&self, path: impl Into<String>) {
        *self.path.write().unwrap_or_else(PoisonError::into_inner) = Some(path.into());
    }

    /// Forget the active document.
    pub fn clear(&self) {
        *self.path.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ActiveDocumentProvider for ActiveDocument {
    fn active_path(&self) -> Option<String> {
        self.path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
