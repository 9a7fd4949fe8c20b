//! Panel surfaces: the transient UI object behind a shown panel.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ratatui::layout::Rect;
use ratatui::text::Text;

use crate::layout::{LayoutCalculator, PanelRegions, HANDLE_THICKNESS};
use crate::placement::Placement;

/// Unique identifier for a panel surface.
///
/// Every `show` creates a surface with a fresh id, so a stale render can
/// tell that the surface it started on is gone.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual state of the drag handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HandleStyle {
    /// Neither hovered nor dragged.
    #[default]
    Idle,
    /// Pointer is over the handle.
    Hover,
    /// A drag is in progress.
    Active,
}

/// One child of the content region.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentNode {
    /// No rule produced content for the active document.
    NoContent(String),
    /// The renderer failed.
    Error(String),
    /// Rendered markup.
    Markup(Text<'static>),
}

impl ContentNode {
    /// Text of the node without styling.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::NoContent(message) | Self::Error(message) => message.clone(),
            Self::Markup(text) => text
                .lines
                .iter()
                .map(|line| {
                    line.spans
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect::<String>()
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Where rendered markup ends up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentRegion {
    nodes: Vec<ContentNode>,
}

impl ContentRegion {
    /// Remove every child. Idempotent.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Append a child.
    pub fn push(&mut self, node: ContentNode) {
        self.nodes.push(node);
    }

    /// Children in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[ContentNode] {
        &self.nodes
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the region has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Plain text of all children, separated by newlines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(ContentNode::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// All children flattened into one text for drawing.
    #[must_use]
    pub fn to_text(&self) -> Text<'static> {
        let mut text = Text::default();
        for node in &self.nodes {
            match node {
                ContentNode::NoContent(message) | ContentNode::Error(message) => {
                    text.push_line(message.clone());
                }
                ContentNode::Markup(markup) => {
                    for line in &markup.lines {
                        text.push_line(line.clone());
                    }
                }
            }
        }
        text
    }
}

/// A shown panel: container, drag handle and content region.
#[derive(Clone, Debug)]
pub struct PanelSurface {
    id: SurfaceId,
    placement: Placement,
    size: u16,
    handle_style: HandleStyle,
    content: ContentRegion,
}

impl PanelSurface {
    /// Create an empty surface of `size` pixels.
    #[must_use]
    pub fn new(id: SurfaceId, placement: Placement, size: u16) -> Self {
        Self {
            id,
            placement,
            size,
            handle_style: HandleStyle::Idle,
            content: ContentRegion::default(),
        }
    }

    /// Surface id.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Panel placement.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Container size along the resize axis.
    #[must_use]
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Content size along the resize axis: the container minus the handle.
    #[must_use]
    pub fn content_size(&self) -> u16 {
        self.size.saturating_sub(HANDLE_THICKNESS)
    }

    /// Apply a new size to the container and content region.
    pub fn set_size(&mut self, size: u16) {
        self.size = size;
    }

    /// Regions of this surface inside `viewport`.
    #[must_use]
    pub fn regions(&self, viewport: Rect) -> PanelRegions {
        LayoutCalculator::panel_regions(self.placement.edge(), viewport, self.size)
    }

    /// Current handle style.
    #[must_use]
    pub fn handle_style(&self) -> HandleStyle {
        self.handle_style
    }

    /// Set the handle style.
    pub fn set_handle_style(&mut self, style: HandleStyle) {
        self.handle_style = style;
    }

    /// The content region.
    #[must_use]
    pub fn content(&self) -> &ContentRegion {
        &self.content
    }

    /// Mutable access to the content region.
    pub fn content_mut(&mut self) -> &mut ContentRegion {
        &mut self.content
    }
}

/// Shared handle to a panel surface.
///
/// The manager writes through it; the host reads it to draw. Cloning is
/// cheap.
#[derive(Clone, Debug)]
pub struct SurfaceHandle {
    id: SurfaceId,
    placement: Placement,
    surface: Arc<RwLock<PanelSurface>>,
}

impl SurfaceHandle {
    /// Wrap a surface.
    #[must_use]
    pub fn new(surface: PanelSurface) -> Self {
        Self {
            id: surface.id(),
            placement: surface.placement(),
            surface: Arc::new(RwLock::new(surface)),
        }
    }

    /// Surface id.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Panel placement.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Read access to the surface.
    #[must_use]
    pub fn read(&self) -> RwLockReadGuard<'_, PanelSurface> {
        self.surface.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write access to the surface.
    #[must_use]
    pub fn write(&self) -> RwLockWriteGuard<'_, PanelSurface> {
        self.surface.write().unwrap_or_else(PoisonError::into_inner)
    }
}
