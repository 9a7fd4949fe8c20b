//! Where a panel lives and everything that follows from it.

use crate::host::ResizeCursor;
use crate::layout::{Axis, Edge};

/// The three kinds of panel.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Placement {
    /// Full-width panel attached to the bottom edge.
    Footer,
    /// Full-height panel attached to the left edge.
    LeftSidebar,
    /// Full-height panel attached to the right edge.
    RightSidebar,
}

impl Placement {
    /// All placements, in registration order.
    pub const ALL: [Placement; 3] = [Self::Footer, Self::LeftSidebar, Self::RightSidebar];

    /// Edge the panel is attached to.
    #[must_use]
    pub fn edge(self) -> Edge {
        match self {
            Self::Footer => Edge::Bottom,
            Self::LeftSidebar => Edge::Left,
            Self::RightSidebar => Edge::Right,
        }
    }

    /// Axis the panel is resized along.
    #[must_use]
    pub fn axis(self) -> Axis {
        self.edge().axis()
    }

    /// Size used when the configuration does not provide one, in pixels.
    #[must_use]
    pub fn default_size(self) -> u16 {
        match self {
            Self::Footer => 420,
            Self::LeftSidebar | Self::RightSidebar => 300,
        }
    }

    /// Size after dragging the handle from `origin` to `current`.
    ///
    /// Moving the handle away from the attachment edge grows the panel.
    /// The result never drops below [`MIN_PANEL_SIZE`](crate::MIN_PANEL_SIZE).
    #[must_use]
    pub fn dragged_size(self, origin_size: u16, origin: u16, current: u16) -> u16 {
        let travel = match self {
            Self::Footer | Self::RightSidebar => i32::from(origin) - i32::from(current),
            Self::LeftSidebar => i32::from(current) - i32::from(origin),
        };
        let size = (i32::from(origin_size) + travel)
            .clamp(i32::from(crate::layout::MIN_PANEL_SIZE), i32::from(u16::MAX));
        u16::try_from(size).unwrap_or(u16::MAX)
    }

    /// Cursor shown while the handle is dragged.
    #[must_use]
    pub fn resize_cursor(self) -> ResizeCursor {
        match self.axis() {
            Axis::Vertical => ResizeCursor::Row,
            Axis::Horizontal => ResizeCursor::Column,
        }
    }

    /// Id of the visibility command.
    #[must_use]
    pub fn command_id(self) -> &'static str {
        match self {
            Self::Footer => "toggle-custom-footer",
            Self::LeftSidebar => "open-custom-left-sidebar",
            Self::RightSidebar => "open-custom-right-sidebar",
        }
    }

    /// Human readable name of the visibility command.
    #[must_use]
    pub fn command_name(self) -> &'static str {
        match self {
            Self::Footer => "Toggle Custom Footer",
            Self::LeftSidebar => "Open Custom Left Sidebar",
            Self::RightSidebar => "Open Custom Right Sidebar",
        }
    }

    /// Global marker present while the panel is shown.
    #[must_use]
    pub fn visible_marker(self) -> &'static str {
        match self {
            Self::Footer => "custom-footer-visible",
            Self::LeftSidebar => "custom-left-sidebar-visible",
            Self::RightSidebar => "custom-right-sidebar-visible",
        }
    }

    /// Title shown on the panel.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Footer => "Custom Footer",
            Self::LeftSidebar => "Custom Left Sidebar",
            Self::RightSidebar => "Custom Right Sidebar",
        }
    }

    /// Placeholder shown when no rule yields content.
    #[must_use]
    pub fn no_content_message(self) -> &'static str {
        "No content configured for this directory"
    }

    /// Placeholder shown when rendering fails.
    #[must_use]
    pub fn error_message(self) -> &'static str {
        match self {
            Self::Footer => "Error loading footer content",
            Self::LeftSidebar | Self::RightSidebar => "Error loading sidebar content",
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Footer => "footer",
            Self::LeftSidebar => "left-sidebar",
            Self::RightSidebar => "right-sidebar",
        };
        f.write_str(name)
    }
}
