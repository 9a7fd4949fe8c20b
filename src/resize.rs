//! Drag-to-resize state machine.

use ratatui::layout::Position;

use crate::panel::HandleStyle;
use crate::placement::Placement;

/// Resize state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// The handle is being dragged.
    Dragging {
        /// Pointer coordinate along the resize axis when the drag began.
        origin_pointer: u16,
        /// Panel size when the drag began.
        origin_size: u16,
    },
}

/// Tracks one panel's handle: hover and drag.
///
/// The controller only computes; the panel manager applies sizes and
/// cursor feedback.
#[derive(Clone, Debug)]
pub struct ResizeController {
    placement: Placement,
    state: DragState,
    hovered: bool,
}

impl ResizeController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            state: DragState::Idle,
            hovered: false,
        }
    }

    /// Current drag state.
    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Returns true while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Record whether the pointer is over the handle.
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Start a drag at `pointer` from a panel of `current_size`.
    pub fn begin(&mut self, pointer: Position, current_size: u16) {
        self.state = DragState::Dragging {
            origin_pointer: self.placement.axis().coordinate(pointer),
            origin_size: current_size,
        };
    }

    /// Size the panel should take with the pointer at `pointer`.
    ///
    /// Returns `None` when no drag is in progress.
    #[must_use]
    pub fn drag_to(&self, pointer: Position) -> Option<u16> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging {
                origin_pointer,
                origin_size,
            } => Some(self.placement.dragged_size(
                origin_size,
                origin_pointer,
                self.placement.axis().coordinate(pointer),
            )),
        }
    }

    /// Finish a drag. Returns true if one was in progress.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        was_dragging
    }

    /// Handle style for the current state. Dragging beats hovering.
    #[must_use]
    pub fn handle_style(&self) -> HandleStyle {
        if self.is_dragging() {
            HandleStyle::Active
        } else if self.hovered {
            HandleStyle::Hover
        } else {
            HandleStyle::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_controller_ignores_moves() {
        let controller = ResizeController::new(Placement::Footer);
        assert_eq!(controller.drag_to(Position::new(0, 10)), None);
        assert_eq!(controller.handle_style(), HandleStyle::Idle);
    }

    #[test]
    fn test_footer_drag() {
        let mut controller = ResizeController::new(Placement::Footer);
        controller.begin(Position::new(40, 500), 420);

        assert_eq!(
            controller.state(),
            DragState::Dragging {
                origin_pointer: 500,
                origin_size: 420
            }
        );
        assert_eq!(controller.handle_style(), HandleStyle::Active);
        assert_eq!(controller.drag_to(Position::new(10, 400)), Some(520));
        assert_eq!(controller.drag_to(Position::new(10, 600)), Some(320));

        assert!(controller.end());
        assert!(!controller.end());
        assert_eq!(controller.drag_to(Position::new(10, 400)), None);
    }

    #[test]
    fn test_sidebar_drag_reads_horizontal_axis() {
        let mut controller = ResizeController::new(Placement::LeftSidebar);
        controller.begin(Position::new(300, 50), 300);
        assert_eq!(controller.drag_to(Position::new(360, 999)), Some(360));

        let mut controller = ResizeController::new(Placement::RightSidebar);
        controller.begin(Position::new(500, 50), 300);
        assert_eq!(controller.drag_to(Position::new(440, 0)), Some(360));
    }

    #[test]
    fn test_drag_clamped_to_minimum() {
        let mut controller = ResizeController::new(Placement::Footer);
        controller.begin(Position::new(0, 200), 420);
        assert_eq!(controller.drag_to(Position::new(0, 1000)), Some(100));
    }

    #[test]
    fn test_hover_style_survives_drag_end() {
        let mut controller = ResizeController::new(Placement::Footer);
        controller.set_hovered(true);
        assert_eq!(controller.handle_style(), HandleStyle::Hover);

        controller.begin(Position::new(0, 200), 420);
        assert_eq!(controller.handle_style(), HandleStyle::Active);

        controller.end();
        assert_eq!(controller.handle_style(), HandleStyle::Hover);

        controller.set_hovered(false);
        assert_eq!(controller.handle_style(), HandleStyle::Idle);
    }
}
