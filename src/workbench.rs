//! Workbench - the global UI root for terminal applications.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossterm::event::MouseEvent;
use ratatui::layout::Rect;

use crate::host::{
    CommandSpec, ListenerId, PointerEvent, PointerKind, PointerListener, ResizeCursor, UiHost,
};
use crate::layout::CellMetrics;
use crate::panel::{SurfaceHandle, SurfaceId};

#[derive(Default)]
struct WorkbenchState {
    viewport: Rect,
    surfaces: Vec<SurfaceHandle>,
    markers: BTreeSet<String>,
    drag_cursor: Option<ResizeCursor>,
    listeners: Vec<(ListenerId, PointerListener)>,
    next_listener: u64,
    commands: Vec<CommandSpec>,
}

/// In-memory UI root that panels attach to.
///
/// The application sizes it from the terminal, forwards mouse events to
/// [`Workbench::dispatch_mouse`] and draws it with
/// [`WorkbenchWidget`](crate::WorkbenchWidget).
pub struct Workbench {
    metrics: CellMetrics,
    state: Mutex<WorkbenchState>,
}

impl Workbench {
    /// Create an empty workbench.
    #[must_use]
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            metrics,
            state: Mutex::new(WorkbenchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorkbenchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cell metrics used for conversions.
    #[must_use]
    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Set the terminal area, in cells.
    pub fn set_terminal_size(&self, cells: Rect) {
        self.state().viewport = self.metrics.to_pixels(cells);
    }

    /// Set the viewport directly, in pixels.
    pub fn set_viewport(&self, pixels: Rect) {
        self.state().viewport = pixels;
    }

    /// Deliver a pointer event to the registered listeners in registration
    /// order.
    ///
    /// A press stops at the first listener that claims it; moves and
    /// releases always reach every listener.
    pub fn dispatch(&self, event: &PointerEvent) {
        // Listeners may call back into the workbench.
        let listeners: Vec<PointerListener> = self
            .state()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            if listener(event) && event.kind == PointerKind::Down {
                break;
            }
        }
    }

    /// Convert and deliver a terminal mouse event. Returns false if the
    /// event kind is not a pointer event panels care about.
    pub fn dispatch_mouse(&self, event: &MouseEvent) -> bool {
        match PointerEvent::from_mouse(event, self.metrics) {
            Some(pointer) => {
                self.dispatch(&pointer);
                true
            }
            None => false,
        }
    }

    /// Attached surfaces in attachment order.
    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceHandle> {
        self.state().surfaces.clone()
    }

    /// Number of attached surfaces.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.state().surfaces.len()
    }

    /// Returns true if `marker` is set.
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.state().markers.contains(marker)
    }

    /// Resize cursor currently shown, if a drag is in progress.
    #[must_use]
    pub fn drag_cursor(&self) -> Option<ResizeCursor> {
        self.state().drag_cursor
    }

    /// Returns true while text selection is suppressed.
    #[must_use]
    pub fn selection_suppressed(&self) -> bool {
        self.state().drag_cursor.is_some()
    }

    /// Number of registered pointer listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    /// Registered commands.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.state().commands.clone()
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(CellMetrics::default())
    }
}

impl UiHost for Workbench {
    fn viewport(&self) -> Rect {
        self.state().viewport
    }

    fn attach(&self, surface: SurfaceHandle) {
        let mut state = self.state();
        if state.surfaces.iter().all(|s| s.id() != surface.id()) {
            state.surfaces.push(surface);
        }
    }

    fn detach(&self, id: SurfaceId) {
        self.state().surfaces.retain(|s| s.id() != id);
    }

    fn set_marker(&self, marker: &str, present: bool) {
        let mut state = self.state();
        if present {
            state.markers.insert(marker.to_string());
        } else {
            state.markers.remove(marker);
        }
    }

    fn set_drag_feedback(&self, cursor: Option<ResizeCursor>) {
        self.state().drag_cursor = cursor;
    }

    fn add_pointer_listener(&self, listener: PointerListener) -> ListenerId {
        let mut state = self.state();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((id, listener));
        id
    }

    fn remove_pointer_listener(&self, id: ListenerId) {
        self.state().listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    fn register_command(&self, command: CommandSpec) {
        let mut state = self.state();
        state.commands.retain(|c| c.id != command.id);
        state.commands.push(command);
    }

    fn unregister_command(&self, id: &str) {
        self.state().commands.retain(|c| c.id != id);
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("Workbench")
            .field("metrics", &self.metrics)
            .field("viewport", &state.viewport)
            .field("surfaces", &state.surfaces.len())
            .field("markers", &state.markers)
            .field("listeners", &state.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use ratatui::layout::Position;

    use super::*;
    use crate::host::PointerSubscription;
    use crate::panel::PanelSurface;
    use crate::placement::Placement;

    #[test]
    fn test_viewport_from_terminal_size() {
        let workbench = Workbench::default();
        workbench.set_terminal_size(Rect::new(0, 0, 100, 40));
        assert_eq!(workbench.viewport(), Rect::new(0, 0, 800, 640));
    }

    #[test]
    fn test_attach_is_unique_per_surface() {
        let workbench = Workbench::default();
        let surface = SurfaceHandle::new(PanelSurface::new(SurfaceId(1), Placement::Footer, 420));

        workbench.attach(surface.clone());
        workbench.attach(surface);
        assert_eq!(workbench.surface_count(), 1);

        workbench.detach(SurfaceId(1));
        workbench.detach(SurfaceId(1));
        assert_eq!(workbench.surface_count(), 0);
    }

    #[test]
    fn test_markers() {
        let workbench = Workbench::default();
        workbench.set_marker("custom-footer-visible", true);
        assert!(workbench.has_marker("custom-footer-visible"));
        workbench.set_marker("custom-footer-visible", false);
        assert!(!workbench.has_marker("custom-footer-visible"));
    }

    #[test]
    fn test_subscription_deregisters_on_drop() {
        let workbench = Arc::new(Workbench::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        let subscription = PointerSubscription::new(
            workbench.clone(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        );
        assert_eq!(workbench.listener_count(), 1);

        let event = PointerEvent::new(PointerKind::Moved, Position::new(1, 1));
        workbench.dispatch(&event);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        drop(subscription);
        assert_eq!(workbench.listener_count(), 0);
        workbench.dispatch(&event);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_reenter_workbench() {
        let workbench = Arc::new(Workbench::default());
        let inner = Arc::downgrade(&workbench);
        let _subscription = PointerSubscription::new(
            workbench.clone(),
            Arc::new(move |_| {
                if let Some(workbench) = inner.upgrade() {
                    workbench.set_drag_feedback(Some(ResizeCursor::Row));
                }
                false
            }),
        );

        workbench.dispatch(&PointerEvent::new(PointerKind::Down, Position::new(0, 0)));
        assert_eq!(workbench.drag_cursor(), Some(ResizeCursor::Row));
        assert!(workbench.selection_suppressed());
    }

    fn counting(workbench: &Arc<Workbench>, calls: &Arc<AtomicUsize>, claim: bool) -> PointerSubscription {
        let counter = calls.clone();
        PointerSubscription::new(
            workbench.clone(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                claim
            }),
        )
    }

    #[test]
    fn test_claimed_press_stops_dispatch() {
        let workbench = Arc::new(Workbench::default());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let _a = counting(&workbench, &first, true);
        let _b = counting(&workbench, &second, true);

        workbench.dispatch(&PointerEvent::new(PointerKind::Down, Position::new(0, 0)));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);

        // Moves and releases are never cut short.
        workbench.dispatch(&PointerEvent::new(PointerKind::Moved, Position::new(0, 0)));
        workbench.dispatch(&PointerEvent::new(PointerKind::Up, Position::new(0, 0)));
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_commands_replace_by_id() {
        let workbench = Workbench::default();
        workbench.register_command(CommandSpec::new("toggle", "Toggle"));
        workbench.register_command(CommandSpec::new("toggle", "Toggle again"));
        assert_eq!(workbench.commands(), vec![CommandSpec::new("toggle", "Toggle again")]);

        workbench.unregister_command("toggle");
        assert!(workbench.commands().is_empty());
    }
}
