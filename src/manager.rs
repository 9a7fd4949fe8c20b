//! Panel manager - owns one panel's surface and its render lifecycle.
//!
//! A manager shows and hides the surface, refreshes its content for the
//! active document and drives the drag handle. At most one refresh runs at
//! a time; a refresh requested while another is in flight is dropped, not
//! queued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ratatui::text::Text;
use tracing::{debug, error, trace};

use crate::config::SharedConfig;
use crate::host::{PointerEvent, PointerKind, PointerSubscription};
use crate::panel::{ContentNode, PanelSurface, SurfaceHandle, SurfaceId};
use crate::placement::Placement;
use crate::plugins::PluginContext;
use crate::resize::ResizeController;
use crate::state::SharedState;

/// Value of the in-flight slot when no refresh is running.
const IDLE: u64 = 0;

/// A shown panel and the resources tied to it.
struct Attached {
    surface: SurfaceHandle,
    resize: ResizeController,
    /// Keeps the global pointer listener registered.
    _pointer: PointerSubscription,
}

struct Inner {
    placement: Placement,
    context: PluginContext,
    settings: SharedConfig,
    runtime: SharedState,
    attached: Mutex<Option<Attached>>,
    /// Id of the surface being refreshed, or [`IDLE`].
    in_flight: AtomicU64,
    next_surface: AtomicU64,
}

/// Releases the in-flight slot when a refresh finishes, however it finishes.
///
/// `hide` may already have released it; the slot is only reset if it still
/// holds this refresh's surface id.
struct InFlight<'a> {
    slot: &'a AtomicU64,
    id: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.id, IDLE, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// Lifecycle manager for one panel.
///
/// Cloning yields another handle to the same panel.
#[derive(Clone)]
pub struct PanelManager {
    inner: Arc<Inner>,
}

impl PanelManager {
    /// Create a manager. Nothing is attached until [`show`](Self::show).
    #[must_use]
    pub fn new(
        placement: Placement,
        context: PluginContext,
        settings: SharedConfig,
        runtime: SharedState,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                placement,
                context,
                settings,
                runtime,
                attached: Mutex::new(None),
                in_flight: AtomicU64::new(IDLE),
                next_surface: AtomicU64::new(1),
            }),
        }
    }

    /// Panel placement.
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.inner.placement
    }

    /// Returns true while a surface is attached.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.inner.attached().is_some()
    }

    /// The attached surface, if any.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceHandle> {
        self.inner.surface()
    }

    /// Returns true while a refresh holds the in-flight slot.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) != IDLE
    }

    /// Attach a fresh surface at the current runtime size and fill it.
    ///
    /// Does nothing if a surface is already attached.
    pub async fn show(&self) {
        if self.inner.attach() {
            self.inner.refresh().await;
        }
    }

    /// Detach the surface and release everything tied to it.
    ///
    /// Does nothing if no surface is attached. A refresh still running
    /// against the old surface finishes harmlessly.
    pub fn hide(&self) {
        let Some(attached) = self.inner.attached().take() else {
            return;
        };
        self.inner.in_flight.store(IDLE, Ordering::Release);
        self.inner.release(&attached);
        self.inner.runtime.update(|state| state.visible = false);
        debug!(placement = %self.inner.placement, surface = %attached.surface.id(), "panel hidden");
    }

    /// Re-render the content for the active document.
    ///
    /// Returns immediately if no surface is attached or another refresh is
    /// in flight. Render failures end up as a placeholder; nothing is
    /// returned to the caller.
    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }
}

impl std::fmt::Debug for PanelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelManager")
            .field("placement", &self.inner.placement)
            .field("surface", &self.surface().map(|s| s.id()))
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn attached(&self) -> MutexGuard<'_, Option<Attached>> {
        self.attached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn surface(&self) -> Option<SurfaceHandle> {
        self.attached().as_ref().map(|a| a.surface.clone())
    }

    /// Build and attach a surface. Returns false if one already exists.
    fn attach(self: &Arc<Self>) -> bool {
        let mut attached = self.attached();
        if attached.is_some() {
            return false;
        }

        let id = SurfaceId(self.next_surface.fetch_add(1, Ordering::SeqCst));
        let size = self.runtime.get().current_size;
        let surface = SurfaceHandle::new(PanelSurface::new(id, self.placement, size));

        // The listener must not keep the manager alive.
        let weak = Arc::downgrade(self);
        let pointer = PointerSubscription::new(
            self.context.host.clone(),
            Arc::new(move |event: &PointerEvent| {
                weak.upgrade().is_some_and(|inner| inner.handle_pointer(event))
            }),
        );

        self.context.host.attach(surface.clone());
        self.context
            .host
            .set_marker(self.placement.visible_marker(), true);
        self.runtime.update(|state| state.visible = true);

        *attached = Some(Attached {
            surface,
            resize: ResizeController::new(self.placement),
            _pointer: pointer,
        });
        debug!(placement = %self.placement, surface = %id, size, "panel shown");
        true
    }

    /// Undo what `attach` did on the host.
    fn release(&self, attached: &Attached) {
        if attached.resize.is_dragging() {
            self.context.host.set_drag_feedback(None);
        }
        self.context.host.detach(attached.surface.id());
        self.context
            .host
            .set_marker(self.placement.visible_marker(), false);
    }

    async fn refresh(&self) {
        let Some(surface) = self.surface() else {
            trace!(placement = %self.placement, "no surface, skipping refresh");
            return;
        };

        let id = surface.id().0;
        if self
            .in_flight
            .compare_exchange(IDLE, id, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!(placement = %self.placement, "refresh already in flight, dropping request");
            return;
        }
        let _guard = InFlight {
            slot: &self.in_flight,
            id,
        };

        surface.write().content_mut().clear();

        let source_path = self.context.documents.active_path();
        let markup = source_path
            .as_deref()
            .and_then(|path| self.settings.resolve(path))
            .filter(|markup| !markup.is_empty());

        let Some(markup) = markup else {
            surface.write().content_mut().push(ContentNode::NoContent(
                self.placement.no_content_message().to_string(),
            ));
            return;
        };

        let source_path = source_path.unwrap_or_default();
        let mut rendered = Text::default();
        match self
            .context
            .renderer
            .render(&markup, &source_path, &mut rendered)
            .await
        {
            Ok(()) => {
                surface.write().content_mut().push(ContentNode::Markup(rendered));
                trace!(placement = %self.placement, path = %source_path, "panel content rendered");
            }
            Err(err) => {
                error!(placement = %self.placement, path = %source_path, error = %err, "failed to render panel content");
                let mut target = surface.write();
                let content = target.content_mut();
                content.clear();
                content.push(ContentNode::Error(
                    self.placement.error_message().to_string(),
                ));
            }
        }
    }

    /// Apply a pointer event to the handle. Returns true if a press started
    /// a drag here.
    fn handle_pointer(&self, event: &PointerEvent) -> bool {
        let mut attached = self.attached();
        let Some(attached) = attached.as_mut() else {
            return false;
        };

        let viewport = self.context.host.viewport();
        let mut claimed = false;

        match event.kind {
            PointerKind::Down => {
                let on_handle = event.hits(attached.surface.read().regions(viewport).handle);
                if on_handle {
                    let size = self.runtime.get().current_size;
                    attached.resize.begin(event.position(), size);
                    self.context
                        .host
                        .set_drag_feedback(Some(self.placement.resize_cursor()));
                    debug!(placement = %self.placement, size, "resize started");
                    claimed = true;
                }
            }
            PointerKind::Moved => {
                if let Some(size) = attached.resize.drag_to(event.position()) {
                    self.runtime.update(|state| state.current_size = size);
                    attached.surface.write().set_size(size);
                }
            }
            PointerKind::Up => {
                if attached.resize.end() {
                    self.context.host.set_drag_feedback(None);
                    debug!(
                        placement = %self.placement,
                        size = self.runtime.get().current_size,
                        "resize finished"
                    );
                }
            }
        }

        // Hover is judged against the handle after any resize above.
        let handle = attached.surface.read().regions(viewport).handle;
        attached.resize.set_hovered(event.hits(handle));

        let style = attached.resize.handle_style();
        attached.surface.write().set_handle_style(style);
        claimed
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let attached = self
            .attached
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(attached) = attached {
            self.release(&attached);
        }
    }
}
