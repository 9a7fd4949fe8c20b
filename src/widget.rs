//! Ratatui widgets for drawing panels.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Clear, Paragraph, Widget, Wrap},
};

use crate::layout::{CellMetrics, Edge};
use crate::panel::{HandleStyle, PanelSurface};
use crate::workbench::Workbench;

/// Widget for rendering one panel surface.
///
/// The render area is the whole terminal area the workbench covers; the
/// widget places the panel inside it from the surface's pixel geometry.
pub struct PanelWidget<'a> {
    /// The surface to render.
    surface: &'a PanelSurface,
    /// Pixel to cell conversion.
    metrics: CellMetrics,
    /// Handle style when idle.
    idle_style: Style,
    /// Handle style when hovered or dragged.
    highlight_style: Style,
    /// Content style.
    content_style: Style,
}

impl<'a> PanelWidget<'a> {
    /// Create a new panel widget.
    #[must_use]
    pub fn new(surface: &'a PanelSurface, metrics: CellMetrics) -> Self {
        Self {
            surface,
            metrics,
            idle_style: Style::default().fg(Color::DarkGray),
            highlight_style: Style::default().fg(Color::Cyan),
            content_style: Style::default(),
        }
    }

    /// Set the idle handle style.
    #[must_use]
    pub fn idle_style(mut self, style: Style) -> Self {
        self.idle_style = style;
        self
    }

    /// Set the hovered and active handle style.
    #[must_use]
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    /// Set the content style.
    #[must_use]
    pub fn content_style(mut self, style: Style) -> Self {
        self.content_style = style;
        self
    }

    fn handle_symbol_and_style(&self) -> (&'static str, Style) {
        let edge = self.surface.placement().edge();
        match self.surface.handle_style() {
            HandleStyle::Idle => (thin_symbol(edge), self.idle_style),
            HandleStyle::Hover => (thick_symbol(edge), self.highlight_style),
            HandleStyle::Active => (
                thick_symbol(edge),
                self.highlight_style.add_modifier(Modifier::BOLD),
            ),
        }
    }
}

fn thin_symbol(edge: Edge) -> &'static str {
    match edge {
        Edge::Bottom => "─",
        Edge::Left | Edge::Right => "│",
    }
}

fn thick_symbol(edge: Edge) -> &'static str {
    match edge {
        Edge::Bottom => "━",
        Edge::Left | Edge::Right => "┃",
    }
}

/// Shrink `content` so it does not share cells with `handle`.
fn trim_content(edge: Edge, content: Rect, handle: Rect) -> Rect {
    if handle.is_empty() {
        return content;
    }
    match edge {
        Edge::Bottom => {
            let top = content.y.max(handle.bottom());
            Rect {
                y: top,
                height: content.bottom().saturating_sub(top),
                ..content
            }
        }
        Edge::Left => Rect {
            width: handle.x.saturating_sub(content.x).min(content.width),
            ..content
        },
        Edge::Right => {
            let left = content.x.max(handle.right());
            Rect {
                x: left,
                width: content.right().saturating_sub(left),
                ..content
            }
        }
    }
}

impl Widget for PanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let viewport = self.metrics.to_pixels(area);
        let regions = self.surface.regions(viewport);
        let edge = self.surface.placement().edge();

        let container = self.metrics.to_cells(regions.container).intersection(area);
        let handle = self.metrics.to_cells(regions.handle).intersection(area);
        let content = trim_content(edge, self.metrics.to_cells(regions.content), handle)
            .intersection(area);

        if container.is_empty() {
            return;
        }
        Clear.render(container, buf);

        let (symbol, style) = self.handle_symbol_and_style();
        for y in handle.top()..handle.bottom() {
            for x in handle.left()..handle.right() {
                buf[(x, y)].set_symbol(symbol).set_style(style);
            }
        }

        if !content.is_empty() {
            Paragraph::new(self.surface.content().to_text())
                .style(self.content_style)
                .wrap(Wrap { trim: false })
                .render(content, buf);
        }
    }
}

/// Widget for rendering every panel attached to a workbench.
pub struct WorkbenchWidget<'a> {
    /// The workbench to render.
    workbench: &'a Workbench,
    /// Handle style when idle.
    idle_style: Style,
    /// Handle style when hovered or dragged.
    highlight_style: Style,
}

impl<'a> WorkbenchWidget<'a> {
    /// Create a new workbench widget.
    #[must_use]
    pub fn new(workbench: &'a Workbench) -> Self {
        Self {
            workbench,
            idle_style: Style::default().fg(Color::DarkGray),
            highlight_style: Style::default().fg(Color::Cyan),
        }
    }

    /// Set the idle handle style.
    #[must_use]
    pub fn idle_style(mut self, style: Style) -> Self {
        self.idle_style = style;
        self
    }

    /// Set the hovered and active handle style.
    #[must_use]
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }
}

impl Widget for WorkbenchWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let metrics = self.workbench.metrics();
        for handle in self.workbench.surfaces() {
            let surface = handle.read();
            PanelWidget::new(&surface, metrics)
                .idle_style(self.idle_style)
                .highlight_style(self.highlight_style)
                .render(area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::text::Text;

    use super::*;
    use crate::host::UiHost;
    use crate::panel::{ContentNode, SurfaceHandle, SurfaceId};
    use crate::placement::Placement;

    fn render(surface: &PanelSurface, area: Rect) -> Buffer {
        let mut buf = Buffer::empty(area);
        PanelWidget::new(surface, CellMetrics::default()).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_footer_layout() {
        // 20x10 cells is 160x160 pixels; a 48 pixel footer covers rows 7..10.
        let mut surface = PanelSurface::new(SurfaceId(1), Placement::Footer, 48);
        surface
            .content_mut()
            .push(ContentNode::Markup(Text::from("hello")));

        let buf = render(&surface, Rect::new(0, 0, 20, 10));
        assert_eq!(buf[(0, 7)].symbol(), "─");
        assert_eq!(buf[(0, 7)].fg, Color::DarkGray);
        assert_eq!(buf[(0, 8)].symbol(), "h");
        assert_eq!(buf[(0, 6)].symbol(), " ");
    }

    #[test]
    fn test_handle_highlight() {
        let mut surface = PanelSurface::new(SurfaceId(1), Placement::Footer, 48);
        surface.set_handle_style(HandleStyle::Hover);
        let buf = render(&surface, Rect::new(0, 0, 20, 10));
        assert_eq!(buf[(3, 7)].symbol(), "━");
        assert_eq!(buf[(3, 7)].fg, Color::Cyan);

        surface.set_handle_style(HandleStyle::Active);
        let buf = render(&surface, Rect::new(0, 0, 20, 10));
        assert!(buf[(3, 7)].modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_left_sidebar_content_stops_before_handle() {
        // 40 pixels is five columns; the handle takes the fifth.
        let mut surface = PanelSurface::new(SurfaceId(1), Placement::LeftSidebar, 40);
        surface
            .content_mut()
            .push(ContentNode::NoContent("abcdef".to_string()));

        let buf = render(&surface, Rect::new(0, 0, 20, 10));
        assert_eq!(buf[(4, 0)].symbol(), "│");
        assert_eq!(buf[(0, 0)].symbol(), "a");
        assert_eq!(buf[(3, 0)].symbol(), "d");
        assert_eq!(buf[(0, 1)].symbol(), "e");
        assert_eq!(buf[(5, 0)].symbol(), " ");
    }

    #[test]
    fn test_right_sidebar_handle_on_inner_edge() {
        let surface = PanelSurface::new(SurfaceId(1), Placement::RightSidebar, 40);
        let buf = render(&surface, Rect::new(0, 0, 20, 10));
        assert_eq!(buf[(15, 3)].symbol(), "│");
        assert_eq!(buf[(14, 3)].symbol(), " ");
    }

    #[test]
    fn test_workbench_draws_attached_surfaces() {
        let workbench = Workbench::default();
        let area = Rect::new(0, 0, 20, 10);
        workbench.set_terminal_size(area);

        let handle = SurfaceHandle::new(PanelSurface::new(SurfaceId(1), Placement::Footer, 48));
        handle
            .write()
            .content_mut()
            .push(ContentNode::Error("oops".to_string()));
        workbench.attach(handle);

        let mut buf = Buffer::empty(area);
        WorkbenchWidget::new(&workbench).render(area, &mut buf);
        assert_eq!(buf[(0, 8)].symbol(), "o");

        workbench.detach(SurfaceId(1));
        let mut buf = Buffer::empty(area);
        WorkbenchWidget::new(&workbench).render(area, &mut buf);
        assert_eq!(buf[(0, 8)].symbol(), " ");
    }
}
