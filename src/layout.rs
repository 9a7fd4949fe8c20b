//! Panel geometry: regions in host pixels and their terminal-cell projection.

use ratatui::layout::{Position, Rect};

/// Thickness of the drag handle along the resize axis, in pixels.
pub const HANDLE_THICKNESS: u16 = 6;

/// Smallest size a drag can shrink a panel to, in pixels.
pub const MIN_PANEL_SIZE: u16 = 100;

/// Axis along which a panel's size is measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Size is a height; pointer travel is read from `y`.
    Vertical,
    /// Size is a width; pointer travel is read from `x`.
    Horizontal,
}

impl Axis {
    /// Coordinate of `position` along this axis.
    #[must_use]
    pub fn coordinate(self, position: Position) -> u16 {
        match self {
            Self::Vertical => position.y,
            Self::Horizontal => position.x,
        }
    }
}

/// Viewport edge a panel is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Bottom edge (footer).
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

impl Edge {
    /// Axis the panel is resized along.
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }
}

/// The three regions of an attached panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelRegions {
    /// Whole panel.
    pub container: Rect,
    /// Drag strip on the panel's inner edge.
    pub handle: Rect,
    /// Area the rendered markup is drawn into.
    pub content: Rect,
}

/// Calculates panel regions inside a viewport.
pub struct LayoutCalculator;

impl LayoutCalculator {
    /// Lay out a panel of `size` pixels attached to `edge` of `viewport`.
    ///
    /// The size is clamped to the viewport here only; the stored size is
    /// left untouched.
    #[must_use]
    pub fn panel_regions(edge: Edge, viewport: Rect, size: u16) -> PanelRegions {
        match edge {
            Edge::Bottom => {
                let height = size.min(viewport.height);
                let handle_height = HANDLE_THICKNESS.min(height);
                let container = Rect {
                    x: viewport.x,
                    y: viewport.bottom() - height,
                    width: viewport.width,
                    height,
                };
                let handle = Rect {
                    height: handle_height,
                    ..container
                };
                let content = Rect {
                    y: container.y + handle_height,
                    height: height - handle_height,
                    ..container
                };
                PanelRegions {
                    container,
                    handle,
                    content,
                }
            }
            Edge::Left => {
                let width = size.min(viewport.width);
                let handle_width = HANDLE_THICKNESS.min(width);
                let container = Rect {
                    x: viewport.x,
                    y: viewport.y,
                    width,
                    height: viewport.height,
                };
                let handle = Rect {
                    x: container.right() - handle_width,
                    width: handle_width,
                    ..container
                };
                let content = Rect {
                    width: width - handle_width,
                    ..container
                };
                PanelRegions {
                    container,
                    handle,
                    content,
                }
            }
            Edge::Right => {
                let width = size.min(viewport.width);
                let handle_width = HANDLE_THICKNESS.min(width);
                let container = Rect {
                    x: viewport.right() - width,
                    y: viewport.y,
                    width,
                    height: viewport.height,
                };
                let handle = Rect {
                    width: handle_width,
                    ..container
                };
                let content = Rect {
                    x: container.x + handle_width,
                    width: width - handle_width,
                    ..container
                };
                PanelRegions {
                    container,
                    handle,
                    content,
                }
            }
        }
    }
}

/// Size of one terminal cell in host pixels.
///
/// Panel sizes are persisted in pixels; terminals address cells. These
/// metrics convert between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    /// Pixels per column.
    pub column_width: u16,
    /// Pixels per row.
    pub row_height: u16,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            column_width: 8,
            row_height: 16,
        }
    }
}

impl CellMetrics {
    /// Create metrics, treating zero as one pixel.
    #[must_use]
    pub fn new(column_width: u16, row_height: u16) -> Self {
        Self {
            column_width: column_width.max(1),
            row_height: row_height.max(1),
        }
    }

    /// Derive metrics from the terminal's reported pixel size.
    ///
    /// Falls back to the defaults when the terminal does not report pixels.
    #[must_use]
    pub fn from_window_size(size: &crossterm::terminal::WindowSize) -> Self {
        if size.width == 0 || size.height == 0 || size.columns == 0 || size.rows == 0 {
            return Self::default();
        }
        Self::new(size.width / size.columns, size.height / size.rows)
    }

    /// Pixel rectangle covered by a rectangle of cells.
    #[must_use]
    pub fn to_pixels(self, cells: Rect) -> Rect {
        Rect {
            x: cells.x.saturating_mul(self.column_width),
            y: cells.y.saturating_mul(self.row_height),
            width: cells.width.saturating_mul(self.column_width),
            height: cells.height.saturating_mul(self.row_height),
        }
    }

    /// Smallest rectangle of cells covering a pixel rectangle.
    ///
    /// A non-empty pixel region always covers at least one cell.
    #[must_use]
    pub fn to_cells(self, pixels: Rect) -> Rect {
        if pixels.is_empty() {
            return Rect::default();
        }
        let x0 = pixels.x / self.column_width;
        let y0 = pixels.y / self.row_height;
        let x1 = pixels.right().div_ceil(self.column_width);
        let y1 = pixels.bottom().div_ceil(self.row_height);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footer_regions() {
        let viewport = Rect::new(0, 0, 800, 600);
        let regions = LayoutCalculator::panel_regions(Edge::Bottom, viewport, 420);

        assert_eq!(regions.container, Rect::new(0, 180, 800, 420));
        assert_eq!(regions.handle, Rect::new(0, 180, 800, 6));
        assert_eq!(regions.content, Rect::new(0, 186, 800, 414));
    }

    #[test]
    fn test_left_sidebar_regions() {
        let viewport = Rect::new(0, 0, 800, 600);
        let regions = LayoutCalculator::panel_regions(Edge::Left, viewport, 300);

        assert_eq!(regions.container, Rect::new(0, 0, 300, 600));
        assert_eq!(regions.handle, Rect::new(294, 0, 6, 600));
        assert_eq!(regions.content, Rect::new(0, 0, 294, 600));
    }

    #[test]
    fn test_right_sidebar_regions() {
        let viewport = Rect::new(0, 0, 800, 600);
        let regions = LayoutCalculator::panel_regions(Edge::Right, viewport, 300);

        assert_eq!(regions.container, Rect::new(500, 0, 300, 600));
        assert_eq!(regions.handle, Rect::new(500, 0, 6, 600));
        assert_eq!(regions.content, Rect::new(506, 0, 294, 600));
    }

    #[test]
    fn test_size_clamped_to_viewport() {
        let viewport = Rect::new(0, 0, 800, 300);
        let regions = LayoutCalculator::panel_regions(Edge::Bottom, viewport, 420);

        assert_eq!(regions.container, Rect::new(0, 0, 800, 300));
        assert_eq!(regions.content.height, 294);
    }

    #[test]
    fn test_edge_axis() {
        assert_eq!(Edge::Bottom.axis(), Axis::Vertical);
        assert_eq!(Edge::Left.axis(), Axis::Horizontal);
        assert_eq!(Edge::Right.axis(), Axis::Horizontal);
        assert_eq!(Axis::Vertical.coordinate(Position::new(3, 7)), 7);
        assert_eq!(Axis::Horizontal.coordinate(Position::new(3, 7)), 3);
    }

    #[test]
    fn test_cell_conversion() {
        let metrics = CellMetrics::default();

        assert_eq!(
            metrics.to_pixels(Rect::new(1, 2, 10, 5)),
            Rect::new(8, 32, 80, 80)
        );
        // A 6 px handle straddling a row boundary covers both rows.
        assert_eq!(
            metrics.to_cells(Rect::new(0, 380, 800, 6)),
            Rect::new(0, 23, 100, 2)
        );
        assert_eq!(
            metrics.to_cells(Rect::new(0, 368, 800, 6)),
            Rect::new(0, 23, 100, 1)
        );
        assert_eq!(metrics.to_cells(Rect::default()), Rect::default());
    }

    #[test]
    fn test_zero_metrics_are_sanitized() {
        let metrics = CellMetrics::new(0, 0);
        assert_eq!(metrics, CellMetrics::new(1, 1));
    }
}
