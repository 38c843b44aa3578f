//! Logical-plane ↔ pixel coordinate transform.
//!
//! The plot box is the viewport minus a fixed pixel margin; logical 0 maps
//! to the margin edge and logical 100 to the opposite plot edge, with the Y
//! axis inverted (logical 0 at the bottom). Resizing rebuilds only the scale
//! factors — stored logical content is never touched.

use crate::model::{COORD_MAX, Point, clamp_coord};
use serde::{Deserialize, Serialize};

/// Canvas size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Pixel margins around the plot box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 24.0,
            right: 24.0,
            bottom: 44.0,
            left: 54.0,
        }
    }
}

/// The pure linear maps between logical and pixel coordinates for one
/// viewport/margin pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotSpace {
    pub viewport: Viewport,
    pub margin: Margin,
}

impl PlotSpace {
    pub fn new(viewport: Viewport, margin: Margin) -> Self {
        Self { viewport, margin }
    }

    pub fn plot_width(&self) -> f32 {
        self.viewport.width - self.margin.left - self.margin.right
    }

    pub fn plot_height(&self) -> f32 {
        self.viewport.height - self.margin.top - self.margin.bottom
    }

    pub fn to_pix_x(&self, ex: f32) -> f32 {
        self.margin.left + ex / COORD_MAX * self.plot_width()
    }

    pub fn to_pix_y(&self, ey: f32) -> f32 {
        self.margin.top + (1.0 - ey / COORD_MAX) * self.plot_height()
    }

    pub fn to_pix(&self, p: Point) -> (f32, f32) {
        (self.to_pix_x(p.x), self.to_pix_y(p.y))
    }

    pub fn to_econ_x(&self, px: f32) -> f32 {
        (px - self.margin.left) / self.plot_width() * COORD_MAX
    }

    pub fn to_econ_y(&self, py: f32) -> f32 {
        (1.0 - (py - self.margin.top) / self.plot_height()) * COORD_MAX
    }

    /// Pixel position to logical coordinates, unclamped (drag-origin capture
    /// wants the raw cursor).
    pub fn to_econ(&self, px: f32, py: f32) -> Point {
        Point::new(self.to_econ_x(px), self.to_econ_y(py))
    }

    /// Pixel position to logical coordinates, clamped to [0, 100] — the form
    /// every pointer-driven mutation uses.
    pub fn to_econ_clamped(&self, px: f32, py: f32) -> Point {
        Point::new(
            clamp_coord(self.to_econ_x(px)),
            clamp_coord(self.to_econ_y(py)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> PlotSpace {
        PlotSpace::new(
            Viewport {
                width: 800.0,
                height: 600.0,
            },
            Margin::default(),
        )
    }

    #[test]
    fn corners_map_to_plot_edges() {
        let s = space();
        assert_eq!(s.to_pix_x(0.0), 54.0);
        assert_eq!(s.to_pix_x(100.0), 800.0 - 24.0);
        // Y is inverted: logical 0 sits at the bottom edge.
        assert_eq!(s.to_pix_y(0.0), 600.0 - 44.0);
        assert_eq!(s.to_pix_y(100.0), 24.0);
    }

    #[test]
    fn pixel_logical_roundtrip() {
        let s = space();
        for &(x, y) in &[(0.0, 0.0), (33.3, 66.6), (100.0, 100.0)] {
            let (px, py) = s.to_pix(Point::new(x, y));
            assert!((s.to_econ_x(px) - x).abs() < 1e-3);
            assert!((s.to_econ_y(py) - y).abs() < 1e-3);
        }
    }

    #[test]
    fn resize_changes_scale_not_content() {
        let p = Point::new(40.0, 60.0);
        let small = space();
        let large = PlotSpace::new(
            Viewport {
                width: 1600.0,
                height: 1200.0,
            },
            Margin::default(),
        );
        // The same logical point lands elsewhere in pixels but converts back
        // identically under either space.
        let (sx, sy) = small.to_pix(p);
        let (lx, ly) = large.to_pix(p);
        assert_ne!((sx, sy), (lx, ly));
        assert!((large.to_econ_x(lx) - p.x).abs() < 1e-3);
        assert!((large.to_econ_y(ly) - p.y).abs() < 1e-3);
    }

    #[test]
    fn clamped_conversion_bounds_outside_clicks() {
        let s = space();
        let p = s.to_econ_clamped(0.0, 0.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 100.0);
        let p = s.to_econ_clamped(5000.0, 5000.0);
        assert_eq!(p.x, 100.0);
        assert_eq!(p.y, 0.0);
    }
}
