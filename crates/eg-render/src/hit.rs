//! Hit testing: pixel position → interactive target.
//!
//! Targets overlap spatially, so [`hit_test`] evaluates them in strict
//! priority order: curve endpoints beat curve bodies (endpoint dragging must
//! win near the ends), bodies beat horizontal lines, lines beat quota
//! handles. Within one band the scan runs in array order, so ties resolve
//! first-created-wins.
//!
//! The label and eraser modes use wider per-entity zone predicates defined
//! alongside, with their own (tighter) tolerances.

use eg_core::{
    Curve, Endpoint, EntityId, FloatingLabel, GraphState, HorizontalLine, PlotSpace, QuotaBracket,
    ReferenceLine, ShadePolygon,
};
use kurbo::{Line, ParamCurveNearest, Point as PixPoint};

/// Pixel radius around curve endpoints.
pub const ENDPOINT_TOLERANCE: f64 = 18.0;
/// Perpendicular pixel distance for curve-body hits (whole-curve drag).
pub const BODY_TOLERANCE: f64 = 10.0;
/// Vertical pixel distance for horizontal-line hits.
pub const LINE_TOLERANCE: f64 = 8.0;
/// Pixel radius around a quota bracket's movable end.
pub const QUOTA_TOLERANCE: f64 = 16.0;
/// Shared tolerance for label-zone and eraser checks.
pub const ERASE_TOLERANCE: f64 = 8.0;
/// Half-extent of a floating label's hit box (eraser).
pub const LABEL_BOX_HALF_WIDTH: f64 = 30.0;
pub const LABEL_BOX_HALF_HEIGHT: f64 = 14.0;

/// Pointer position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPos {
    pub x: f32,
    pub y: f32,
}

impl PixelPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn as_kurbo(self) -> PixPoint {
        PixPoint::new(self.x as f64, self.y as f64)
    }
}

/// The interactive element under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitTarget {
    CurveEndpoint { curve: EntityId, end: Endpoint },
    CurveBody { curve: EntityId },
    HorizontalLine { index: usize },
    QuotaHandle { index: usize },
}

/// Which guide of a reference line the pointer sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAxis {
    Horizontal,
    Vertical,
}

/// Highest-priority interactive target within tolerance, or `None`.
pub fn hit_test(state: &GraphState, space: &PlotSpace, pos: PixelPos) -> Option<HitTarget> {
    // Endpoints first: endpoint dragging always wins over body dragging
    // near the ends.
    for curve in &state.curves {
        for end in [Endpoint::P1, Endpoint::P2] {
            let (px, py) = space.to_pix(curve.endpoint(end));
            let (dx, dy) = (px as f64 - pos.x as f64, py as f64 - pos.y as f64);
            if (dx * dx + dy * dy).sqrt() < ENDPOINT_TOLERANCE {
                return Some(HitTarget::CurveEndpoint {
                    curve: curve.id,
                    end,
                });
            }
        }
    }

    for curve in &state.curves {
        if curve_hit(space, curve, pos, BODY_TOLERANCE) {
            return Some(HitTarget::CurveBody { curve: curve.id });
        }
    }

    for (index, line) in state.lines.iter().enumerate() {
        if line_hit(space, line, pos) {
            return Some(HitTarget::HorizontalLine { index });
        }
    }

    for (index, quota) in state.quotas.iter().enumerate() {
        if quota_handle_hit(space, quota, pos) {
            return Some(HitTarget::QuotaHandle { index });
        }
    }

    None
}

/// Distance from a pixel position to a curve's segment, plus the clamped
/// parameter of the nearest point.
pub fn segment_distance(space: &PlotSpace, curve: &Curve, pos: PixelPos) -> (f64, f32) {
    let (x1, y1) = space.to_pix(curve.p1);
    let (x2, y2) = space.to_pix(curve.p2);
    let line = Line::new(
        PixPoint::new(x1 as f64, y1 as f64),
        PixPoint::new(x2 as f64, y2 as f64),
    );
    let nearest = line.nearest(pos.as_kurbo(), 1e-6);
    (nearest.distance_sq.sqrt(), nearest.t as f32)
}

/// Segment parameter of the point on `curve` closest to `pos`, in [0, 1].
pub fn closest_param(space: &PlotSpace, curve: &Curve, pos: PixelPos) -> f32 {
    segment_distance(space, curve, pos).1
}

/// Curve-body proximity at a caller-chosen tolerance (hit test uses 10px,
/// label/eraser 8px).
pub fn curve_hit(space: &PlotSpace, curve: &Curve, pos: PixelPos, tolerance: f64) -> bool {
    segment_distance(space, curve, pos).0 < tolerance
}

pub fn polygon_hit(space: &PlotSpace, polygon: &ShadePolygon, pos: PixelPos) -> bool {
    polygon.contains(space.to_econ(pos.x, pos.y))
}

pub fn line_hit(space: &PlotSpace, line: &HorizontalLine, pos: PixelPos) -> bool {
    (pos.y as f64 - space.to_pix_y(line.position) as f64).abs() < LINE_TOLERANCE
}

pub fn quota_handle_hit(space: &PlotSpace, quota: &QuotaBracket, pos: PixelPos) -> bool {
    let vx = space.to_pix_x(quota.x) as f64;
    let hy = space.to_pix_y(quota.end_y) as f64;
    let (dx, dy) = (vx - pos.x as f64, hy - pos.y as f64);
    (dx * dx + dy * dy).sqrt() < QUOTA_TOLERANCE
}

/// Whether `pos` sits on the vertical bracket span of a quota.
pub fn quota_bracket_hit(space: &PlotSpace, quota: &QuotaBracket, pos: PixelPos) -> bool {
    let vx = space.to_pix_x(quota.x) as f64;
    if (pos.x as f64 - vx).abs() >= ERASE_TOLERANCE {
        return false;
    }
    let py1 = space.to_pix_y(quota.start_y) as f64;
    let py2 = space.to_pix_y(quota.end_y) as f64;
    let y = pos.y as f64;
    y >= py1.min(py2) && y <= py1.max(py2)
}

/// Which guide of a reference line (if any) the pointer sits on. The
/// horizontal guide is checked first, matching the edit precedence of the
/// label tool.
pub fn reference_hit(space: &PlotSpace, rl: &ReferenceLine, pos: PixelPos) -> Option<GuideAxis> {
    let hy = space.to_pix_y(rl.point_y) as f64;
    let vx = space.to_pix_x(rl.point_x) as f64;
    if (pos.y as f64 - hy).abs() < ERASE_TOLERANCE {
        Some(GuideAxis::Horizontal)
    } else if (pos.x as f64 - vx).abs() < ERASE_TOLERANCE {
        Some(GuideAxis::Vertical)
    } else {
        None
    }
}

pub fn label_hit(space: &PlotSpace, label: &FloatingLabel, pos: PixelPos) -> bool {
    let lx = space.to_pix_x(label.x) as f64;
    let ly = space.to_pix_y(label.y) as f64;
    (pos.x as f64 - lx).abs() < LABEL_BOX_HALF_WIDTH
        && (pos.y as f64 - ly).abs() < LABEL_BOX_HALF_HEIGHT
}
