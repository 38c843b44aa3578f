//! Graph state → display list.
//!
//! [`build_scene`] is a pure function of the current state: it walks every
//! entity in paint order and emits [`DrawOp`]s for a platform backend to
//! replay (Canvas2D in `eg-wasm`). The whole scene is rebuilt after every
//! state change and resize — no incremental diffing.

use crate::theme::Palette;
use eg_core::{AxisLabels, GraphState, Mode, PlotSpace, Point};

/// Stack used for every piece of text in the scene.
pub const FONT_STACK: &str = "Inter, system-ui, sans-serif";

/// Dash pattern of a stroked op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dash {
    Solid,
    /// `(on, off)` segment lengths in pixels.
    Dashed(f32, f32),
}

/// Stroke parameters shared by line-like ops.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f32,
    pub dash: Dash,
    pub alpha: f32,
}

impl StrokeStyle {
    pub fn solid(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Dash::Solid,
            alpha: 1.0,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f32, on: f32, off: f32) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Dash::Dashed(on, off),
            alpha: 1.0,
        }
    }

    pub fn faded(color: impl Into<String>, width: f32, alpha: f32) -> Self {
        Self {
            color: color.into(),
            width,
            dash: Dash::Solid,
            alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// One canvas draw instruction. Coordinates are CSS pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Fill the whole canvas with an opaque background.
    Clear { color: String },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: StrokeStyle,
    },
    /// Open polyline through the given points.
    Polyline {
        points: Vec<(f32, f32)>,
        stroke: StrokeStyle,
    },
    /// Closed filled polygon.
    Polygon {
        points: Vec<(f32, f32)>,
        color: String,
        alpha: f32,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        fill: Option<String>,
        stroke: Option<(String, f32)>,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: String,
        font: String,
        align: TextAlign,
    },
    /// Translucent full-canvas overlay (read-only mode).
    Wash { color: String },
}

pub type Scene = Vec<DrawOp>;

/// Per-frame context that isn't part of the persisted state.
#[derive(Debug, Clone, Default)]
pub struct SceneView {
    pub axis_labels: AxisLabels,
    pub read_only: bool,
}

fn font(prefix: &str) -> String {
    format!("{prefix} {FONT_STACK}")
}

fn text(x: f32, y: f32, s: &str, color: impl Into<String>, fnt: String, align: TextAlign) -> DrawOp {
    DrawOp::Text {
        x,
        y,
        text: s.to_string(),
        color: color.into(),
        font: fnt,
        align,
    }
}

/// Filled arrow-head triangle for an axis tip. `from` sets the direction.
fn arrow_head(tip: (f32, f32), from: (f32, f32), size: f32, color: &str) -> DrawOp {
    let angle = (tip.1 - from.1).atan2(tip.0 - from.0);
    let left = (
        tip.0 - size * (angle - 0.4).cos(),
        tip.1 - size * (angle - 0.4).sin(),
    );
    let right = (
        tip.0 - size * (angle + 0.4).cos(),
        tip.1 - size * (angle + 0.4).sin(),
    );
    DrawOp::Polygon {
        points: vec![tip, left, right],
        color: color.to_string(),
        alpha: 1.0,
    }
}

/// Build the full display list for one frame.
pub fn build_scene(
    state: &GraphState,
    space: &PlotSpace,
    palette: &Palette,
    view: &SceneView,
) -> Scene {
    let mut scene = Scene::new();
    let w = space.viewport.width;
    let h = space.viewport.height;
    let m = space.margin;

    scene.push(DrawOp::Clear {
        color: palette.bg.to_string(),
    });

    // ── Grid ──
    if state.show_grid {
        for i in 0..=10 {
            let gx = space.to_pix_x(i as f32 * 10.0);
            let gy = space.to_pix_y(i as f32 * 10.0);
            scene.push(DrawOp::Line {
                x1: gx,
                y1: m.top,
                x2: gx,
                y2: h - m.bottom,
                stroke: StrokeStyle::solid(palette.grid, 0.5),
            });
            scene.push(DrawOp::Line {
                x1: m.left,
                y1: gy,
                x2: w - m.right,
                y2: gy,
                stroke: StrokeStyle::solid(palette.grid, 0.5),
            });
        }
    }

    // ── Shading polygons ──
    for polygon in &state.shading {
        if polygon.points.len() < 3 {
            continue;
        }
        let pix: Vec<(f32, f32)> = polygon.points.iter().map(|p| space.to_pix(*p)).collect();
        let color = polygon.color.to_hex();
        scene.push(DrawOp::Polygon {
            points: pix,
            color: color.clone(),
            alpha: 0.22,
        });
        if !polygon.label.is_empty()
            && let Some(c) = polygon.centroid()
        {
            let (cx, cy) = space.to_pix(c);
            scene.push(text(
                cx - 8.0,
                cy + 4.0,
                &polygon.label,
                color,
                font("700 12px"),
                TextAlign::Left,
            ));
        }
    }

    // ── Horizontal lines ──
    for line in &state.lines {
        let hy = space.to_pix_y(line.position);
        scene.push(DrawOp::Line {
            x1: m.left,
            y1: hy,
            x2: w - m.right,
            y2: hy,
            stroke: StrokeStyle::solid(palette.line, 2.0),
        });
        if !line.label.is_empty() {
            scene.push(text(
                m.left - 8.0,
                hy + 4.0,
                &line.label,
                palette.line,
                font("500 11px"),
                TextAlign::Right,
            ));
        }
    }

    // ── Quota brackets ──
    for quota in &state.quotas {
        let vx = space.to_pix_x(quota.x);
        let py1 = space.to_pix_y(quota.start_y);
        let py2 = space.to_pix_y(quota.end_y);
        scene.push(DrawOp::Line {
            x1: vx,
            y1: py1,
            x2: vx,
            y2: py2,
            stroke: StrokeStyle::solid(palette.quota, 3.0),
        });
        if !quota.label.is_empty() {
            scene.push(text(
                vx,
                py1.min(py2) - 5.0,
                &quota.label,
                palette.quota,
                font("500 11px"),
                TextAlign::Center,
            ));
        }
        scene.push(DrawOp::Circle {
            x: vx,
            y: py2,
            radius: 4.0,
            fill: Some(palette.quota.to_string()),
            stroke: None,
        });
    }

    // ── Curves ──
    // Labels render only when the user placed one; nothing is auto-named.
    for curve in &state.curves {
        let selected = state.selected_curve == Some(curve.id);
        let (x1, y1) = space.to_pix(curve.p1);
        let (x2, y2) = space.to_pix(curve.p2);
        let color = curve.color.to_hex();
        scene.push(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: StrokeStyle::solid(color.clone(), if selected { 3.5 } else { 2.5 }),
        });
        if !curve.label.is_empty() {
            scene.push(text(
                x2 + 6.0,
                y2 + 4.0,
                &curve.label,
                color.clone(),
                font("600 13px"),
                TextAlign::Left,
            ));
        }
        for p in [curve.p1, curve.p2] {
            let (px, py) = space.to_pix(p);
            scene.push(DrawOp::Circle {
                x: px,
                y: py,
                radius: if selected { 7.0 } else { 5.0 },
                fill: Some(palette.endpoint_fill.to_string()),
                stroke: Some((color.clone(), 2.0)),
            });
        }
        if selected {
            scene.push(DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                stroke: StrokeStyle::faded(color, 12.0, 0.15),
            });
        }
    }

    // ── Axes ──
    scene.push(DrawOp::Polyline {
        points: vec![(m.left, m.top), (m.left, h - m.bottom), (w - m.right, h - m.bottom)],
        stroke: StrokeStyle::solid(palette.axis, 1.5),
    });
    scene.push(arrow_head(
        (m.left, m.top),
        (m.left, h - m.bottom),
        8.0,
        palette.axis,
    ));
    scene.push(arrow_head(
        (w - m.right, h - m.bottom),
        (m.left, h - m.bottom),
        8.0,
        palette.axis,
    ));
    scene.push(text(
        4.0,
        m.top - 6.0,
        &view.axis_labels.y,
        palette.axis_text,
        font("600 12px"),
        TextAlign::Left,
    ));
    scene.push(text(
        w - m.right - 24.0,
        h - 6.0,
        &view.axis_labels.x,
        palette.axis_text,
        font("600 12px"),
        TextAlign::Left,
    ));
    scene.push(text(
        m.left - 12.0,
        h - m.bottom + 14.0,
        &view.axis_labels.origin,
        palette.axis_text,
        font("600 12px"),
        TextAlign::Left,
    ));

    // ── Free labels ──
    for label in &state.labels {
        let color = label
            .color
            .map(|c| c.to_hex())
            .unwrap_or_else(|| palette.free_label.to_string());
        let fnt = match label.font_size {
            Some(size) => font(&format!("500 {size}px")),
            None => font("500 11px"),
        };
        scene.push(text(
            space.to_pix_x(label.x),
            space.to_pix_y(label.y),
            &label.text,
            color,
            fnt,
            TextAlign::Left,
        ));
    }

    // ── Reference lines ──
    for rl in &state.reference_lines {
        let hy = space.to_pix_y(rl.point_y);
        let vx = space.to_pix_x(rl.point_x);
        scene.push(DrawOp::Line {
            x1: m.left,
            y1: hy,
            x2: vx,
            y2: hy,
            stroke: StrokeStyle::dashed(palette.ref_guide, 1.0, 3.0, 3.0),
        });
        scene.push(DrawOp::Line {
            x1: vx,
            y1: hy,
            x2: vx,
            y2: h - m.bottom,
            stroke: StrokeStyle::dashed(palette.ref_guide, 1.0, 3.0, 3.0),
        });
        if !rl.labels.horizontal.is_empty() {
            scene.push(text(
                m.left - 30.0,
                hy + 4.0,
                &rl.labels.horizontal,
                palette.ref_guide,
                font("500 11px"),
                TextAlign::Left,
            ));
        }
        if !rl.labels.vertical.is_empty() {
            scene.push(text(
                vx + 4.0,
                h - m.bottom + 15.0,
                &rl.labels.vertical,
                palette.ref_guide,
                font("500 11px"),
                TextAlign::Left,
            ));
        }
    }

    // ── In-progress construction previews ──
    if state.mode == Mode::Paint
        && let Some(buffer) = &state.paint_state
        && !buffer.points.is_empty()
    {
        push_preview(&mut scene, space, &buffer.points, &buffer.color.to_hex());
    }
    if state.mode == Mode::DrawCurve
        && let Some(buffer) = &state.draw_curve_state
        && !buffer.points.is_empty()
    {
        push_preview(&mut scene, space, &buffer.points, palette.preview);
    }

    if view.read_only {
        scene.push(DrawOp::Wash {
            color: palette.readonly_wash.to_string(),
        });
    }

    log::trace!(
        "scene: {} ops ({} curves, {} shading)",
        scene.len(),
        state.curves.len(),
        state.shading.len()
    );
    scene
}

/// Dashed polyline plus vertex dots for a staging buffer.
fn push_preview(scene: &mut Scene, space: &PlotSpace, points: &[Point], color: &str) {
    let pix: Vec<(f32, f32)> = points.iter().map(|p| space.to_pix(*p)).collect();
    if pix.len() > 1 {
        scene.push(DrawOp::Polyline {
            points: pix.clone(),
            stroke: StrokeStyle::dashed(color, 2.0, 4.0, 2.0),
        });
    }
    for (px, py) in pix {
        scene.push(DrawOp::Circle {
            x: px,
            y: py,
            radius: 4.0,
            fill: Some(color.to_string()),
            stroke: None,
        });
    }
}
