//! Per-mode pointer-down interpretation.
//!
//! One mode is active at a time; [`pointer_down`] dispatches on it and
//! returns what the engine should do next. Modes that build entities over
//! several clicks (draw-curve, paint) stage points in the state's transient
//! buffers and commit when the count is reached. Every committing path
//! pushes the pre-mutation snapshot itself, so history stays correct even
//! when a click both stages and commits.

use crate::drag::{DragState, TranslateOrigin};
use crate::history::SnapshotStack;
use eg_core::{
    Attachment, Curve, DEFAULT_CURVE_COLOR, DrawBuffer, EntityId, FloatingLabel, GraphState,
    HorizontalLine, Mode, PaintBuffer, PlotSpace, Point, QuotaBracket, ReferenceLine, ShadePolygon,
    clamp_coord,
};
use eg_render::hit::{self, GuideAxis, HitTarget, PixelPos};

/// Points a draw-curve gesture accumulates before committing. A curve owns
/// exactly two endpoints, so extra clicks never queue up.
const CURVE_COMMIT_POINTS: usize = 2;
/// Vertices a paint gesture accumulates before committing a polygon. The
/// data model allows arbitrary counts; the interactive tool is fixed at
/// four.
const POLYGON_COMMIT_POINTS: usize = 4;
/// Initial bracket height of a freshly placed quota, in logical units.
const QUOTA_INITIAL_HEIGHT: f32 = 20.0;

/// Which entity a label prompt edits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelTarget {
    Curve(EntityId),
    Polygon(EntityId),
    ReferenceGuide {
        point_id: EntityId,
        axis: GuideAxis,
    },
    Quota {
        point_id: EntityId,
    },
    Line {
        index: usize,
    },
    /// Click on empty space: create a free-floating label here.
    NewLabel {
        at: Point,
    },
}

/// Result of a pointer-down in the current mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DownOutcome {
    /// Nothing hit, nothing to do.
    Ignored,
    /// A drag began; the pre-gesture snapshot is already pushed.
    DragStarted(DragState),
    /// State mutated (entity committed or erased).
    Committed,
    /// A staging buffer advanced without committing; re-render only.
    Staged,
    /// The host must collect label text (prefilled with `current`) and hand
    /// it back through `GraphEngine::submit_label`.
    NeedsLabel {
        target: LabelTarget,
        current: String,
    },
}

pub fn pointer_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    match state.mode {
        Mode::Curve => curve_down(state, history, space, pos),
        Mode::DrawCurve => draw_curve_down(state, history, space, pos),
        Mode::Paint => paint_down(state, history, space, pos),
        Mode::Line => line_down(state, history, space, pos),
        Mode::Quota => quota_down(state, history, space, pos),
        Mode::Reference => reference_down(state, history, space, pos),
        Mode::Label => label_down(state, space, pos),
        Mode::Eraser => eraser_down(state, history, space, pos),
    }
}

// ─── curve (select / drag) ───────────────────────────────────────────────

fn curve_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    let Some(target) = hit::hit_test(state, space, pos) else {
        return DownOutcome::Ignored;
    };
    let (drag, select) = match target {
        HitTarget::CurveEndpoint { curve, end } => {
            (DragState::Endpoint { curve, end }, Some(curve))
        }
        HitTarget::CurveBody { curve } => {
            let Some(c) = state.curve(curve) else {
                return DownOutcome::Ignored;
            };
            let origin = TranslateOrigin {
                cursor: space.to_econ(pos.x, pos.y),
                p1: c.p1,
                p2: c.p2,
            };
            (DragState::WholeCurve { curve, origin }, Some(curve))
        }
        HitTarget::HorizontalLine { index } => (DragState::Line { index }, None),
        HitTarget::QuotaHandle { index } => (DragState::QuotaHandle { index }, None),
    };
    history.push(state.clone());
    if let Some(id) = select {
        state.selected_curve = Some(id);
    }
    DownOutcome::DragStarted(drag)
}

// ─── draw-curve (two-click construction) ─────────────────────────────────

fn draw_curve_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    let p = space.to_econ_clamped(pos.x, pos.y);
    let staged = {
        let buffer = state.draw_curve_state.get_or_insert_with(DrawBuffer::default);
        buffer.points.push(p);
        buffer.points.len()
    };
    if staged < CURVE_COMMIT_POINTS {
        return DownOutcome::Staged;
    }
    // The snapshot keeps the staged points, so undoing a commit restores
    // the visible preview.
    history.push(state.clone());
    let points = state
        .draw_curve_state
        .take()
        .map(|b| b.points)
        .unwrap_or_default();
    let curve = Curve {
        id: EntityId::generate("curve"),
        kind: "generic".to_string(),
        label: String::new(),
        color: DEFAULT_CURVE_COLOR,
        p1: points[0],
        p2: points[1],
    };
    log::debug!("draw-curve commit {}", curve.id);
    state.selected_curve = Some(curve.id);
    state.curves.push(curve);
    DownOutcome::Committed
}

// ─── paint (four-click polygon shading) ──────────────────────────────────

fn paint_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    let p = space.to_econ_clamped(pos.x, pos.y);
    let color = state.paint_color;
    let staged = {
        let buffer = state.paint_state.get_or_insert_with(|| PaintBuffer {
            id: EntityId::generate("shade"),
            points: Default::default(),
            color,
        });
        buffer.points.push(p);
        buffer.points.len()
    };
    if staged < POLYGON_COMMIT_POINTS {
        return DownOutcome::Staged;
    }
    history.push(state.clone());
    let Some(buffer) = state.paint_state.take() else {
        return DownOutcome::Staged;
    };
    log::debug!("paint commit {}", buffer.id);
    state.shading.push(ShadePolygon {
        id: buffer.id,
        points: buffer.points.into_vec(),
        label: String::new(),
        color: buffer.color,
    });
    DownOutcome::Committed
}

// ─── line (place or drag horizontal lines) ───────────────────────────────

fn line_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    for (index, line) in state.lines.iter().enumerate() {
        if hit::line_hit(space, line, pos) {
            history.push(state.clone());
            return DownOutcome::DragStarted(DragState::Line { index });
        }
    }
    history.push(state.clone());
    let y = clamp_coord(space.to_econ_y(pos.y));
    state.lines.push(HorizontalLine::at(y));
    DownOutcome::Committed
}

// ─── quota / reference (attach to a curve) ───────────────────────────────

/// Resolve a curve hit into attachment parameters: which curve, how it is
/// attached, the body parameter, and the anchor point.
fn attachment_at(
    state: &GraphState,
    space: &PlotSpace,
    pos: PixelPos,
) -> Option<(EntityId, Attachment, Option<f32>, Point)> {
    match hit::hit_test(state, space, pos)? {
        HitTarget::CurveEndpoint { curve, end } => {
            let c = state.curve(curve)?;
            Some((curve, end.into(), None, c.endpoint(end)))
        }
        HitTarget::CurveBody { curve } => {
            let c = state.curve(curve)?;
            let t = hit::closest_param(space, c, pos);
            Some((curve, Attachment::Body, Some(t), c.point_at(t)))
        }
        _ => None,
    }
}

fn quota_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    let Some((curve_id, attachment, t, anchor)) = attachment_at(state, space, pos) else {
        return DownOutcome::Ignored;
    };
    history.push(state.clone());
    // At most one quota per curve: a new placement replaces the old one.
    state.quotas.retain(|q| q.curve_id != curve_id);
    state.quotas.push(QuotaBracket {
        curve_id,
        point_id: EntityId::generate(&format!("{curve_id}_quota")),
        attachment,
        t,
        x: anchor.x,
        start_y: anchor.y,
        end_y: anchor.y + QUOTA_INITIAL_HEIGHT,
        label: String::new(),
    });
    log::debug!("quota placed on {curve_id} ({attachment:?})");
    DownOutcome::Committed
}

fn reference_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    let Some((curve_id, attachment, t, anchor)) = attachment_at(state, space, pos) else {
        return DownOutcome::Ignored;
    };
    // Endpoint anchors get a deterministic id so re-clicking the same
    // endpoint replaces its reference line; body anchors are always new.
    let point_id = match attachment {
        Attachment::P1 => EntityId::intern(&format!("{curve_id}_p1")),
        Attachment::P2 => EntityId::intern(&format!("{curve_id}_p2")),
        _ => EntityId::generate(&format!("{curve_id}_body")),
    };
    history.push(state.clone());
    state.reference_lines.retain(|rl| rl.point_id != point_id);
    state.reference_lines.push(ReferenceLine {
        point_id,
        curve_id,
        attachment,
        t,
        point_x: anchor.x,
        point_y: anchor.y,
        labels: Default::default(),
    });
    log::debug!("reference line placed on {curve_id} ({attachment:?})");
    DownOutcome::Committed
}

// ─── label (edit or place text) ──────────────────────────────────────────

/// Find the label zone under the pointer. Never mutates; the mutation
/// happens in [`submit_label`] once the host has collected text.
fn label_down(state: &GraphState, space: &PlotSpace, pos: PixelPos) -> DownOutcome {
    for curve in &state.curves {
        if hit::curve_hit(space, curve, pos, hit::ERASE_TOLERANCE) {
            return DownOutcome::NeedsLabel {
                target: LabelTarget::Curve(curve.id),
                current: curve.label.clone(),
            };
        }
    }
    for polygon in &state.shading {
        if hit::polygon_hit(space, polygon, pos) {
            return DownOutcome::NeedsLabel {
                target: LabelTarget::Polygon(polygon.id),
                current: polygon.label.clone(),
            };
        }
    }
    for rl in &state.reference_lines {
        if let Some(axis) = hit::reference_hit(space, rl, pos) {
            let current = match axis {
                GuideAxis::Horizontal => rl.labels.horizontal.clone(),
                GuideAxis::Vertical => rl.labels.vertical.clone(),
            };
            return DownOutcome::NeedsLabel {
                target: LabelTarget::ReferenceGuide {
                    point_id: rl.point_id,
                    axis,
                },
                current,
            };
        }
    }
    for quota in &state.quotas {
        if hit::quota_bracket_hit(space, quota, pos) {
            return DownOutcome::NeedsLabel {
                target: LabelTarget::Quota {
                    point_id: quota.point_id,
                },
                current: quota.label.clone(),
            };
        }
    }
    for (index, line) in state.lines.iter().enumerate() {
        if hit::line_hit(space, line, pos) {
            return DownOutcome::NeedsLabel {
                target: LabelTarget::Line { index },
                current: line.label.clone(),
            };
        }
    }
    DownOutcome::NeedsLabel {
        target: LabelTarget::NewLabel {
            at: space.to_econ_clamped(pos.x, pos.y),
        },
        current: String::new(),
    }
}

/// Apply collected label text. `None` (cancelled dialog) never mutates; an
/// empty string overwrites an existing label but does not create a new one.
/// Returns whether the state changed.
pub fn submit_label(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    target: LabelTarget,
    text: Option<String>,
) -> bool {
    let Some(text) = text else {
        return false;
    };
    match target {
        LabelTarget::Curve(id) => {
            let Some(i) = state.curves.iter().position(|c| c.id == id) else {
                return false;
            };
            history.push(state.clone());
            state.curves[i].label = text;
            true
        }
        LabelTarget::Polygon(id) => {
            let Some(i) = state.shading.iter().position(|p| p.id == id) else {
                return false;
            };
            history.push(state.clone());
            state.shading[i].label = text;
            true
        }
        LabelTarget::ReferenceGuide { point_id, axis } => {
            let Some(i) = state
                .reference_lines
                .iter()
                .position(|rl| rl.point_id == point_id)
            else {
                return false;
            };
            history.push(state.clone());
            match axis {
                GuideAxis::Horizontal => state.reference_lines[i].labels.horizontal = text,
                GuideAxis::Vertical => state.reference_lines[i].labels.vertical = text,
            }
            true
        }
        LabelTarget::Quota { point_id } => {
            let Some(i) = state.quotas.iter().position(|q| q.point_id == point_id) else {
                return false;
            };
            history.push(state.clone());
            state.quotas[i].label = text;
            true
        }
        LabelTarget::Line { index } => {
            if index >= state.lines.len() {
                return false;
            }
            history.push(state.clone());
            state.lines[index].label = text;
            true
        }
        LabelTarget::NewLabel { at } => {
            if text.is_empty() {
                return false;
            }
            history.push(state.clone());
            state.labels.push(FloatingLabel {
                id: EntityId::generate("label"),
                text,
                x: at.x,
                y: at.y,
                color: None,
                font_size: None,
            });
            true
        }
    }
}

// ─── eraser ──────────────────────────────────────────────────────────────

/// Delete the first entity hit, scanning categories in fixed order and each
/// category from the most recently created down. Curve deletion cascades to
/// attached reference lines and quotas. Only an actual deletion pushes an
/// undo snapshot.
fn eraser_down(
    state: &mut GraphState,
    history: &mut SnapshotStack,
    space: &PlotSpace,
    pos: PixelPos,
) -> DownOutcome {
    for i in (0..state.curves.len()).rev() {
        if hit::curve_hit(space, &state.curves[i], pos, hit::ERASE_TOLERANCE) {
            history.push(state.clone());
            let id = state.curves[i].id;
            state.remove_curve(id);
            log::debug!("erased curve {id}");
            return DownOutcome::Committed;
        }
    }
    for i in (0..state.shading.len()).rev() {
        if hit::polygon_hit(space, &state.shading[i], pos) {
            history.push(state.clone());
            state.shading.remove(i);
            return DownOutcome::Committed;
        }
    }
    for i in (0..state.lines.len()).rev() {
        if hit::line_hit(space, &state.lines[i], pos) {
            history.push(state.clone());
            state.lines.remove(i);
            return DownOutcome::Committed;
        }
    }
    for i in (0..state.reference_lines.len()).rev() {
        if hit::reference_hit(space, &state.reference_lines[i], pos).is_some() {
            history.push(state.clone());
            state.reference_lines.remove(i);
            return DownOutcome::Committed;
        }
    }
    for i in (0..state.quotas.len()).rev() {
        if hit::quota_bracket_hit(space, &state.quotas[i], pos) {
            history.push(state.clone());
            state.quotas.remove(i);
            return DownOutcome::Committed;
        }
    }
    for i in (0..state.labels.len()).rev() {
        if hit::label_hit(space, &state.labels[i], pos) {
            history.push(state.clone());
            state.labels.remove(i);
            return DownOutcome::Committed;
        }
    }
    DownOutcome::Ignored
}
