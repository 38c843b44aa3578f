//! Continuous pointer-move handling for the draggable target kinds.
//!
//! Endpoint drags move one owned point directly. Whole-curve drags translate
//! both endpoints by the delta between the current cursor and the cursor
//! captured at pointer-down — always computed from the captured originals,
//! never incrementally, so repeated moves cannot accumulate rounding drift.
//! Every move re-derives the attachments of the touched curve.

use eg_core::{Attachment, Endpoint, EntityId, GraphState, Point};

/// Geometry captured at whole-curve pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslateOrigin {
    /// Unclamped logical cursor position at pointer-down.
    pub cursor: Point,
    pub p1: Point,
    pub p2: Point,
}

/// The active drag, identified by hit testing at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Endpoint {
        curve: EntityId,
        end: Endpoint,
    },
    WholeCurve {
        curve: EntityId,
        origin: TranslateOrigin,
    },
    Line {
        index: usize,
    },
    QuotaHandle {
        index: usize,
    },
}

/// Apply one pointer-move to the active drag. `clamped` is the cursor in
/// clamped logical coordinates; `raw` is unclamped (whole-curve deltas use
/// it so the grab point stays under the cursor). Returns `false` when the
/// drag target no longer exists.
pub fn apply_drag(state: &mut GraphState, drag: &DragState, clamped: Point, raw: Point) -> bool {
    match *drag {
        DragState::Endpoint { curve, end } => {
            let Some(c) = state.curve_mut(curve) else {
                return false;
            };
            *c.endpoint_mut(end) = clamped;
            state.retrack_attachments(curve);
            log::trace!("drag endpoint {curve}/{end:?} -> ({}, {})", clamped.x, clamped.y);
            true
        }
        DragState::WholeCurve { curve, origin } => {
            let Some(c) = state.curve_mut(curve) else {
                return false;
            };
            let dx = raw.x - origin.cursor.x;
            let dy = raw.y - origin.cursor.y;
            c.p1 = Point::new(origin.p1.x + dx, origin.p1.y + dy).clamped();
            c.p2 = Point::new(origin.p2.x + dx, origin.p2.y + dy).clamped();
            state.retrack_attachments(curve);
            log::trace!("drag curve {curve} by ({dx}, {dy})");
            true
        }
        DragState::Line { index } => {
            let Some(line) = state.lines.get_mut(index) else {
                return false;
            };
            line.position = clamped.y;
            true
        }
        DragState::QuotaHandle { index } => {
            let Some(quota) = state.quotas.get_mut(index) else {
                return false;
            };
            // Once the end handle is grabbed the quota stops tracking its
            // host curve.
            quota.end_y = clamped.y.max(quota.start_y);
            quota.attachment = Attachment::Custom;
            quota.t = None;
            true
        }
    }
}
