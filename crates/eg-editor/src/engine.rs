//! The engine facade: one instance per mounted diagram.
//!
//! Owns the state, the coordinate space, the undo history and the active
//! drag. All mutation funnels through here so that every committed change
//! pushes exactly one pre-mutation snapshot and fires the change listener
//! exactly once — continuous drags notify once per completed gesture, on
//! pointer-up, not per move event.

use crate::config::{ConfigPatch, EngineConfig};
use crate::drag::{self, DragState};
use crate::history::{DEFAULT_DEPTH, SnapshotStack};
use crate::modes::{self, DownOutcome, LabelTarget};
use eg_core::{Color, CurveSpec, EntityId, GraphState, Mode, PlotSpace, StateError, Viewport};
use eg_render::hit::PixelPos;
use eg_render::{Scene, SceneView, build_scene};

/// Invoked with the post-mutation state after every committed change — the
/// host's persistence hook.
pub type ChangeListener = Box<dyn FnMut(&GraphState)>;

/// What the host must do after a pointer-down.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerReaction {
    /// Nothing happened.
    None,
    /// Visual state changed; re-render.
    Redraw,
    /// Re-render, collect label text (prefilled with `current`), then call
    /// [`GraphEngine::submit_label`] with the result.
    LabelPrompt {
        target: LabelTarget,
        current: String,
    },
}

pub struct GraphEngine {
    state: GraphState,
    space: PlotSpace,
    config: EngineConfig,
    history: SnapshotStack,
    drag: Option<DragState>,
    on_change: Option<ChangeListener>,
}

impl GraphEngine {
    /// Build an engine for a viewport. `state` is a previously exported
    /// state; when absent a fresh one is created and `config.initial_curves`
    /// seeded into it.
    pub fn new(viewport: Viewport, state: Option<GraphState>, config: EngineConfig) -> Self {
        let state = state.unwrap_or_else(|| {
            let mut fresh = GraphState::new();
            for spec in &config.initial_curves {
                fresh.push_curve_from_spec(spec);
            }
            fresh
        });
        let space = PlotSpace::new(viewport, config.margin);
        Self {
            state,
            space,
            config,
            history: SnapshotStack::new(DEFAULT_DEPTH),
            drag: None,
            on_change: None,
        }
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn space(&self) -> &PlotSpace {
        &self.space
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_on_change(&mut self, listener: Option<ChangeListener>) {
        self.on_change = listener;
    }

    fn notify(&mut self) {
        if let Some(listener) = &mut self.on_change {
            listener(&self.state);
        }
    }

    // ─── Mode & content API ──────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Switch the interaction mode, discarding any in-progress construction
    /// buffer.
    pub fn set_mode(&mut self, mode: Mode) {
        log::debug!("mode {} -> {}", self.state.mode.as_name(), mode.as_name());
        self.state.mode = mode;
        self.state.clear_buffers();
    }

    /// Add a curve from a host spec; missing fields take engine defaults.
    /// Selects and returns the new curve.
    pub fn add_curve(&mut self, spec: &CurveSpec) -> EntityId {
        self.history.push(self.state.clone());
        let id = self.state.push_curve_from_spec(spec);
        self.state.selected_curve = Some(id);
        self.notify();
        id
    }

    /// Remove a curve by id, or the current selection when `id` is `None`.
    /// Cascades to attached reference lines and quotas. A missing target is
    /// a silent no-op.
    pub fn remove_curve(&mut self, id: Option<EntityId>) {
        let Some(target) = id.or(self.state.selected_curve) else {
            return;
        };
        if self.state.curve(target).is_none() {
            return;
        }
        self.history.push(self.state.clone());
        self.state.remove_curve(target);
        self.notify();
    }

    /// Discard an in-progress paint buffer.
    pub fn clear_paint(&mut self) {
        self.state.paint_state = None;
    }

    /// Erase all user content (undoable). Grid visibility, paint color and
    /// mode survive.
    pub fn clear_all(&mut self) {
        self.history.push(self.state.clone());
        self.state.clear_content();
        self.notify();
    }

    /// Change the fill color used by subsequent paint gestures; an
    /// in-progress buffer adopts it immediately.
    pub fn set_paint_color(&mut self, color: Color) {
        self.state.paint_color = color;
        if let Some(buffer) = &mut self.state.paint_state {
            buffer.color = color;
        }
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.state.show_grid = visible;
    }

    // ─── Undo / redo ─────────────────────────────────────────────────────

    /// Restore the previous snapshot, keeping the current interaction mode
    /// so undoing content never kicks the user out of their tool.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.undo(&self.state) else {
            return false;
        };
        let mode = self.state.mode;
        self.state = prev;
        self.state.mode = mode;
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.state) else {
            return false;
        };
        let mode = self.state.mode;
        self.state = next;
        self.state.mode = mode;
        self.notify();
        true
    }

    // ─── Serialization ───────────────────────────────────────────────────

    /// Deep-clone export of the whole state, including transient buffers.
    pub fn to_json(&self) -> serde_json::Value {
        self.state.to_value()
    }

    /// Replace the live state with an imported one (undoable). The import
    /// is decoded before anything is touched, so a malformed value leaves
    /// state and history unchanged.
    pub fn from_json(&mut self, value: serde_json::Value) -> Result<(), StateError> {
        let imported = GraphState::from_value(value)?;
        self.restore(imported);
        Ok(())
    }

    /// Replace the live state with an already-decoded one (undoable).
    pub fn restore(&mut self, state: GraphState) {
        self.history.push(self.state.clone());
        self.state = state;
        self.notify();
    }

    // ─── Config & layout ─────────────────────────────────────────────────

    pub fn update_config(&mut self, patch: &ConfigPatch) {
        self.config.apply(patch);
    }

    /// Adopt a new canvas size. Only the scale factors change; logical
    /// content is untouched.
    pub fn resize(&mut self, viewport: Viewport) {
        self.space = PlotSpace::new(viewport, self.config.margin);
    }

    /// Build the display list for the current frame. `host_dark` answers
    /// the `Auto` theme.
    pub fn scene(&self, host_dark: bool) -> Scene {
        let palette = self.config.theme.resolve(host_dark);
        let view = SceneView {
            axis_labels: self.config.axis_labels.clone(),
            read_only: self.config.read_only,
        };
        build_scene(&self.state, &self.space, &palette, &view)
    }

    // ─── Pointer events ──────────────────────────────────────────────────

    pub fn pointer_down(&mut self, pos: PixelPos) -> PointerReaction {
        if self.config.read_only {
            return PointerReaction::None;
        }
        match modes::pointer_down(&mut self.state, &mut self.history, &self.space, pos) {
            DownOutcome::Ignored => PointerReaction::None,
            DownOutcome::DragStarted(drag) => {
                self.drag = Some(drag);
                PointerReaction::Redraw
            }
            DownOutcome::Staged => PointerReaction::Redraw,
            DownOutcome::Committed => {
                self.notify();
                PointerReaction::Redraw
            }
            DownOutcome::NeedsLabel { target, current } => {
                PointerReaction::LabelPrompt { target, current }
            }
        }
    }

    /// Advance the active drag. Returns whether a re-render is needed.
    pub fn pointer_move(&mut self, pos: PixelPos) -> bool {
        if self.config.read_only {
            return false;
        }
        let Some(drag) = self.drag else {
            return false;
        };
        let clamped = self.space.to_econ_clamped(pos.x, pos.y);
        let raw = self.space.to_econ(pos.x, pos.y);
        if drag::apply_drag(&mut self.state, &drag, clamped, raw) {
            true
        } else {
            self.drag = None;
            false
        }
    }

    /// End the active drag gesture, notifying the host exactly once.
    /// Returns whether a gesture actually ended.
    pub fn pointer_up(&mut self) -> bool {
        if self.drag.take().is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Hand back collected label text for a prompt produced by
    /// [`GraphEngine::pointer_down`]. `None` means the dialog was
    /// cancelled. Returns whether the state changed.
    pub fn submit_label(&mut self, target: LabelTarget, text: Option<String>) -> bool {
        if self.config.read_only {
            return false;
        }
        if modes::submit_label(&mut self.state, &mut self.history, target, text) {
            self.notify();
            true
        } else {
            false
        }
    }
}
