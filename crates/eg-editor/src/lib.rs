//! Interaction engine for the diagram editor: mode dispatch, dragging with
//! attachment propagation, snapshot undo/redo, and the public facade the
//! platform bridges embed.

pub mod config;
pub mod drag;
pub mod engine;
pub mod history;
pub mod modes;

pub use config::{ConfigPatch, EngineConfig};
pub use drag::DragState;
pub use engine::{ChangeListener, GraphEngine, PointerReaction};
pub use history::SnapshotStack;
pub use modes::{DownOutcome, LabelTarget};
