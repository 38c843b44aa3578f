pub mod hit;
pub mod scene;
pub mod theme;

pub use scene::{Dash, DrawOp, Scene, SceneView, StrokeStyle, TextAlign, build_scene};
pub use theme::{Palette, Theme};
