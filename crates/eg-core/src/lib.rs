pub mod error;
pub mod id;
pub mod model;
pub mod space;

pub use error::StateError;
pub use id::EntityId;
pub use model::*;
pub use space::{Margin, PlotSpace, Viewport};
