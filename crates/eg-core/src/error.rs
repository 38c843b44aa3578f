use thiserror::Error;

/// Errors surfaced by state import — the engine's one fallible surface.
#[derive(Debug, Error)]
pub enum StateError {
    /// The supplied JSON could not be decoded into a graph state.
    #[error("malformed graph state: {0}")]
    Decode(#[from] serde_json::Error),
}
