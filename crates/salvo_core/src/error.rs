//! Error types for the game simulation.
//!
//! Steady-state ticking never fails. Errors only surface at the edges:
//! loading tuning tables and addressing entities that no longer exist.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Tuning table parsing error.
    #[error("Failed to parse tuning table '{path}': {message}")]
    ConfigParse {
        /// Path (or `<inline>`) of the table that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Tuning table parsed but holds values the simulation cannot run with.
    #[error("Invalid tuning value: {0}")]
    InvalidConfig(String),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(u64),

    /// Invalid game state for the requested operation.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
