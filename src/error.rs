//! Error types for the physics core

use thiserror::Error;

/// Errors surfaced by world construction and registry mutation
///
/// Per-step anomalies (hits on bricks that are already gone, `dt <= 0`)
/// are not errors and never reach this type.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The play field cannot hold a world
    #[error("invalid play field {width}x{height}")]
    InvalidField { width: f32, height: f32 },

    /// An object with this name is already registered
    #[error("object name already registered: {0}")]
    DuplicateName(String),

    /// Brick roles belong to the spawned grid; level setup cannot claim one
    #[error("brick role is reserved for spawned bricks: {0}")]
    ReservedRole(String),

    /// Settings could not be parsed or written
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Result type for world operations
pub type Result<T> = std::result::Result<T, WorldError>;
