//! Simulation error types
//!
//! Nothing here ever reaches the player. Errors are logged by the frame
//! orchestrator and the loop keeps running.

use thiserror::Error;

/// Faults the simulation can recover from
#[derive(Debug, Error)]
pub enum SimError {
    /// An entity carried non-finite state and was dropped from its pool
    #[error("malformed {pool} entity #{id}: non-finite position or velocity")]
    MalformedEntity { pool: &'static str, id: u32 },

    /// The surface reported a size the simulation cannot run in
    #[error("invalid play-area bounds {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },

    /// Tuning values failed validation
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    /// Tuning or settings JSON could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
