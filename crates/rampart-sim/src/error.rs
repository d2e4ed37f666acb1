//! Simulation-level error type.

use thiserror::Error;

use rampart_core::EcsError;

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Ecs(#[from] EcsError),

    #[error("archetype data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown archetype {0:?}")]
    UnknownArchetype(String),

    #[error("invalid config: {0}")]
    Config(String),
}

/// Result type for simulation setup and spawning.
pub type SimResult<T> = Result<T, SimError>;
