//! Commands sent from the embedding application to the simulation.
//!
//! Commands are queued and processed at the start of the next `update`.

use serde::{Deserialize, Serialize};

/// All possible driver actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    /// Begin the next wave. From `Idle` or `GameOver` this first sets up a
    /// fresh arena.
    StartWave,
    /// Clear every entity and return to `Idle`.
    Reset,
    /// Spawn one archetype at a position (sandbox).
    Spawn { archetype: String, x: f32, y: f32 },
    /// Set an upgrade level read by the weapon and behavior logic.
    SetUpgrade { key: String, level: u32 },
}
