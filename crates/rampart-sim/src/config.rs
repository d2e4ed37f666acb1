//! Simulation configuration.

use serde::{Deserialize, Serialize};

use rampart_core::constants::*;
use rampart_core::types::UpgradeTable;
use rampart_core::EcsError;

use crate::error::{SimError, SimResult};

/// Configuration for starting a new simulation. Every field has a default,
/// so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed + same commands = same simulation.
    pub seed: u64,
    /// Maximum simultaneously live entities; sizes the transform store and grid.
    pub max_entities: usize,
    pub cell_size: f32,
    /// Spatial grid bucket count. Power of two.
    pub grid_table_size: usize,
    /// Fast-channel ring capacity. Power of two.
    pub fast_capacity: usize,
    pub arena_half_width: f32,
    pub arena_half_height: f32,
    /// Panels placed around the turret at session start.
    pub panels: u32,
    /// Distance of the panel ring from the turret.
    pub panel_ring_radius: f32,
    /// Seconds between queued wave spawns.
    pub wave_spawn_interval: f32,
    pub upgrades: UpgradeTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_entities: DEFAULT_MAX_ENTITIES,
            cell_size: DEFAULT_CELL_SIZE,
            grid_table_size: DEFAULT_GRID_TABLE_SIZE,
            fast_capacity: DEFAULT_FAST_CAPACITY,
            arena_half_width: ARENA_HALF_WIDTH,
            arena_half_height: ARENA_HALF_HEIGHT,
            panels: 6,
            panel_ring_radius: 150.0,
            wave_spawn_interval: 0.4,
            upgrades: UpgradeTable::default(),
        }
    }
}

impl SimConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if !self.grid_table_size.is_power_of_two() {
            return Err(EcsError::NotPowerOfTwo {
                what: "grid table size",
                value: self.grid_table_size,
            }
            .into());
        }
        if !self.fast_capacity.is_power_of_two() {
            return Err(EcsError::NotPowerOfTwo {
                what: "fast channel capacity",
                value: self.fast_capacity,
            }
            .into());
        }
        if self.max_entities == 0 {
            return Err(SimError::Config("max_entities must be positive".into()));
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(SimError::Config(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.arena_half_width <= 0.0 || self.arena_half_height <= 0.0 {
            return Err(SimError::Config("arena extents must be positive".into()));
        }
        Ok(())
    }
}
