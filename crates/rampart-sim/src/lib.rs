//! Simulation engine for RAMPART.
//!
//! Owns the entity registry, component pools, transform store, spatial grid
//! and dual event bus; runs every per-frame system in a fixed order and
//! produces [`FrameSnapshot`]s for the presentation layer.

pub mod bus;
pub mod commands;
pub mod config;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod pool;
pub mod spatial;
pub mod spawner;
pub mod systems;
pub mod world;
pub mod world_setup;

pub use commands::SimCommand;
pub use config::SimConfig;
pub use engine::Simulation;
pub use error::{SimError, SimResult};
pub use rampart_core as core;
pub use spawner::{ArchetypeDef, ArchetypeLibrary, Placement};
pub use systems::snapshot::{FrameSnapshot, RenderItem};
pub use world::World;

#[cfg(test)]
mod tests;
