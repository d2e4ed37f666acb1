//! Session setup: the turret at the origin and a ring of panels around it.

use glam::Vec2;

use rampart_core::components::Health;
use rampart_core::enums::Tag;
use rampart_core::EntityId;

use crate::config::SimConfig;
use crate::ecs::Registry;
use crate::error::SimResult;
use crate::spawner::{ArchetypeLibrary, Placement};

/// Spawn the turret and the panel ring. Returns the summed panel max health,
/// the denominator of the structure-integrity percentage.
pub fn setup_arena(
    registry: &mut Registry,
    library: &ArchetypeLibrary,
    config: &SimConfig,
) -> SimResult<f32> {
    spawn_turret(registry, library)?;
    let panels = spawn_panels(registry, library, config.panels, config.panel_ring_radius)?;
    Ok(panels
        .iter()
        .filter_map(|id| registry.get_entity(*id)?.get::<Health>())
        .map(|h| h.max)
        .sum())
}

/// Spawn the player turret at the origin.
pub fn spawn_turret(registry: &mut Registry, library: &ArchetypeLibrary) -> SimResult<EntityId> {
    library.spawn(registry, "turret", Placement::at(Vec2::ZERO))
}

/// Spawn `count` panels evenly spaced on a ring, each facing outward.
pub fn spawn_panels(
    registry: &mut Registry,
    library: &ArchetypeLibrary,
    count: u32,
    radius: f32,
) -> SimResult<Vec<EntityId>> {
    let mut ids = Vec::with_capacity(count as usize);
    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count as f32;
        let placement = Placement {
            position: Vec2::from_angle(angle) * radius,
            rotation: angle,
            velocity: None,
        };
        ids.push(library.spawn(registry, "panel", placement)?);
    }
    Ok(ids)
}

/// Summed current health of every live panel.
pub fn panel_health(registry: &Registry) -> f32 {
    registry
        .get_by_tag(Tag::Obstacle)
        .iter()
        .filter_map(|id| registry.get_entity(id)?.get::<Health>())
        .map(|h| h.current.max(0.0))
        .sum()
}
