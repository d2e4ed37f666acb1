//! Cleanup system: removes projectiles and enemies that left the arena.

use glam::Vec2;

use rampart_core::constants::ARENA_CLEANUP_MARGIN;
use rampart_core::EntityId;

use crate::world::World;

/// Destroy strays beyond the arena plus a margin.
/// Uses a pre-allocated buffer to avoid per-frame allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<EntityId>) {
    despawn_buffer.clear();
    let limit = world.arena + Vec2::splat(ARENA_CLEANUP_MARGIN);
    let registry = &world.registry;
    for id in registry.query_result(world.queries.strays) {
        if let Some(pos) = registry.position(id) {
            if pos.x.abs() > limit.x || pos.y.abs() > limit.y {
                despawn_buffer.push(id);
            }
        }
    }
    for id in despawn_buffer.drain(..) {
        world.registry.destroy_entity(id);
    }
}
