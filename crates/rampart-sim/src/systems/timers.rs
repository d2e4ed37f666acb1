//! Countdown system: behavior timers and entity lifetimes.

use rampart_core::components::{BehaviorState, Lifetime};
use rampart_core::EntityId;

use crate::world::World;

/// Count down every behavior timer, floored at zero.
pub fn tick_behaviors(world: &mut World, dt: f32) {
    let ids = world.snapshot_ids(world.queries.behaviors);
    for &id in &ids {
        if let Some(state) = world
            .registry
            .entity_mut(id)
            .and_then(|e| e.get_mut::<BehaviorState>())
        {
            state.timers.tick(dt);
        }
    }
    world.restore_scratch(ids);
}

/// Count down lifetimes and destroy whatever expired.
///
/// Expired ids are collected into `despawn_buffer` first so nothing is
/// destroyed while the query is being walked.
pub fn tick_lifetimes(world: &mut World, dt: f32, despawn_buffer: &mut Vec<EntityId>) {
    despawn_buffer.clear();
    let ids = world.snapshot_ids(world.queries.lifetimes);
    for &id in &ids {
        if let Some(lifetime) = world
            .registry
            .entity_mut(id)
            .and_then(|e| e.get_mut::<Lifetime>())
        {
            lifetime.remaining = (lifetime.remaining - dt).max(0.0);
            if lifetime.remaining <= 0.0 {
                despawn_buffer.push(id);
            }
        }
    }
    world.restore_scratch(ids);

    for id in despawn_buffer.drain(..) {
        world.registry.destroy_entity(id);
    }
}
