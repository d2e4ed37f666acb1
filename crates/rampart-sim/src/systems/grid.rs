//! Broad-phase rebuild: clear the grid and insert every collider at its
//! current position.

use tracing::trace;

use crate::world::World;

pub fn run(world: &mut World) {
    world.grid.clear();
    let registry = &world.registry;
    let mut dropped = 0usize;
    for id in registry.query_result(world.queries.colliders) {
        let Some(position) = registry.position(id) else {
            continue;
        };
        if !world.grid.insert(id, position) {
            dropped += 1;
        }
    }
    if dropped > 0 {
        trace!(dropped, "colliders not indexed this frame");
    }
}
