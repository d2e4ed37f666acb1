//! Copies transform-store values into the render-facing components and
//! advances spawn fade-in and hit flash.

use rampart_core::components::{Health, RenderEffect, RenderTransform, Transform};
use rampart_core::constants::{FLASH_DECAY, SPAWN_FADE_SECS};

use crate::world::World;

pub fn run(world: &mut World, dt: f32) {
    let ids = world.snapshot_ids(world.queries.renderables);
    for &id in &ids {
        let Some((entity, transforms)) = world.registry.split_mut(id) else {
            continue;
        };
        let Some(slot) = entity.get::<Transform>().map(|t| t.slot) else {
            continue;
        };
        let shield = entity
            .get::<Health>()
            .filter(|h| h.shield_active && h.max_shield > 0.0)
            .map(|h| h.shield / h.max_shield);

        if let Some(render) = entity.get_mut::<RenderTransform>() {
            render.position = transforms.position(slot).unwrap_or(render.position);
            render.rotation = transforms.rotation(slot).unwrap_or(render.rotation);
            render.scale = transforms.scale(slot).unwrap_or(render.scale);
            if render.spawn_progress < 1.0 {
                render.spawn_progress = (render.spawn_progress + dt / SPAWN_FADE_SECS).min(1.0);
            }
        }
        if let Some(effect) = entity.get_mut::<RenderEffect>() {
            let decay = FLASH_DECAY * dt;
            effect.flash = (effect.flash - decay).max(0.0);
            effect.glow = match shield {
                Some(level) => (effect.glow - decay).max(level),
                None => (effect.glow - decay).max(0.0),
            };
        }
    }
    world.restore_scratch(ids);
}
