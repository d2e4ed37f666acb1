//! Auto-targeting weapon for the turret.
//!
//! Every shooter (Transform + Combat, no behavior, not itself a projectile)
//! counts down its cooldown, picks the nearest live enemy within range via
//! the spatial grid, and requests a homing bolt. Upgrade levels scale
//! cadence, damage and pierce.

use glam::Vec2;

use rampart_ai::ProjectileRequest;
use rampart_core::components::{CombatStats, Identity, Transform};
use rampart_core::constants::*;
use rampart_core::enums::{Tag, Theme};
use rampart_core::events::{EffectKind, SoundKey};
use rampart_core::types::UpgradeLookup;
use rampart_core::EntityId;

use crate::world::World;

/// Weapon figures after upgrades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub interval: f32,
    pub damage: f32,
    pub pierce: u8,
}

/// Apply the fire-rate, damage and pierce upgrade levels to base stats.
pub fn upgraded(base: &CombatStats, upgrades: &impl UpgradeLookup) -> WeaponStats {
    let rate = upgrades.level(UPGRADE_FIRE_RATE) as f32;
    let damage = upgrades.level(UPGRADE_DAMAGE) as f32;
    let pierce = upgrades.level(UPGRADE_PIERCE).min(u8::MAX as u32) as u8;
    WeaponStats {
        interval: base.fire_interval / (1.0 + FIRE_RATE_PER_LEVEL * rate),
        damage: base.damage + DAMAGE_PER_LEVEL * damage,
        pierce: 1u8.saturating_add(pierce.saturating_mul(PIERCE_PER_LEVEL)),
    }
}

pub fn run(world: &mut World, dt: f32) {
    let ids = world.snapshot_ids(world.queries.shooters);
    for &id in &ids {
        fire(world, id, dt);
    }
    world.restore_scratch(ids);
}

fn fire(world: &mut World, id: EntityId, dt: f32) {
    let Some(entity) = world.registry.entity_mut(id) else {
        return;
    };
    let theme = entity.get::<Identity>().map(|i| i.theme).unwrap_or(Theme::Neon);
    let Some(combat) = entity.get_mut::<CombatStats>() else {
        return;
    };
    if combat.fire_interval <= 0.0 {
        return;
    }
    combat.cooldown = (combat.cooldown - dt).max(0.0);
    if combat.cooldown > 0.0 {
        return;
    }
    let base = *combat;

    let Some(origin) = world.registry.position(id) else {
        return;
    };
    let Some((target, at)) = nearest_enemy(world, origin, base.range) else {
        return;
    };
    let stats = upgraded(&base, &world.upgrades);
    let aim = (at - origin).normalize_or_zero();
    if aim == Vec2::ZERO {
        return;
    }
    let angle = aim.y.atan2(aim.x);

    if let Some((entity, transforms)) = world.registry.split_mut(id) {
        if let Some(transform) = entity.get::<Transform>() {
            transforms.set_rotation(transform.slot, angle);
        }
        if let Some(combat) = entity.get_mut::<CombatStats>() {
            combat.cooldown = stats.interval;
        }
    }

    world.spawns.push(ProjectileRequest {
        archetype: "bolt",
        origin,
        velocity: aim * base.projectile_speed,
        damage: stats.damage,
        pierce: stats.pierce,
        owner: id,
        target: Some(target),
    });
    world
        .bus
        .effect(EffectKind::Muzzle, theme, origin.x, origin.y, angle);
    world
        .bus
        .sound(SoundKey::Shot, (origin.x / world.arena.x).clamp(-1.0, 1.0));
}

/// Closest live enemy whose center lies within `range` of `origin`.
///
/// The grid returns everything in the overlapped buckets; the exact range
/// test happens here.
pub fn nearest_enemy(world: &mut World, origin: Vec2, range: f32) -> Option<(EntityId, Vec2)> {
    let count = world.grid.query(origin, range, &mut world.neighbors);
    let registry = &world.registry;
    let range_sq = range * range;
    let mut best: Option<(EntityId, Vec2, f32)> = None;
    for &candidate in &world.neighbors[..count] {
        let Some(entity) = registry.get_entity(candidate) else {
            continue;
        };
        if !entity.has_tag(Tag::Enemy) {
            continue;
        }
        let Some(pos) = registry.position(candidate) else {
            continue;
        };
        let d = pos.distance_squared(origin);
        if d > range_sq {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_id, _, bd)) => d < bd || (d == bd && candidate.index < best_id.index),
        };
        if closer {
            best = Some((candidate, pos, d));
        }
    }
    best.map(|(id, pos, _)| (id, pos))
}
