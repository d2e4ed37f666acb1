//! Combat resolution for one oriented contact.
//!
//! Both sides' outgoing damage is worked out first, then applied to each
//! side, and only then are deaths evaluated, so mutual destruction is
//! possible and the outcome does not depend on which side came first.
//! Shields absorb hits while active. Survivors that move under their own
//! behavior get a knockback impulse along the contact normal plus a stun
//! timer. Everything observable leaves through the event bus.

use glam::Vec2;
use tracing::debug;

use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{ComponentKind, Tag, Theme, TimerKey};
use rampart_core::events::{EffectKind, Signal, SoundKey};
use rampart_core::types::TagSet;
use rampart_core::EntityId;

use super::collision::Contact;
use crate::bus::EventBus;
use crate::world::World;

/// Outcomes accumulated across a frame's contacts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatTally {
    pub score: u32,
    pub kills: u32,
    pub panel_losses: u32,
    pub player_down: bool,
}

impl CombatTally {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// What one side of a contact brings to it.
#[derive(Debug, Clone)]
struct Side {
    id: EntityId,
    tags: TagSet,
    position: Vec2,
    velocity: Vec2,
    damage: f32,
    knockback: f32,
    has_health: bool,
    /// Moves under its own behavior, so it can be knocked back and stunned.
    steered: bool,
    /// Behavior-driven contact attacker whose attack timer is still running.
    attack_blocked: bool,
    projectile: Option<ProjectileState>,
    identity: Identity,
}

impl Side {
    fn read(world: &World, id: EntityId) -> Option<Side> {
        let entity = world.registry.get_entity(id)?;
        let behavior = entity.get::<BehaviorState>();
        let projectile = entity.get::<ProjectileState>().copied();
        let combat = entity.get::<CombatStats>();
        Some(Side {
            id,
            tags: entity.tags(),
            position: world.registry.position(id)?,
            velocity: entity.get::<Motion>().map(|m| m.velocity).unwrap_or(Vec2::ZERO),
            damage: combat.map(|c| c.damage).unwrap_or(0.0),
            knockback: combat.map(|c| c.knockback).unwrap_or(1.0),
            has_health: entity.has(ComponentKind::Health),
            steered: behavior.is_some() && entity.get::<Motion>().is_some(),
            attack_blocked: projectile.is_none()
                && behavior.is_some_and(|b| b.timers.running(TimerKey::Attack)),
            projectile,
            identity: entity.get::<Identity>().cloned().unwrap_or_default(),
        })
    }

    /// Damage this side deals to the other on this contact.
    fn outgoing(&self) -> f32 {
        if self.attack_blocked {
            0.0
        } else {
            self.damage.max(0.0)
        }
    }

    fn melee(&self) -> bool {
        self.projectile.is_none() && self.steered
    }

    fn owns(&self, other: &Side) -> bool {
        other.projectile.and_then(|p| p.owner) == Some(self.id)
    }
}

/// Result of applying damage to one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    None,
    Absorbed,
    Wounded,
    Killed,
}

/// Resolve one contact oriented by the collision matrix.
pub fn resolve_contact(world: &mut World, contact: &Contact, tally: &mut CombatTally) {
    let (Some(a), Some(b)) = (Side::read(world, contact.a), Side::read(world, contact.b)) else {
        return;
    };
    if a.owns(&b) || b.owns(&a) {
        return;
    }

    let to_b = a.outgoing();
    let to_a = b.outgoing();
    let consumed = a.projectile.is_some() || b.projectile.is_some();
    if to_a <= 0.0 && to_b <= 0.0 && !consumed {
        return;
    }

    let hit_a = apply_damage(world, &a, to_a);
    let hit_b = apply_damage(world, &b, to_b);

    // Only a hit that landed on health or shield starts the melee cadence.
    if a.melee() && hit_b != Hit::None {
        arm_attack_timer(world, a.id);
    }
    if b.melee() && hit_a != Hit::None {
        arm_attack_timer(world, b.id);
    }

    let spent_a = spend_pierce(world, &a);
    let spent_b = spend_pierce(world, &b);

    if hit_a != Hit::Killed && !spent_a {
        knock_back(world, &a, -contact.normal, b.knockback);
    }
    if hit_b != Hit::Killed && !spent_b {
        knock_back(world, &b, contact.normal, a.knockback);
    }

    // Deaths in contact order; each entity is destroyed at most once.
    if hit_a == Hit::Killed || spent_a {
        destroy(world, &a, b.velocity - a.velocity, tally);
    }
    if hit_b == Hit::Killed || spent_b {
        destroy(world, &b, a.velocity - b.velocity, tally);
    }
}

fn arm_attack_timer(world: &mut World, id: EntityId) {
    if let Some(state) = world
        .registry
        .entity_mut(id)
        .and_then(|e| e.get_mut::<BehaviorState>())
    {
        state.timers.set(TimerKey::Attack, ATTACK_COOLDOWN);
    }
}

fn apply_damage(world: &mut World, side: &Side, amount: f32) -> Hit {
    if amount <= 0.0 || !side.has_health {
        return Hit::None;
    }
    let Some(entity) = world.registry.entity_mut(side.id) else {
        return Hit::None;
    };
    let Some(health) = entity.get_mut::<Health>() else {
        return Hit::None;
    };
    if health.is_depleted() {
        return Hit::None;
    }

    if health.shield_active && health.shield > 0.0 {
        health.shield = (health.shield - amount).max(0.0);
        if health.shield <= 0.0 {
            health.shield_active = false;
        }
        let remaining = health.shield;
        if let Some(effect) = entity.get_mut::<RenderEffect>() {
            effect.glow = 1.0;
        }
        let bus = &mut world.bus;
        bus.signal(Signal::ShieldHit {
            entity: side.id,
            remaining,
        });
        bus.effect(
            EffectKind::ShieldFlash,
            side.identity.theme,
            side.position.x,
            side.position.y,
            0.0,
        );
        bus.sound(SoundKey::ShieldHit, pan_of(world.arena, side.position));
        return Hit::Absorbed;
    }

    health.current = (health.current - amount).max(0.0);
    let remaining = health.current;
    let killed = health.is_depleted();
    if let Some(effect) = entity.get_mut::<RenderEffect>() {
        effect.flash = FLASH_ON_HIT;
    }

    let pan = pan_of(world.arena, side.position);
    let bus = &mut world.bus;
    if side.tags.contains(Tag::Obstacle) {
        bus.signal(Signal::PanelDamaged {
            entity: side.id,
            amount,
            remaining,
        });
        bus.trauma(TRAUMA_PANEL_DAMAGED);
        bus.sound(SoundKey::PanelCrack, pan);
    } else {
        bus.signal(Signal::Damaged {
            entity: side.id,
            tag: side.tags.iter().next(),
            amount,
            remaining,
        });
        if side.tags.contains(Tag::Player) {
            bus.trauma(TRAUMA_PLAYER_HIT);
        }
        bus.sound(SoundKey::Hit, pan);
    }

    if killed {
        Hit::Killed
    } else {
        Hit::Wounded
    }
}

/// Use up one pierce charge. Returns true when the projectile is spent.
fn spend_pierce(world: &mut World, side: &Side) -> bool {
    if side.projectile.is_none() {
        return false;
    }
    let Some(projectile) = world
        .registry
        .entity_mut(side.id)
        .and_then(|e| e.get_mut::<ProjectileState>())
    else {
        return false;
    };
    projectile.pierce = projectile.pierce.saturating_sub(1);
    projectile.pierce == 0
}

fn knock_back(world: &mut World, side: &Side, direction: Vec2, scale: f32) {
    if !side.steered {
        return;
    }
    let Some(entity) = world.registry.entity_mut(side.id) else {
        return;
    };
    if let Some(motion) = entity.get_mut::<Motion>() {
        motion.velocity += direction * KNOCKBACK_FORCE * scale;
    }
    if let Some(state) = entity.get_mut::<BehaviorState>() {
        state.timers.set(TimerKey::Stun, STUN_DURATION);
    }
}

/// Destroy a side that died in combat and announce it.
///
/// `impact` is the other side's velocity relative to this one; a fast
/// enough impact orients the destruction burst along it.
fn destroy(world: &mut World, side: &Side, impact: Vec2, tally: &mut CombatTally) {
    if !world.registry.is_alive(side.id) {
        return;
    }
    let id = side.id;
    let at = side.position;
    let theme = side.identity.theme;
    let pan = pan_of(world.arena, at);
    let bus = &mut world.bus;

    if side.projectile.is_some() {
        bus.effect(EffectKind::Spark, theme, at.x, at.y, impact.y.atan2(impact.x));
    } else if side.tags.contains(Tag::Enemy) {
        burst(bus, theme, at, impact);
        bus.sound(SoundKey::Explode, pan);
        bus.trauma(TRAUMA_ENEMY_DESTROYED);
        bus.hit_stop(if side.identity.variant == BOSS_VARIANT {
            HIT_STOP_BOSS
        } else {
            HIT_STOP_KILL
        });
        bus.signal(Signal::EnemyDestroyed {
            entity: id,
            archetype: side.identity.archetype.clone(),
            theme,
            x: at.x,
            y: at.y,
            bounty: side.identity.bounty,
        });
        tally.score += side.identity.bounty;
        tally.kills += 1;
    } else if side.tags.contains(Tag::Obstacle) {
        burst(bus, theme, at, impact);
        bus.sound(SoundKey::Explode, pan);
        bus.trauma(TRAUMA_PANEL_DESTROYED);
        bus.signal(Signal::PanelDestroyed { entity: id });
        tally.panel_losses += 1;
    } else if side.tags.contains(Tag::Player) {
        burst(bus, theme, at, impact);
        bus.sound(SoundKey::Explode, pan);
        bus.trauma(TRAUMA_PANEL_DESTROYED);
        bus.signal(Signal::PlayerDestroyed { entity: id });
        tally.player_down = true;
    }

    debug!(%id, archetype = %side.identity.archetype, "destroyed in combat");
    world.registry.destroy_entity(id);
}

fn burst(bus: &mut EventBus, theme: Theme, at: Vec2, impact: Vec2) {
    if impact.length() > DIRECTIONAL_IMPACT_SPEED {
        bus.effect(
            EffectKind::BurstDirectional,
            theme,
            at.x,
            at.y,
            impact.y.atan2(impact.x),
        );
    } else {
        bus.effect(EffectKind::BurstOmni, theme, at.x, at.y, 0.0);
    }
}

fn pan_of(arena: Vec2, at: Vec2) -> f32 {
    if arena.x <= 0.0 {
        0.0
    } else {
        (at.x / arena.x).clamp(-1.0, 1.0)
    }
}
