//! Behavior dispatch: runs each AI entity's routine once per frame.
//!
//! The entity's data is copied into a [`Subject`], the routine for its
//! behavior kind runs against an [`AiContext`], and the subject is written
//! back. Entities whose stun timer is running are skipped so a knockback
//! impulse is not steered away on the next frame.

use glam::Vec2;
use tracing::trace;

use rampart_ai::{routine_for, BehaviorContext, ProjectileRequest, Routine, Subject};
use rampart_core::components::*;
use rampart_core::enums::{BehaviorKind, ComponentKind, Theme};
use rampart_core::events::{EffectKind, SoundKey};
use rampart_core::types::{SimTime, UpgradeLookup, UpgradeTable};
use rampart_core::EntityId;

use crate::bus::EventBus;
use crate::ecs::Registry;
use crate::world::{self, World};

/// Behavior kind → update routine.
#[derive(Debug, Clone)]
pub struct BehaviorRegistry {
    routines: [Option<Routine>; BehaviorKind::COUNT],
}

impl BehaviorRegistry {
    /// No routines registered; entities are left idle.
    pub fn empty() -> Self {
        Self {
            routines: [None; BehaviorKind::COUNT],
        }
    }

    /// The stock routine for every behavior kind.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for kind in BehaviorKind::ALL {
            registry.register(kind, routine_for(kind));
        }
        registry
    }

    /// Install `routine` for `kind`, replacing any existing one.
    pub fn register(&mut self, kind: BehaviorKind, routine: Routine) {
        self.routines[kind.index()] = Some(routine);
    }

    pub fn get(&self, kind: BehaviorKind) -> Option<Routine> {
        self.routines[kind.index()]
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The services a routine may use, borrowed from the world for one call.
pub struct AiContext<'a> {
    registry: &'a Registry,
    upgrades: &'a UpgradeTable,
    time: SimTime,
    spawns: &'a mut Vec<ProjectileRequest>,
    bus: &'a mut EventBus,
}

impl BehaviorContext for AiContext<'_> {
    fn elapsed(&self) -> f32 {
        self.time.elapsed
    }

    fn delta(&self) -> f32 {
        self.time.delta
    }

    fn spawn_projectile(&mut self, request: ProjectileRequest) {
        self.spawns.push(request);
    }

    fn spawn_effect(&mut self, effect: EffectKind, theme: Theme, at: Vec2, angle: f32) {
        self.bus.effect(effect, theme, at.x, at.y, angle);
    }

    fn play_sound(&mut self, sound: SoundKey, pan: f32) {
        self.bus.sound(sound, pan);
    }

    fn locate(&self, id: EntityId) -> Option<Vec2> {
        self.registry.position(id)
    }

    fn nearest_panel(&self, from: Vec2) -> Option<(EntityId, Vec2)> {
        world::nearest_panel(self.registry, from)
    }

    fn player(&self) -> Option<(EntityId, Vec2)> {
        world::player(self.registry)
    }

    fn upgrade_level(&self, key: &str) -> u32 {
        self.upgrades.level(key)
    }
}

/// Run one tick of every AI entity's routine.
pub fn run(world: &mut World, behaviors: &BehaviorRegistry) {
    let ids = world.snapshot_ids(world.queries.behaviors);
    for &id in &ids {
        let Some(mut subject) = load_subject(&world.registry, id) else {
            continue;
        };
        if subject.state.suppressed() {
            continue;
        }
        let Some(routine) = behaviors.get(subject.state.kind) else {
            trace!(%id, kind = ?subject.state.kind, "no routine registered");
            continue;
        };

        let mut ctx = AiContext {
            registry: &world.registry,
            upgrades: &world.upgrades,
            time: world.time,
            spawns: &mut world.spawns,
            bus: &mut world.bus,
        };
        routine(&mut subject, &mut ctx);
        store_subject(&mut world.registry, subject);
    }
    world.restore_scratch(ids);
}

/// Copy an entity's behavior-relevant components into a [`Subject`].
pub fn load_subject(registry: &Registry, id: EntityId) -> Option<Subject> {
    let entity = registry.get_entity(id)?;
    let slot = entity.get::<Transform>()?.slot;
    let motion = entity.get::<Motion>()?;
    let state = entity.get::<BehaviorState>()?.clone();
    Some(Subject {
        id,
        position: registry.transforms().position(slot)?,
        rotation: registry.transforms().rotation(slot).unwrap_or(0.0),
        velocity: motion.velocity,
        angular: motion.angular,
        max_speed: motion.max_speed,
        state,
        target: entity.get::<TargetRef>().and_then(|t| t.entity),
        orbit: entity.get::<Orbit>().copied(),
        health: entity.get::<Health>().copied(),
        combat: entity.get::<CombatStats>().copied().unwrap_or_default(),
        theme: entity.get::<Identity>().map(|i| i.theme).unwrap_or_default(),
    })
}

/// Write a subject back onto its entity.
///
/// Position is not written: routines steer through velocity and the
/// movement system integrates it. Adding or dropping the orbit is a
/// structural change and goes through the registry so its caches follow.
pub fn store_subject(registry: &mut Registry, subject: Subject) {
    let id = subject.id;
    let orbit_change = {
        let Some((entity, transforms)) = registry.split_mut(id) else {
            return;
        };
        if let Some(transform) = entity.get::<Transform>() {
            transforms.set_rotation(transform.slot, subject.rotation);
        }
        if let Some(motion) = entity.get_mut::<Motion>() {
            motion.velocity = subject.velocity;
            motion.angular = subject.angular;
        }
        if let Some(state) = entity.get_mut::<BehaviorState>() {
            *state = subject.state;
        }
        if let Some(target) = entity.get_mut::<TargetRef>() {
            target.entity = subject.target;
        }
        if let (Some(health), Some(updated)) = (entity.get_mut::<Health>(), subject.health) {
            health.shield_active = updated.shield_active && health.shield > 0.0;
        }
        match (entity.get_mut::<Orbit>(), subject.orbit) {
            (Some(orbit), Some(updated)) => {
                *orbit = updated;
                OrbitChange::Keep
            }
            (None, Some(updated)) => OrbitChange::Attach(updated),
            (Some(_), None) => OrbitChange::Detach,
            (None, None) => OrbitChange::Keep,
        }
    };

    match orbit_change {
        OrbitChange::Attach(orbit) => {
            if let Err(err) = registry.add_component(id, &ComponentInit::Orbit(orbit)) {
                trace!(%id, %err, "orbit not attached");
            }
        }
        OrbitChange::Detach => {
            registry.remove_component(id, ComponentKind::Orbit);
        }
        OrbitChange::Keep => {}
    }
}

enum OrbitChange {
    Keep,
    Attach(Orbit),
    Detach,
}
