//! Archetype definitions and their expansion into live entities.
//!
//! An archetype is a tag list plus one initialiser per component. The
//! built-in library covers the turret, panels, every enemy and both
//! projectiles; further definitions can be loaded from JSON.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use rampart_ai::ProjectileRequest;
use rampart_core::components::*;
use rampart_core::constants::*;
use rampart_core::enums::{AiState, BehaviorKind, ModelKind, Tag, Theme};
use rampart_core::types::LayerMask;
use rampart_core::{EcsError, EcsResult, EntityId};

use crate::ecs::{ComponentStore, Registry};
use crate::error::{SimError, SimResult};

/// Named template for spawning an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDef {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub components: Vec<ComponentInit>,
}

/// Where and how a spawned entity starts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub position: Vec2,
    pub rotation: f32,
    /// Replaces the archetype's initial velocity when set.
    pub velocity: Option<Vec2>,
}

impl Placement {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchetypeLibrary {
    defs: BTreeMap<String, ArchetypeDef>,
}

impl ArchetypeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library holding every built-in archetype.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for def in builtin_defs() {
            library.insert(def);
        }
        library
    }

    /// Add or replace a definition, returning the one it replaced.
    pub fn insert(&mut self, def: ArchetypeDef) -> Option<ArchetypeDef> {
        self.defs.insert(def.name.clone(), def)
    }

    pub fn get(&self, name: &str) -> Option<&ArchetypeDef> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Load a JSON array of definitions. Returns how many were loaded.
    pub fn load_json(&mut self, json: &str) -> SimResult<usize> {
        let defs: Vec<ArchetypeDef> = serde_json::from_str(json)?;
        let count = defs.len();
        for def in defs {
            self.insert(def);
        }
        Ok(count)
    }

    /// Check every definition can be built by `store`.
    pub fn validate(&self, store: &ComponentStore) -> SimResult<()> {
        for def in self.defs.values() {
            for init in &def.components {
                if !store.is_registered(init.kind()) {
                    return Err(EcsError::UnregisteredComponent(init.kind()).into());
                }
            }
        }
        Ok(())
    }

    /// Expand `name` into a live entity.
    pub fn spawn(
        &self,
        registry: &mut Registry,
        name: &str,
        placement: Placement,
    ) -> SimResult<EntityId> {
        let def = self
            .get(name)
            .ok_or_else(|| SimError::UnknownArchetype(name.to_string()))?;
        let id = registry.create_entity();
        if let Err(err) = populate(registry, id, def, placement) {
            registry.destroy_entity(id);
            return Err(err.into());
        }
        registry.update_cache(id);
        Ok(id)
    }

    /// Spawn a projectile requested by a behavior routine or weapon.
    pub fn spawn_projectile(
        &self,
        registry: &mut Registry,
        request: &ProjectileRequest,
    ) -> SimResult<EntityId> {
        let placement = Placement {
            position: request.origin,
            rotation: request.velocity.y.atan2(request.velocity.x),
            velocity: Some(request.velocity),
        };
        let id = self.spawn(registry, request.archetype, placement)?;
        if let Some(entity) = registry.entity_mut(id) {
            if let Some(combat) = entity.get_mut::<CombatStats>() {
                if request.damage > 0.0 {
                    combat.damage = request.damage;
                }
            }
            if let Some(projectile) = entity.get_mut::<ProjectileState>() {
                projectile.pierce = request.pierce.max(1);
                projectile.owner = Some(request.owner);
                projectile.speed = request.velocity.length();
            }
            if let Some(target) = entity.get_mut::<TargetRef>() {
                target.entity = request.target;
            }
        }
        Ok(id)
    }
}

fn populate(
    registry: &mut Registry,
    id: EntityId,
    def: &ArchetypeDef,
    placement: Placement,
) -> EcsResult<()> {
    for init in &def.components {
        match init {
            ComponentInit::Transform(t) => registry.insert_component(
                id,
                &ComponentInit::Transform(TransformInit {
                    x: placement.position.x,
                    y: placement.position.y,
                    rotation: placement.rotation,
                    scale: t.scale,
                }),
            )?,
            ComponentInit::Motion(m) => registry.insert_component(
                id,
                &ComponentInit::Motion(Motion {
                    velocity: placement.velocity.unwrap_or(m.velocity),
                    ..*m
                }),
            )?,
            other => registry.insert_component(id, other)?,
        }
    }
    let entity = registry.entity_mut(id).ok_or(EcsError::DeadEntity(id))?;
    for tag in &def.tags {
        entity.insert_tag(*tag);
    }
    Ok(())
}

// --- Built-in archetypes ---

fn render(model: ModelKind, color: [f32; 3], fade_in: bool) -> [ComponentInit; 3] {
    [
        ComponentInit::RenderModel(RenderModel { model, color }),
        ComponentInit::RenderTransform(RenderTransform {
            spawn_progress: if fade_in { 0.0 } else { 1.0 },
            ..Default::default()
        }),
        ComponentInit::RenderEffect(RenderEffect::default()),
    ]
}

fn identity(archetype: &str, variant: u8, theme: Theme, bounty: u32) -> ComponentInit {
    ComponentInit::Identity(Identity {
        archetype: archetype.to_string(),
        variant,
        theme,
        bounty,
    })
}

struct EnemySpec {
    name: &'static str,
    kind: BehaviorKind,
    model: ModelKind,
    color: [f32; 3],
    theme: Theme,
    variant: u8,
    health: f32,
    shield: f32,
    damage: f32,
    knockback: f32,
    fire_interval: f32,
    radius: f32,
    speed: f32,
    bounty: u32,
}

fn enemy(spec: EnemySpec) -> ArchetypeDef {
    let mut components = vec![
        ComponentInit::Transform(TransformInit::default()),
        ComponentInit::Motion(Motion {
            damping: 3.0,
            max_speed: spec.speed,
            ..Default::default()
        }),
        ComponentInit::Health(HealthInit {
            max: spec.health,
            shield: spec.shield,
            shield_active: spec.shield > 0.0,
        }),
        ComponentInit::Combat(CombatStats {
            damage: spec.damage,
            knockback: spec.knockback,
            fire_interval: spec.fire_interval,
            ..Default::default()
        }),
        ComponentInit::Collider(Collider {
            radius: spec.radius,
            layer: LayerMask::ENEMY,
            mask: LayerMask::PLAYER
                .union(LayerMask::PLAYER_SHOT)
                .union(LayerMask::PANEL),
        }),
        ComponentInit::Behavior(BehaviorInit {
            kind: spec.kind,
            state: AiState::Spawn,
        }),
        ComponentInit::Target(TargetRef::default()),
        identity(spec.name, spec.variant, spec.theme, spec.bounty),
    ];
    components.extend(render(spec.model, spec.color, true));
    ArchetypeDef {
        name: spec.name.to_string(),
        tags: vec![Tag::Enemy],
        components,
    }
}

fn projectile(name: &str, layer: LayerMask, mask: LayerMask, speed: f32, life: f32) -> ArchetypeDef {
    let (model, theme, color) = if layer == LayerMask::PLAYER_SHOT {
        (ModelKind::Bolt, Theme::Neon, [0.4, 1.0, 1.0])
    } else {
        (ModelKind::Spit, Theme::Ember, [1.0, 0.5, 0.2])
    };
    let mut components = vec![
        ComponentInit::Transform(TransformInit::default()),
        ComponentInit::Motion(Motion::default()),
        ComponentInit::Combat(CombatStats {
            damage: 1.0,
            knockback: 1.0,
            ..Default::default()
        }),
        ComponentInit::Collider(Collider {
            radius: if layer == LayerMask::PLAYER_SHOT { 6.0 } else { 8.0 },
            layer,
            mask,
        }),
        ComponentInit::Projectile(ProjectileState {
            speed,
            pierce: 1,
            homing: if layer == LayerMask::PLAYER_SHOT { 2.5 } else { 0.0 },
            owner: None,
        }),
        ComponentInit::Lifetime(Lifetime { remaining: life }),
        ComponentInit::Target(TargetRef::default()),
        identity(name, 0, theme, 0),
    ];
    components.extend(render(model, color, false));
    ArchetypeDef {
        name: name.to_string(),
        tags: vec![Tag::Projectile],
        components,
    }
}

fn builtin_defs() -> Vec<ArchetypeDef> {
    let mut turret = vec![
        ComponentInit::Transform(TransformInit::default()),
        ComponentInit::Health(HealthInit {
            max: 20.0,
            ..Default::default()
        }),
        ComponentInit::Combat(CombatStats {
            damage: 1.0,
            knockback: 1.0,
            fire_interval: 0.35,
            cooldown: 0.0,
            range: 520.0,
            projectile_speed: 640.0,
        }),
        ComponentInit::Collider(Collider {
            radius: 28.0,
            layer: LayerMask::PLAYER,
            mask: LayerMask::ENEMY.union(LayerMask::ENEMY_SHOT),
        }),
        identity("turret", 0, Theme::Neon, 0),
    ];
    turret.extend(render(ModelKind::Turret, [0.3, 0.9, 1.0], false));

    let mut panel = vec![
        ComponentInit::Transform(TransformInit::default()),
        ComponentInit::Health(HealthInit {
            max: 12.0,
            ..Default::default()
        }),
        ComponentInit::Collider(Collider {
            radius: 36.0,
            layer: LayerMask::PANEL,
            mask: LayerMask::ENEMY.union(LayerMask::ENEMY_SHOT),
        }),
        identity("panel", 0, Theme::Frost, 0),
    ];
    panel.extend(render(ModelKind::Panel, [0.6, 0.8, 1.0], false));

    vec![
        ArchetypeDef {
            name: "turret".into(),
            tags: vec![Tag::Player],
            components: turret,
        },
        ArchetypeDef {
            name: "panel".into(),
            tags: vec![Tag::Obstacle, Tag::World],
            components: panel,
        },
        enemy(EnemySpec {
            name: "drifter",
            kind: BehaviorKind::Drifter,
            model: ModelKind::Drifter,
            color: [1.0, 0.4, 0.3],
            theme: Theme::Ember,
            variant: 0,
            health: 3.0,
            shield: 0.0,
            damage: 1.0,
            knockback: 1.0,
            fire_interval: 0.0,
            radius: 18.0,
            speed: DRIFTER_SPEED,
            bounty: 10,
        }),
        enemy(EnemySpec {
            name: "orbiter",
            kind: BehaviorKind::Orbiter,
            model: ModelKind::Orbiter,
            color: [0.5, 0.7, 1.0],
            theme: Theme::Frost,
            variant: 1,
            health: 4.0,
            shield: 0.0,
            damage: 1.0,
            knockback: 1.0,
            fire_interval: ORBITER_FIRE_INTERVAL,
            radius: 20.0,
            speed: ORBITER_SPEED,
            bounty: 25,
        }),
        enemy(EnemySpec {
            name: "charger",
            kind: BehaviorKind::Charger,
            model: ModelKind::Charger,
            color: [0.8, 0.3, 1.0],
            theme: Theme::Void,
            variant: 0,
            health: 5.0,
            shield: 0.0,
            damage: 2.0,
            knockback: 1.5,
            fire_interval: 0.0,
            radius: 22.0,
            speed: CHARGER_SPEED,
            bounty: 30,
        }),
        enemy(EnemySpec {
            name: "spinner",
            kind: BehaviorKind::Spinner,
            model: ModelKind::Spinner,
            color: [1.0, 1.0, 0.4],
            theme: Theme::Neon,
            variant: 0,
            health: 2.0,
            shield: 0.0,
            damage: 1.0,
            knockback: 1.0,
            fire_interval: 0.0,
            radius: 16.0,
            speed: SPINNER_SPEED,
            bounty: 15,
        }),
        enemy(EnemySpec {
            name: "warden",
            kind: BehaviorKind::Warden,
            model: ModelKind::Warden,
            color: [1.0, 0.2, 0.6],
            theme: Theme::Void,
            variant: BOSS_VARIANT,
            health: 40.0,
            shield: 20.0,
            damage: 2.0,
            knockback: 0.5,
            fire_interval: 0.0,
            radius: 56.0,
            speed: WARDEN_SPEED,
            bounty: 250,
        }),
        projectile(
            "bolt",
            LayerMask::PLAYER_SHOT,
            LayerMask::ENEMY.union(LayerMask::ENEMY_SHOT),
            640.0,
            1.5,
        ),
        projectile(
            "spit",
            LayerMask::ENEMY_SHOT,
            LayerMask::PLAYER
                .union(LayerMask::PANEL)
                .union(LayerMask::PLAYER_SHOT),
            SPIT_SPEED,
            3.0,
        ),
    ]
}
