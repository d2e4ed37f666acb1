//! The owning simulation world handed to every system.
//!
//! Systems take `&mut World` and touch only its fields; there is no ambient
//! state. Standing queries used by the systems are registered once here.

use glam::Vec2;

use rampart_ai::ProjectileRequest;
use rampart_core::constants::QUERY_BUFFER_CAPACITY;
use rampart_core::enums::{ComponentKind, Tag};
use rampart_core::types::{SimTime, UpgradeTable};
use rampart_core::EntityId;

use crate::bus::EventBus;
use crate::config::SimConfig;
use crate::ecs::{QueryDef, QueryId, Registry};
use crate::error::SimResult;
use crate::spatial::SpatialGrid;

/// Standing queries the per-frame systems iterate.
#[derive(Debug, Clone, Copy)]
pub struct SystemQueries {
    /// Transform + Motion.
    pub movers: QueryId,
    /// Transform + Collider.
    pub colliders: QueryId,
    /// Transform + Motion + Behavior.
    pub behaviors: QueryId,
    pub lifetimes: QueryId,
    /// Transform + Combat, excluding AI-driven entities and projectiles.
    pub shooters: QueryId,
    /// Transform + RenderTransform.
    pub renderables: QueryId,
    /// Transform plus either Projectile or Behavior; removed when they leave the arena.
    pub strays: QueryId,
}

impl SystemQueries {
    fn register(registry: &mut Registry) -> Self {
        use ComponentKind::*;
        Self {
            movers: registry.register_query(&QueryDef::new().all(&[Transform, Motion])),
            colliders: registry.register_query(&QueryDef::new().all(&[Transform, Collider])),
            behaviors: registry
                .register_query(&QueryDef::new().all(&[Transform, Motion, Behavior])),
            lifetimes: registry.register_query(&QueryDef::new().all(&[Lifetime])),
            shooters: registry.register_query(
                &QueryDef::new()
                    .all(&[Transform, Combat])
                    .none(&[Behavior, Projectile]),
            ),
            renderables: registry
                .register_query(&QueryDef::new().all(&[Transform, RenderTransform])),
            strays: registry.register_query(
                &QueryDef::new()
                    .all(&[Transform])
                    .any(&[Projectile, Behavior]),
            ),
        }
    }
}

pub struct World {
    pub registry: Registry,
    pub grid: SpatialGrid,
    pub bus: EventBus,
    pub time: SimTime,
    pub upgrades: UpgradeTable,
    pub queries: SystemQueries,
    /// Half-extents of the playfield.
    pub arena: Vec2,
    /// Projectiles requested this frame, spawned after collision resolution.
    pub spawns: Vec<ProjectileRequest>,
    /// Reusable id buffer for iterating a query while mutating the registry.
    pub(crate) scratch: Vec<EntityId>,
    /// Reusable broad-phase output buffer.
    pub(crate) neighbors: Box<[EntityId]>,
}

impl World {
    pub fn new(config: &SimConfig) -> SimResult<Self> {
        let mut registry = Registry::new(config.max_entities);
        let queries = SystemQueries::register(&mut registry);
        Ok(Self {
            registry,
            grid: SpatialGrid::new(config.cell_size, config.grid_table_size, config.max_entities)?,
            bus: EventBus::new(config.fast_capacity)?,
            time: SimTime::default(),
            upgrades: config.upgrades.clone(),
            queries,
            arena: Vec2::new(config.arena_half_width, config.arena_half_height),
            spawns: Vec::new(),
            scratch: Vec::with_capacity(config.max_entities),
            neighbors: vec![EntityId::DANGLING; QUERY_BUFFER_CAPACITY].into_boxed_slice(),
        })
    }

    /// Copy a standing query's current members into a reusable buffer.
    ///
    /// The buffer is taken out of the world so the caller can mutate the
    /// registry while iterating; hand it back with [`World::restore_scratch`].
    pub(crate) fn snapshot_ids(&mut self, query: QueryId) -> Vec<EntityId> {
        let mut ids = std::mem::take(&mut self.scratch);
        ids.clear();
        ids.extend_from_slice(self.registry.query_result(query).as_slice());
        ids
    }

    pub(crate) fn restore_scratch(&mut self, ids: Vec<EntityId>) {
        self.scratch = ids;
    }

    /// The first live entity tagged `Player`, with its position.
    pub fn player(&self) -> Option<(EntityId, Vec2)> {
        player(&self.registry)
    }

    /// Closest live panel to `from`; ties go to the earlier panel in tag order.
    pub fn nearest_panel(&self, from: Vec2) -> Option<(EntityId, Vec2)> {
        nearest_panel(&self.registry, from)
    }
}

pub(crate) fn nearest_panel(registry: &Registry, from: Vec2) -> Option<(EntityId, Vec2)> {
    let mut best: Option<(EntityId, Vec2, f32)> = None;
    for id in registry.get_by_tag(Tag::Obstacle) {
        let Some(pos) = registry.position(id) else {
            continue;
        };
        let d = pos.distance_squared(from);
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((id, pos, d));
        }
    }
    best.map(|(id, pos, _)| (id, pos))
}

pub(crate) fn player(registry: &Registry) -> Option<(EntityId, Vec2)> {
    let id = registry.get_by_tag(Tag::Player).iter().next()?;
    Some((id, registry.position(id)?))
}
