//! Snapshot system: builds a [`FrameSnapshot`] from registry state.
//!
//! This system is read-only; it never modifies the world.

use serde::Serialize;

use rampart_core::components::*;
use rampart_core::enums::{GamePhase, ModelKind};
use rampart_core::EntityId;

use super::session::SessionState;
use crate::world::World;

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub elapsed: f32,
    pub phase: GamePhase,
    pub wave: u32,
    pub score: u32,
    pub integrity: f32,
    /// One entry per renderable entity, ordered by entity index.
    pub items: Vec<RenderItem>,
}

/// Render-facing view of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderItem {
    pub id: EntityId,
    pub archetype: String,
    pub model: ModelKind,
    pub color: [f32; 3],
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
    pub spawn_progress: f32,
    pub flash: f32,
    pub glow: f32,
    /// Health fraction for entities that carry health.
    pub health: Option<f32>,
}

/// Build a snapshot of the current world state.
pub fn build_snapshot(world: &World, session: &SessionState) -> FrameSnapshot {
    FrameSnapshot {
        frame: world.time.frame,
        elapsed: world.time.elapsed,
        phase: session.phase,
        wave: session.wave,
        score: session.score,
        integrity: session.integrity,
        items: build_items(world),
    }
}

fn build_items(world: &World) -> Vec<RenderItem> {
    let registry = &world.registry;
    let mut items: Vec<RenderItem> = registry
        .query_result(world.queries.renderables)
        .iter()
        .filter_map(|id| {
            let entity = registry.get_entity(id)?;
            let render = entity.get::<RenderTransform>()?;
            let model = entity.get::<RenderModel>().copied().unwrap_or_default();
            let effect = entity.get::<RenderEffect>().copied().unwrap_or_default();
            Some(RenderItem {
                id,
                archetype: entity
                    .get::<Identity>()
                    .map(|i| i.archetype.clone())
                    .unwrap_or_default(),
                model: model.model,
                color: model.color,
                x: render.position.x,
                y: render.position.y,
                rotation: render.rotation,
                scale: render.scale,
                spawn_progress: render.spawn_progress,
                flash: effect.flash,
                glow: effect.glow,
                health: entity.get::<Health>().map(Health::fraction),
            })
        })
        .collect();
    items.sort_by_key(|item| item.id.index);
    items
}
