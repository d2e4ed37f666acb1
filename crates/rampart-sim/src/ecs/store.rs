//! Component store: per-kind factory, pool and reset routine.
//!
//! Every component instance is produced by [`ComponentStore::build`], which
//! takes an instance from the kind's pool (constructing a batch if the pool
//! is dry) and runs the kind's reset routine over it with the supplied
//! initial data. Reset routines overwrite every field, so nothing from the
//! instance's previous owner survives reuse.

use rampart_ai::profiles::get_profile;
use rampart_core::components::*;
use rampart_core::enums::{AiState, ComponentKind};
use rampart_core::{EcsError, EcsResult};

use super::transform::TransformStore;
use crate::pool::{Pool, PoolStats};

/// Reset routine: overwrite `component` from `init`.
pub type ResetFn = fn(&mut Component, &ComponentInit, &mut TransformStore) -> EcsResult<()>;

/// Constructor and reset routine for one component kind.
#[derive(Clone, Copy)]
pub struct ComponentBuilder {
    pub kind: ComponentKind,
    pub factory: fn() -> Component,
    pub reset: ResetFn,
}

impl ComponentBuilder {
    /// Builder for a component type implementing [`Reset`].
    pub fn of<T: Reset>() -> Self {
        Self {
            kind: T::KIND,
            factory: construct::<T>,
            reset: reset_as::<T>,
        }
    }

    /// Builder for every kind, selected by exhaustive match.
    pub fn for_kind(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Transform => Self::of::<Transform>(),
            ComponentKind::Motion => Self::of::<Motion>(),
            ComponentKind::Health => Self::of::<Health>(),
            ComponentKind::Combat => Self::of::<CombatStats>(),
            ComponentKind::Collider => Self::of::<Collider>(),
            ComponentKind::Behavior => Self::of::<BehaviorState>(),
            ComponentKind::Target => Self::of::<TargetRef>(),
            ComponentKind::Orbit => Self::of::<Orbit>(),
            ComponentKind::Lifetime => Self::of::<Lifetime>(),
            ComponentKind::Identity => Self::of::<Identity>(),
            ComponentKind::Projectile => Self::of::<ProjectileState>(),
            ComponentKind::RenderModel => Self::of::<RenderModel>(),
            ComponentKind::RenderTransform => Self::of::<RenderTransform>(),
            ComponentKind::RenderEffect => Self::of::<RenderEffect>(),
        }
    }
}

impl std::fmt::Debug for ComponentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentBuilder")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Overwrite a pooled component from its initial data.
///
/// Implementations must assign every field: a reused instance arrives
/// holding whatever its previous owner left behind.
pub trait Reset: ComponentData + Default {
    fn reset(&mut self, init: &Self::Init, transforms: &mut TransformStore) -> EcsResult<()>;
}

fn construct<T: Reset>() -> Component {
    T::default().into_component()
}

fn reset_as<T: Reset>(
    component: &mut Component,
    init: &ComponentInit,
    transforms: &mut TransformStore,
) -> EcsResult<()> {
    let found = init.kind();
    let Some(init) = T::init_of(init) else {
        return Err(EcsError::InitMismatch {
            expected: T::KIND,
            found,
        });
    };
    let found = component.kind();
    let Some(value) = T::from_component_mut(component) else {
        return Err(EcsError::InitMismatch {
            expected: T::KIND,
            found,
        });
    };
    value.reset(init, transforms)
}

struct Entry {
    builder: ComponentBuilder,
    pool: Pool<Component>,
}

pub struct ComponentStore {
    entries: [Option<Entry>; ComponentKind::COUNT],
    transforms: TransformStore,
}

impl ComponentStore {
    /// A store with no builders registered.
    pub fn empty(transform_capacity: usize) -> Self {
        Self {
            entries: std::array::from_fn(|_| None),
            transforms: TransformStore::new(transform_capacity),
        }
    }

    /// A store with a builder for every component kind.
    pub fn with_defaults(transform_capacity: usize) -> Self {
        let mut store = Self::empty(transform_capacity);
        for kind in ComponentKind::ALL {
            store.register(ComponentBuilder::for_kind(kind));
        }
        store
    }

    /// Register (or replace) the builder for `builder.kind`.
    pub fn register(&mut self, builder: ComponentBuilder) {
        self.entries[builder.kind.index()] = Some(Entry {
            builder,
            pool: Pool::new(builder.factory),
        });
    }

    pub fn is_registered(&self, kind: ComponentKind) -> bool {
        self.entries[kind.index()].is_some()
    }

    /// Build a component from initial data.
    ///
    /// Fails with `UnregisteredComponent` if no builder exists for the kind;
    /// that is a startup wiring fault, not a steady-state condition.
    pub fn build(&mut self, init: &ComponentInit) -> EcsResult<Component> {
        let kind = init.kind();
        let Some(entry) = self.entries[kind.index()].as_mut() else {
            return Err(EcsError::UnregisteredComponent(kind));
        };
        let mut component = entry.pool.acquire();
        match (entry.builder.reset)(&mut component, init, &mut self.transforms) {
            Ok(()) => Ok(component),
            Err(err) => {
                self.release(component);
                Err(err)
            }
        }
    }

    /// Return a component to its pool. A transform gives its slot back first.
    pub fn release(&mut self, mut component: Component) {
        if let Component::Transform(transform) = &mut component {
            if transform.slot != Transform::UNALLOCATED {
                self.transforms.free(transform.slot);
                transform.slot = Transform::UNALLOCATED;
            }
        }
        if let Some(entry) = self.entries[component.kind().index()].as_mut() {
            entry.pool.release(component);
        }
    }

    pub fn pool_stats(&self, kind: ComponentKind) -> Option<PoolStats> {
        self.entries[kind.index()].as_ref().map(|e| e.pool.stats())
    }

    pub fn transforms(&self) -> &TransformStore {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut TransformStore {
        &mut self.transforms
    }
}

// --- Reset routines ---

impl Reset for Transform {
    fn reset(&mut self, init: &TransformInit, transforms: &mut TransformStore) -> EcsResult<()> {
        if self.slot == Transform::UNALLOCATED {
            self.slot = transforms.allocate()?;
        }
        transforms.set(
            self.slot,
            glam::Vec2::new(init.x, init.y),
            init.rotation,
            init.scale,
        );
        Ok(())
    }
}

impl Reset for Motion {
    fn reset(&mut self, init: &Motion, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for Health {
    fn reset(&mut self, init: &HealthInit, _: &mut TransformStore) -> EcsResult<()> {
        *self = Health {
            current: init.max,
            max: init.max,
            shield: init.shield,
            max_shield: init.shield,
            shield_active: init.shield_active && init.shield > 0.0,
        };
        Ok(())
    }
}

impl Reset for CombatStats {
    fn reset(&mut self, init: &CombatStats, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for Collider {
    fn reset(&mut self, init: &Collider, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for BehaviorState {
    fn reset(&mut self, init: &BehaviorInit, _: &mut TransformStore) -> EcsResult<()> {
        self.kind = init.kind;
        self.timers.clear();
        self.scratch = Scratch::Empty;
        let secs = match init.state {
            AiState::Spawn => get_profile(init.kind).spawn_secs,
            _ => 0.0,
        };
        self.enter(init.state, secs);
        Ok(())
    }
}

impl Reset for TargetRef {
    fn reset(&mut self, init: &TargetRef, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for Orbit {
    fn reset(&mut self, init: &Orbit, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for Lifetime {
    fn reset(&mut self, init: &Lifetime, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for Identity {
    fn reset(&mut self, init: &Identity, _: &mut TransformStore) -> EcsResult<()> {
        // Reuse the pooled string's allocation.
        self.archetype.clone_from(&init.archetype);
        self.variant = init.variant;
        self.theme = init.theme;
        self.bounty = init.bounty;
        Ok(())
    }
}

impl Reset for ProjectileState {
    fn reset(&mut self, init: &ProjectileState, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for RenderModel {
    fn reset(&mut self, init: &RenderModel, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for RenderTransform {
    fn reset(&mut self, init: &RenderTransform, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}

impl Reset for RenderEffect {
    fn reset(&mut self, init: &RenderEffect, _: &mut TransformStore) -> EcsResult<()> {
        *self = *init;
        Ok(())
    }
}
