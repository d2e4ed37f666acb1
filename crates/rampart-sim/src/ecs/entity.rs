//! Entity handles and the pooled entity record.

use rampart_core::components::{Component, ComponentData};
use rampart_core::enums::{ComponentKind, Tag};
use rampart_core::types::{ComponentMask, TagSet};
use rampart_core::{EcsError, EcsResult, EntityId};

/// Issues entity ids from a free list of recycled indices.
///
/// Every deallocation bumps the index's generation, so an id stays dead
/// until the allocator reissues its index under a new generation.
#[derive(Debug, Clone, Default)]
pub struct EntityAllocator {
    generations: Vec<u32>,
    free_indices: Vec<u32>,
    next_index: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> EntityId {
        if let Some(index) = self.free_indices.pop() {
            let generation = self.generations[index as usize];
            EntityId::new(index, generation)
        } else {
            let index = self.next_index;
            self.next_index += 1;
            self.generations.push(0);
            EntityId::new(index, 0)
        }
    }

    /// Free `id`. Stale or unknown ids are ignored.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.generations[id.index as usize] = id.generation.wrapping_add(1);
        self.free_indices.push(id.index);
        true
    }

    /// True for an issued id that has not been deallocated.
    pub fn is_alive(&self, id: EntityId) -> bool {
        (id.index as usize) < self.generations.len()
            && self.generations[id.index as usize] == id.generation
    }

    /// Kill every id and return to the initial allocation order (index 0 first).
    ///
    /// Generations advance rather than reset, so ids issued before the clear
    /// never resolve again.
    pub fn clear(&mut self) {
        for generation in &mut self.generations {
            *generation = generation.wrapping_add(1);
        }
        self.free_indices.clear();
        self.free_indices.extend((0..self.next_index).rev());
    }

    pub fn live_count(&self) -> usize {
        self.next_index as usize - self.free_indices.len()
    }
}

/// An entity: identity, tags, and at most one component per kind.
///
/// Entities are pooled by the registry and never constructed directly.
/// Structural changes (components, tags) made after creation are invisible
/// to tag lookups and standing queries until
/// [`Registry::update_cache`](super::Registry::update_cache) runs for the entity.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    active: bool,
    tags: TagSet,
    mask: ComponentMask,
    slots: [Option<Component>; ComponentKind::COUNT],
}

impl Entity {
    /// Pool factory: an inactive entity with no components.
    pub(crate) fn blank() -> Self {
        Self {
            id: EntityId::DANGLING,
            active: false,
            tags: TagSet::EMPTY,
            mask: ComponentMask::EMPTY,
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Bring a pooled entity back to life under `id`.
    pub(crate) fn activate(&mut self, id: EntityId) {
        debug_assert!(self.mask.is_empty(), "pooled entity still holds components");
        self.id = id;
        self.active = true;
        self.tags.clear();
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.tags.clear();
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tags(&self) -> TagSet {
        self.tags
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Add a tag. Call `update_cache` afterwards.
    pub fn insert_tag(&mut self, tag: Tag) -> bool {
        self.tags.insert(tag)
    }

    /// Remove a tag. Call `update_cache` afterwards.
    pub fn remove_tag(&mut self, tag: Tag) -> bool {
        self.tags.remove(tag)
    }

    pub fn mask(&self) -> ComponentMask {
        self.mask
    }

    pub fn has(&self, kind: ComponentKind) -> bool {
        self.mask.contains(kind)
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots[kind.index()].as_ref()
    }

    pub fn get<T: ComponentData>(&self) -> Option<&T> {
        self.slots[T::KIND.index()]
            .as_ref()
            .and_then(T::from_component)
    }

    pub fn get_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        self.slots[T::KIND.index()]
            .as_mut()
            .and_then(T::from_component_mut)
    }

    /// Like [`get`](Self::get), but a missing component is a wiring fault.
    pub fn require<T: ComponentData>(&self) -> EcsResult<&T> {
        let id = self.id;
        self.get::<T>().ok_or(EcsError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    pub fn require_mut<T: ComponentData>(&mut self) -> EcsResult<&mut T> {
        let id = self.id;
        self.get_mut::<T>().ok_or(EcsError::MissingComponent {
            entity: id,
            kind: T::KIND,
        })
    }

    /// Store `component`, handing back whatever it replaced.
    pub(crate) fn insert(&mut self, component: Component) -> Option<Component> {
        let kind = component.kind();
        self.mask = self.mask.with(kind);
        self.slots[kind.index()].replace(component)
    }

    pub(crate) fn take(&mut self, kind: ComponentKind) -> Option<Component> {
        self.mask = self.mask.without(kind);
        self.slots[kind.index()].take()
    }

    /// Remove every component, in kind order.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Component> + '_ {
        self.mask = ComponentMask::EMPTY;
        self.slots.iter_mut().filter_map(Option::take)
    }
}
