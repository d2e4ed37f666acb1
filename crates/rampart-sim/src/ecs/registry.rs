//! Entity registry: lifecycle, tag cache and standing queries.
//!
//! The registry owns every live entity, the component store (and through it
//! the transform store), a tag → entity-set cache, and the standing queries.
//! Tag sets and query results are maintained incrementally: creation,
//! destruction and [`Registry::update_cache`] adjust only the entity
//! concerned, and reads never rescan.

use std::collections::HashMap;

use glam::Vec2;
use tracing::debug;

use rampart_core::components::{ComponentInit, Transform};
use rampart_core::enums::{ComponentKind, Tag};
use rampart_core::{EcsError, EcsResult, EntityId};

use super::entity::{Entity, EntityAllocator};
use super::query::{QueryDef, QueryId, StandingQuery};
use super::set::EntitySet;
use super::store::ComponentStore;
use super::transform::TransformStore;
use crate::pool::{Pool, PoolStats};

/// Returned by `get_by_tag` for tags no entity has carried yet.
static EMPTY_SET: EntitySet = EntitySet::new();

pub struct Registry {
    allocator: EntityAllocator,
    /// Live entities, indexed by `EntityId::index`.
    entities: Vec<Option<Entity>>,
    live: EntitySet,
    entity_pool: Pool<Entity>,
    store: ComponentStore,
    tag_cache: HashMap<Tag, EntitySet>,
    queries: Vec<StandingQuery>,
    query_index: HashMap<String, QueryId>,
}

impl Registry {
    /// A registry with every component builder registered.
    pub fn new(max_entities: usize) -> Self {
        Self::with_store(ComponentStore::with_defaults(max_entities))
    }

    pub fn with_store(store: ComponentStore) -> Self {
        Self {
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            live: EntitySet::new(),
            entity_pool: Pool::new(Entity::blank),
            store,
            tag_cache: HashMap::new(),
            queries: Vec::new(),
            query_index: HashMap::new(),
        }
    }

    // --- Lifecycle ---

    /// Create an empty entity and index it as live.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        let mut entity = self.entity_pool.acquire();
        entity.activate(id);

        let index = id.index as usize;
        if index >= self.entities.len() {
            self.entities.resize_with(index + 1, || None);
        }
        self.entities[index] = Some(entity);
        self.live.insert(id);
        self.update_cache(id);
        id
    }

    /// Create an entity with `tags` and one component per initialiser.
    ///
    /// If any component fails to build, the partly built entity is destroyed
    /// and the error returned.
    pub fn spawn(&mut self, tags: &[Tag], inits: &[ComponentInit]) -> EcsResult<EntityId> {
        let id = self.create_entity();
        if let Err(err) = self.populate(id, tags, inits) {
            self.destroy_entity(id);
            return Err(err);
        }
        self.update_cache(id);
        Ok(id)
    }

    fn populate(&mut self, id: EntityId, tags: &[Tag], inits: &[ComponentInit]) -> EcsResult<()> {
        for init in inits {
            self.insert_component(id, init)?;
        }
        let entity = self.entity_mut(id).ok_or(EcsError::DeadEntity(id))?;
        for tag in tags {
            entity.insert_tag(*tag);
        }
        Ok(())
    }

    /// Destroy an entity, returning its components and record to their pools.
    ///
    /// Returns false (and does nothing) if `id` is not live.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let Some(mut entity) = self.entities[id.index as usize].take() else {
            return false;
        };

        self.live.remove(id);
        for tag in entity.tags().iter() {
            if let Some(set) = self.tag_cache.get_mut(&tag) {
                set.remove(id);
            }
        }
        for query in &mut self.queries {
            query.results.remove(id);
        }
        for component in entity.drain() {
            self.store.release(component);
        }
        entity.deactivate();
        self.entity_pool.release(entity);
        self.allocator.deallocate(id);
        true
    }

    /// Destroy every live entity and restart id allocation.
    ///
    /// Standing queries stay registered with empty results.
    pub fn clear(&mut self) {
        let count = self.live.len();
        while let Some(id) = self.live.as_slice().last().copied() {
            if !self.destroy_entity(id) {
                self.live.remove(id);
            }
        }
        self.allocator.clear();
        self.store.transforms_mut().clear();
        for set in self.tag_cache.values_mut() {
            set.clear();
        }
        debug!(count, "registry cleared");
    }

    // --- Lookups ---

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(id.index as usize)?
            .as_ref()
            .filter(|e| e.id() == id && e.is_active())
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities
            .get_mut(id.index as usize)?
            .as_mut()
            .filter(|e| e.id() == id && e.is_active())
    }

    /// Mutable entity plus the transform store, borrowed together.
    pub fn split_mut(&mut self, id: EntityId) -> Option<(&mut Entity, &mut TransformStore)> {
        let entity = self
            .entities
            .get_mut(id.index as usize)?
            .as_mut()
            .filter(|e| e.id() == id && e.is_active())?;
        Some((entity, self.store.transforms_mut()))
    }

    /// Every live entity.
    pub fn get_all(&self) -> &EntitySet {
        &self.live
    }

    /// Live entities carrying `tag`; a shared empty set if none ever have.
    pub fn get_by_tag(&self, tag: Tag) -> &EntitySet {
        self.tag_cache.get(&tag).unwrap_or(&EMPTY_SET)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// World position of an entity's transform.
    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        let transform = self.get_entity(id)?.get::<Transform>()?;
        self.store.transforms().position(transform.slot)
    }

    pub fn set_position(&mut self, id: EntityId, position: Vec2) {
        if let Some((entity, transforms)) = self.split_mut(id) {
            if let Some(transform) = entity.get::<Transform>() {
                transforms.set_position(transform.slot, position);
            }
        }
    }

    // --- Structural mutation ---

    /// Build and attach a component, replacing any of the same kind, then
    /// refresh the entity's cache entries.
    pub fn add_component(&mut self, id: EntityId, init: &ComponentInit) -> EcsResult<()> {
        self.insert_component(id, init)?;
        self.update_cache(id);
        Ok(())
    }

    /// Build and attach a component without touching the caches.
    ///
    /// For batching several structural changes; the caller must follow up
    /// with [`update_cache`](Self::update_cache).
    pub fn insert_component(&mut self, id: EntityId, init: &ComponentInit) -> EcsResult<()> {
        if !self.is_alive(id) {
            return Err(EcsError::DeadEntity(id));
        }
        let component = self.store.build(init)?;
        let replaced = match self.entity_mut(id) {
            Some(entity) => entity.insert(component),
            None => Some(component),
        };
        if let Some(old) = replaced {
            self.store.release(old);
        }
        Ok(())
    }

    /// Detach and release a component, then refresh the entity's cache
    /// entries. Returns false if it was absent.
    pub fn remove_component(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        let Some(component) = self.entity_mut(id).and_then(|e| e.take(kind)) else {
            return false;
        };
        self.store.release(component);
        self.update_cache(id);
        true
    }

    pub fn add_tag(&mut self, id: EntityId, tag: Tag) -> bool {
        let added = self.entity_mut(id).is_some_and(|e| e.insert_tag(tag));
        if added {
            self.update_cache(id);
        }
        added
    }

    pub fn remove_tag(&mut self, id: EntityId, tag: Tag) -> bool {
        let removed = self.entity_mut(id).is_some_and(|e| e.remove_tag(tag));
        if removed {
            self.update_cache(id);
        }
        removed
    }

    /// Re-evaluate tag-cache and standing-query membership for one entity.
    ///
    /// Must follow any structural change made directly through
    /// [`entity_mut`](Self::entity_mut); until it runs, tag lookups and
    /// query results still reflect the entity's previous shape.
    pub fn update_cache(&mut self, id: EntityId) {
        let Some(entity) = self.get_entity(id) else {
            return;
        };
        let tags = entity.tags();
        let mask = entity.mask();

        for tag in Tag::ALL {
            if tags.contains(tag) {
                self.tag_cache.entry(tag).or_default().insert(id);
            } else if let Some(set) = self.tag_cache.get_mut(&tag) {
                set.remove(id);
            }
        }
        for query in &mut self.queries {
            if query.filter.matches(mask) {
                query.results.insert(id);
            } else {
                query.results.remove(id);
            }
        }
    }

    // --- Standing queries ---

    /// Register a standing query, or find the one with the same canonical
    /// signature. A new query is populated once from the live entities.
    pub fn register_query(&mut self, def: &QueryDef) -> QueryId {
        let signature = def.signature();
        if let Some(id) = self.query_index.get(&signature) {
            return *id;
        }

        let filter = def.filter();
        let mut results = EntitySet::new();
        for id in self.live.iter() {
            if let Some(entity) = self.get_entity(id) {
                if filter.matches(entity.mask()) {
                    results.insert(id);
                }
            }
        }

        let id = QueryId(self.queries.len() as u32);
        debug!(%signature, matched = results.len(), "standing query registered");
        self.queries.push(StandingQuery {
            signature: signature.clone(),
            filter,
            results,
        });
        self.query_index.insert(signature, id);
        id
    }

    /// Result set for `def`, registering the query on first use.
    pub fn query(&mut self, def: &QueryDef) -> &EntitySet {
        let id = self.register_query(def);
        self.query_result(id)
    }

    pub fn query_result(&self, id: QueryId) -> &EntitySet {
        self.queries
            .get(id.0 as usize)
            .map(|q| &q.results)
            .unwrap_or(&EMPTY_SET)
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    pub fn query_signature(&self, id: QueryId) -> Option<&str> {
        self.queries.get(id.0 as usize).map(|q| q.signature.as_str())
    }

    // --- Storage access ---

    pub fn store(&self) -> &ComponentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ComponentStore {
        &mut self.store
    }

    pub fn transforms(&self) -> &TransformStore {
        self.store.transforms()
    }

    pub fn entity_pool_stats(&self) -> PoolStats {
        self.entity_pool.stats()
    }
}
