//! Entity/component storage.
//!
//! Pooled entities and components, the structure-of-arrays transform store,
//! and the registry that keeps tag and standing-query caches in step with
//! entity structure.

pub mod entity;
pub mod query;
pub mod registry;
pub mod set;
pub mod store;
pub mod transform;

pub use entity::{Entity, EntityAllocator};
pub use query::{QueryDef, QueryFilter, QueryId};
pub use registry::Registry;
pub use set::EntitySet;
pub use store::{ComponentBuilder, ComponentStore, Reset};
pub use transform::TransformStore;
