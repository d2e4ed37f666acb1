//! Error types for entity/component configuration faults.
//!
//! Only configuration-class failures are errors. Absent optional components,
//! empty tag buckets and dangling targets are `Option`/empty results instead.

use thiserror::Error;

use crate::enums::ComponentKind;
use crate::types::EntityId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// `build` was called for a kind with no registered builder.
    #[error("no builder registered for component {0:?}")]
    UnregisteredComponent(ComponentKind),

    /// A system required a component the entity does not carry.
    #[error("entity {entity} has no {kind:?} component")]
    MissingComponent { entity: EntityId, kind: ComponentKind },

    /// A reset routine was handed initial data for a different kind.
    #[error("init data for {found:?} passed to {expected:?} builder")]
    InitMismatch {
        expected: ComponentKind,
        found: ComponentKind,
    },

    /// Every transform slot is in use.
    #[error("transform store full: capacity {capacity}")]
    TransformStoreFull { capacity: usize },

    /// A capacity that must be a power of two was not.
    #[error("{what} must be a power of two, got {value}")]
    NotPowerOfTwo { what: &'static str, value: usize },

    /// The entity handle does not resolve to a live entity.
    #[error("entity {0} is not alive")]
    DeadEntity(EntityId),
}

/// Result type for entity/component operations.
pub type EcsResult<T> = Result<T, EcsError>;
