//! Enemy behavior for RAMPART.
//!
//! Per-archetype state machines written as pure routines over a copied-in
//! [`Subject`] and a narrow [`BehaviorContext`]. No registry dependency: the
//! simulation copies each entity's data in, runs the routine, and writes the
//! result back.

pub mod context;
pub mod profiles;
pub mod routines;
pub mod steering;

pub use context::{BehaviorContext, ProjectileRequest, Subject};
pub use rampart_core as core;
pub use routines::{routine_for, Routine};

#[cfg(test)]
mod tests;
