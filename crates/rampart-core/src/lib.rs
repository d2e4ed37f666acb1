//! Core types and definitions for the RAMPART simulation.
//!
//! This crate defines the vocabulary shared across the other crates:
//! component data, closed enumerations, signals and fast-channel records,
//! tuning constants, and the error taxonomy. It contains no engine logic.

pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod types;

pub use error::{EcsError, EcsResult};
pub use types::EntityId;
