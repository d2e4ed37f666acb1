//! Per-frame systems operating on the simulation world.
//!
//! Systems are plain functions taking `&mut World` (or `&World` when
//! read-only). They own no state between frames beyond what the caller
//! passes in; everything else lives in components.

pub mod behavior;
pub mod cleanup;
pub mod collision;
pub mod combat;
pub mod grid;
pub mod movement;
pub mod render_sync;
pub mod session;
pub mod snapshot;
pub mod timers;
pub mod waves;
pub mod weapon;
