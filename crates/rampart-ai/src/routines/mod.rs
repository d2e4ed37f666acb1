//! Per-archetype behavior routines.
//!
//! Each routine runs one tick of its archetype's state machine. Transitions
//! happen synchronously inside the call; the state timer armed by
//! [`BehaviorState::enter`](rampart_core::components::BehaviorState::enter) is
//! counted down by the simulation before dispatch.

pub mod charger;
pub mod drifter;
pub mod orbiter;
pub mod spinner;
pub mod warden;

use rampart_core::enums::{AiState, BehaviorKind, TimerKey};

use crate::context::{BehaviorContext, Subject};
use crate::steering::brake;

/// One tick of a behavior state machine.
pub type Routine = fn(&mut Subject, &mut dyn BehaviorContext);

/// Routine for a behavior kind. Exhaustive, so every kind has one.
pub fn routine_for(kind: BehaviorKind) -> Routine {
    match kind {
        BehaviorKind::Drifter => drifter::update,
        BehaviorKind::Orbiter => orbiter::update,
        BehaviorKind::Charger => charger::update,
        BehaviorKind::Spinner => spinner::update,
        BehaviorKind::Warden => warden::update,
    }
}

/// Shared `Spawn` handling: hold still until the state timer (armed with the
/// profile's `spawn_secs` when the behavior state is built) runs out, then
/// move on to `next`. Returns true while still spawning.
pub(crate) fn hold_spawn(subject: &mut Subject, next: AiState, next_secs: f32, dt: f32) -> bool {
    if subject.state.state != AiState::Spawn {
        return false;
    }
    brake(subject, dt);
    if subject.state.timers.running(TimerKey::State) {
        return true;
    }
    subject.state.enter(next, next_secs);
    false
}

/// True once the state timer has run out.
pub(crate) fn state_expired(subject: &Subject) -> bool {
    !subject.state.timers.running(TimerKey::State)
}
