//! Spinner: spins up and wobbles toward the turret.
//!
//! Spawn → Move. Spin velocity and wobble phase live in scratch; contact
//! damage is left to combat.

use glam::Vec2;

use rampart_core::components::Scratch;
use rampart_core::constants::{SPINNER_MAX_SPIN, SPINNER_SPIN_ACCEL, SPINNER_WOBBLE};
use rampart_core::enums::AiState;

use crate::context::{BehaviorContext, Subject};
use crate::steering::{brake, cruise_speed, player_target, steer_velocity};

pub fn update(subject: &mut Subject, ctx: &mut dyn BehaviorContext) {
    let dt = ctx.delta();
    if super::hold_spawn(subject, AiState::Move, 0.0, dt) {
        subject.state.scratch = Scratch::Spin {
            spin: 0.0,
            phase: 0.0,
        };
        return;
    }

    let (spin, phase) = match subject.state.scratch {
        Scratch::Spin { spin, phase } => (spin, phase),
        _ => (0.0, 0.0),
    };
    let spin = (spin + SPINNER_SPIN_ACCEL * dt).min(SPINNER_MAX_SPIN);
    let phase = phase + dt * 3.0;
    subject.state.scratch = Scratch::Spin { spin, phase };
    subject.angular = spin;

    let Some(target) = player_target(subject, ctx) else {
        brake(subject, dt);
        return;
    };
    let dir = (target - subject.position).normalize_or_zero();
    let wobble = Vec2::new(-dir.y, dir.x) * phase.sin() * SPINNER_WOBBLE;
    let speed = cruise_speed(subject, ctx) * (0.5 + 0.5 * spin / SPINNER_MAX_SPIN);
    steer_velocity(subject, (dir + wobble).normalize_or_zero() * speed, dt);
}
