//! Drifter: walk to the nearest panel, lunge, back off, repeat.
//!
//! Spawn → Move → Attack → Cooldown → Move.

use rampart_core::enums::{AiState, BehaviorKind};

use crate::context::{BehaviorContext, Subject};
use crate::profiles::get_profile;
use crate::steering::{brake, cruise_speed, face, panel_target, steer_toward, steer_velocity};

pub fn update(subject: &mut Subject, ctx: &mut dyn BehaviorContext) {
    let profile = get_profile(BehaviorKind::Drifter);
    let dt = ctx.delta();
    if super::hold_spawn(subject, AiState::Move, 0.0, dt) {
        return;
    }

    let speed = cruise_speed(subject, ctx);
    match subject.state.state {
        AiState::Move => {
            let Some(target) = panel_target(subject, ctx) else {
                brake(subject, dt);
                return;
            };
            let to_target = target - subject.position;
            steer_toward(subject, target, speed, dt);
            face(subject, to_target);
            if to_target.length() <= profile.engage_range {
                subject.state.enter(AiState::Attack, profile.active_secs);
            }
        }
        AiState::Attack => {
            // Lunge through the target; contact damage is resolved by combat.
            match panel_target(subject, ctx) {
                Some(target) => {
                    let dir = (target - subject.position).normalize_or_zero();
                    steer_velocity(subject, dir * speed * 1.5, dt);
                }
                None => brake(subject, dt),
            }
            if super::state_expired(subject) {
                subject.state.enter(AiState::Cooldown, profile.cooldown_secs);
            }
        }
        AiState::Cooldown => {
            match panel_target(subject, ctx) {
                Some(target) => {
                    let away = (subject.position - target).normalize_or_zero();
                    steer_velocity(subject, away * speed * 0.5, dt);
                }
                None => brake(subject, dt),
            }
            if super::state_expired(subject) {
                subject.state.enter(AiState::Move, 0.0);
            }
        }
        _ => subject.state.enter(AiState::Move, 0.0),
    }
}
