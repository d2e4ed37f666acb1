//! Charger: wind up while locked on, then dash along the locked heading.
//!
//! Spawn → Move → Charge → Dash → Cooldown → Move. The target is cached in
//! scratch when the wind-up begins; if it disappears mid-charge the charger
//! abandons the attack.

use glam::Vec2;

use rampart_core::components::Scratch;
use rampart_core::constants::CHARGER_DASH_SPEED;
use rampart_core::enums::{AiState, BehaviorKind};
use rampart_core::events::{EffectKind, SoundKey};

use crate::context::{BehaviorContext, Subject};
use crate::profiles::get_profile;
use crate::steering::{brake, cruise_speed, face, pan_of, player_target, steer_toward};

pub fn update(subject: &mut Subject, ctx: &mut dyn BehaviorContext) {
    let profile = get_profile(BehaviorKind::Charger);
    let dt = ctx.delta();
    if super::hold_spawn(subject, AiState::Move, 0.0, dt) {
        return;
    }

    match subject.state.state {
        AiState::Move => {
            let Some(target) = player_target(subject, ctx) else {
                brake(subject, dt);
                return;
            };
            let to_target = target - subject.position;
            let speed = cruise_speed(subject, ctx);
            steer_toward(subject, target, speed, dt);
            face(subject, to_target);
            if to_target.length() <= profile.engage_range {
                subject.state.scratch = Scratch::Charge {
                    charge: 0.0,
                    target: subject.target,
                    heading: Vec2::ZERO,
                };
                subject.state.enter(AiState::Charge, profile.windup_secs);
                ctx.spawn_effect(EffectKind::Telegraph, subject.theme, subject.position, subject.rotation);
                ctx.play_sound(SoundKey::Charge, pan_of(subject.position.x));
            }
        }
        AiState::Charge => {
            brake(subject, dt);
            let Scratch::Charge { charge, target, .. } = subject.state.scratch else {
                subject.state.enter(AiState::Move, 0.0);
                return;
            };
            let Some(locked) = target.and_then(|id| ctx.locate(id)) else {
                subject.state.scratch = Scratch::Empty;
                subject.target = None;
                subject.state.enter(AiState::Cooldown, profile.cooldown_secs);
                return;
            };
            let heading = (locked - subject.position).normalize_or_zero();
            face(subject, heading);
            let charge = (charge + dt / profile.windup_secs.max(f32::EPSILON)).min(1.0);
            subject.state.scratch = Scratch::Charge {
                charge,
                target,
                heading,
            };
            if super::state_expired(subject) {
                subject.state.enter(AiState::Dash, profile.active_secs);
            }
        }
        AiState::Dash => {
            let heading = match subject.state.scratch {
                Scratch::Charge { heading, .. } => heading,
                _ => Vec2::ZERO,
            };
            subject.velocity = heading * CHARGER_DASH_SPEED;
            if super::state_expired(subject) {
                subject.state.scratch = Scratch::Empty;
                subject.state.enter(AiState::Cooldown, profile.cooldown_secs);
            }
        }
        AiState::Cooldown => {
            brake(subject, dt);
            if super::state_expired(subject) {
                subject.state.enter(AiState::Move, 0.0);
            }
        }
        _ => subject.state.enter(AiState::Move, 0.0),
    }
}
