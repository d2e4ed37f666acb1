//! Warden: the shielded boss.
//!
//! Spawn → Charge → Ready → Fire → Cooldown → Charge. The shield is up while
//! charging and dropped for the telegraph and volley, so the warden is only
//! vulnerable to health damage in that window (or once the shield is spent).

use glam::Vec2;

use rampart_core::components::Scratch;
use rampart_core::constants::SPIT_SPEED;
use rampart_core::enums::{AiState, BehaviorKind, TimerKey};
use rampart_core::events::{EffectKind, SoundKey};

use crate::context::{BehaviorContext, ProjectileRequest, Subject};
use crate::profiles::get_profile;
use crate::steering::{brake, cruise_speed, face, pan_of, player_target, steer_toward};

pub fn update(subject: &mut Subject, ctx: &mut dyn BehaviorContext) {
    let profile = get_profile(BehaviorKind::Warden);
    let dt = ctx.delta();
    if super::hold_spawn(subject, AiState::Charge, profile.windup_secs, dt) {
        return;
    }

    let target = player_target(subject, ctx);
    let aim = target
        .map(|t| (t - subject.position).normalize_or_zero())
        .unwrap_or(Vec2::ZERO);
    face(subject, aim);

    match subject.state.state {
        AiState::Charge => {
            set_shield(subject, true);
            let charge = match subject.state.scratch {
                Scratch::Volley { charge, .. } => charge,
                _ => 0.0,
            };
            subject.state.scratch = Scratch::Volley {
                charge: (charge + dt / profile.windup_secs).min(1.0),
                shots_left: 0,
            };
            match target {
                Some(t) if t.distance(subject.position) > profile.engage_range => {
                    let speed = cruise_speed(subject, ctx);
                    steer_toward(subject, t, speed, dt);
                }
                _ => brake(subject, dt),
            }
            if super::state_expired(subject) {
                subject.state.enter(AiState::Ready, profile.active_secs);
                ctx.spawn_effect(EffectKind::Telegraph, subject.theme, subject.position, subject.rotation);
                ctx.play_sound(SoundKey::Charge, pan_of(subject.position.x));
            }
        }
        AiState::Ready => {
            set_shield(subject, false);
            brake(subject, dt);
            if super::state_expired(subject) {
                subject.state.scratch = Scratch::Volley {
                    charge: 0.0,
                    shots_left: profile.volley,
                };
                subject.state.timers.set(TimerKey::Fire, 0.0);
                subject.state.enter(AiState::Fire, 0.0);
                ctx.play_sound(SoundKey::Volley, pan_of(subject.position.x));
            }
        }
        AiState::Fire => {
            set_shield(subject, false);
            brake(subject, dt);
            let shots_left = match subject.state.scratch {
                Scratch::Volley { shots_left, .. } => shots_left,
                _ => 0,
            };
            if shots_left == 0 {
                subject.state.scratch = Scratch::Empty;
                subject.state.enter(AiState::Cooldown, profile.cooldown_secs);
                return;
            }
            if subject.state.timers.running(TimerKey::Fire) || aim == Vec2::ZERO {
                return;
            }
            let fired = profile.volley - shots_left;
            let dir = volley_direction(aim, fired, profile.volley, profile.spread);
            ctx.spawn_projectile(ProjectileRequest {
                archetype: "spit",
                origin: subject.position,
                velocity: dir * SPIT_SPEED,
                damage: subject.combat.damage,
                pierce: 1,
                owner: subject.id,
                target: None,
            });
            ctx.spawn_effect(EffectKind::Muzzle, subject.theme, subject.position, dir.y.atan2(dir.x));
            subject.state.scratch = Scratch::Volley {
                charge: 0.0,
                shots_left: shots_left - 1,
            };
            subject.state.timers.set(TimerKey::Fire, profile.fire_interval);
        }
        AiState::Cooldown => {
            brake(subject, dt);
            if super::state_expired(subject) {
                subject.state.enter(AiState::Charge, profile.windup_secs);
            }
        }
        _ => subject.state.enter(AiState::Charge, profile.windup_secs),
    }
}

/// Raise or drop the shield. Has no effect on a spent shield.
fn set_shield(subject: &mut Subject, up: bool) {
    if let Some(health) = subject.health.as_mut() {
        health.shield_active = up && health.shield > 0.0;
    }
}

/// Direction of shot `index` in a fan of `count` shots spanning `spread` radians.
pub(crate) fn volley_direction(aim: Vec2, index: u8, count: u8, spread: f32) -> Vec2 {
    if count <= 1 {
        return aim;
    }
    let t = index as f32 / (count - 1) as f32 - 0.5;
    Vec2::from_angle(t * spread).rotate(aim)
}
