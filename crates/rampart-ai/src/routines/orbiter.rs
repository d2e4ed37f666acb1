//! Orbiter: approach a panel, circle it, and spit at it.
//!
//! Spawn → Move → Attack (orbiting). Losing the panel drops the orbit and
//! returns to Move.

use glam::Vec2;

use rampart_core::components::Orbit;
use rampart_core::constants::{ORBITER_RADIUS, SPIT_SPEED};
use rampart_core::enums::{AiState, BehaviorKind, TimerKey};
use rampart_core::events::{EffectKind, SoundKey};

use crate::context::{BehaviorContext, ProjectileRequest, Subject};
use crate::profiles::get_profile;
use crate::steering::{brake, cruise_speed, face, pan_of, panel_target, steer_toward};

pub fn update(subject: &mut Subject, ctx: &mut dyn BehaviorContext) {
    let profile = get_profile(BehaviorKind::Orbiter);
    let dt = ctx.delta();
    if super::hold_spawn(subject, AiState::Move, 0.0, dt) {
        return;
    }

    match subject.state.state {
        AiState::Move => {
            subject.orbit = None;
            let Some(target) = panel_target(subject, ctx) else {
                brake(subject, dt);
                return;
            };
            let offset = subject.position - target;
            let speed = cruise_speed(subject, ctx);
            steer_toward(subject, target, speed, dt);
            face(subject, -offset);
            if offset.length() <= profile.engage_range * 1.1 {
                let radius = ORBITER_RADIUS;
                subject.orbit = Some(Orbit {
                    anchor: subject.target,
                    center: target,
                    radius,
                    angular_speed: speed / radius,
                    angle: offset.y.atan2(offset.x),
                });
                subject.velocity = Vec2::ZERO;
                subject
                    .state
                    .timers
                    .set(TimerKey::Fire, profile.fire_interval * 0.5);
                subject.state.enter(AiState::Attack, 0.0);
            }
        }
        AiState::Attack => {
            let anchor = subject.orbit.and_then(|o| o.anchor);
            let Some(center) = anchor.and_then(|id| ctx.locate(id)) else {
                subject.orbit = None;
                subject.target = None;
                subject.state.enter(AiState::Move, 0.0);
                return;
            };
            let aim = (center - subject.position).normalize_or_zero();
            face(subject, aim);
            if !subject.state.timers.running(TimerKey::Fire) {
                let interval = if subject.combat.fire_interval > 0.0 {
                    subject.combat.fire_interval
                } else {
                    profile.fire_interval
                };
                subject.state.timers.set(TimerKey::Fire, interval);
                ctx.spawn_projectile(ProjectileRequest {
                    archetype: "spit",
                    origin: subject.position,
                    velocity: aim * SPIT_SPEED,
                    damage: subject.combat.damage,
                    pierce: 1,
                    owner: subject.id,
                    target: None,
                });
                ctx.spawn_effect(EffectKind::Muzzle, subject.theme, subject.position, subject.rotation);
                ctx.play_sound(SoundKey::Shot, pan_of(subject.position.x));
            }
        }
        _ => subject.state.enter(AiState::Move, 0.0),
    }
}
