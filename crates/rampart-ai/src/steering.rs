//! Steering and targeting helpers shared by the routines.

use glam::Vec2;

use rampart_core::constants::{
    ARENA_HALF_WIDTH, SLOW_FIELD_PER_LEVEL, STEER_RESPONSE, UPGRADE_SLOW_FIELD,
};

use crate::context::{BehaviorContext, Subject};

/// Cruise speed after the slow-field upgrade.
pub fn cruise_speed(subject: &Subject, ctx: &dyn BehaviorContext) -> f32 {
    let level = ctx.upgrade_level(UPGRADE_SLOW_FIELD) as f32;
    subject.max_speed / (1.0 + SLOW_FIELD_PER_LEVEL * level)
}

/// Blend velocity toward `speed` along the direction to `target`.
pub fn steer_toward(subject: &mut Subject, target: Vec2, speed: f32, dt: f32) {
    let desired = (target - subject.position).normalize_or_zero() * speed;
    steer_velocity(subject, desired, dt);
}

pub fn steer_velocity(subject: &mut Subject, desired: Vec2, dt: f32) {
    let t = (STEER_RESPONSE * dt).min(1.0);
    subject.velocity = subject.velocity.lerp(desired, t);
}

/// Blend velocity toward zero.
pub fn brake(subject: &mut Subject, dt: f32) {
    steer_velocity(subject, Vec2::ZERO, dt);
}

/// Point the subject along `dir`. A zero direction leaves rotation unchanged.
pub fn face(subject: &mut Subject, dir: Vec2) {
    if dir != Vec2::ZERO {
        subject.rotation = dir.y.atan2(dir.x);
    }
}

/// Stereo pan for a sound emitted at `x`.
pub fn pan_of(x: f32) -> f32 {
    (x / ARENA_HALF_WIDTH).clamp(-1.0, 1.0)
}

/// Position of the cached target.
///
/// A cached handle that no longer resolves is cleared and `None` returned;
/// the caller reacquires on the next tick.
pub fn resolve_target(subject: &mut Subject, ctx: &dyn BehaviorContext) -> Option<Vec2> {
    let id = subject.target?;
    match ctx.locate(id) {
        Some(pos) => Some(pos),
        None => {
            subject.target = None;
            None
        }
    }
}

/// Resolve the cached target, acquiring the nearest panel (or the turret
/// when no panel stands) if nothing is cached.
pub fn panel_target(subject: &mut Subject, ctx: &dyn BehaviorContext) -> Option<Vec2> {
    if subject.target.is_some() {
        return resolve_target(subject, ctx);
    }
    let (id, pos) = ctx
        .nearest_panel(subject.position)
        .or_else(|| ctx.player())?;
    subject.target = Some(id);
    Some(pos)
}

/// Like [`panel_target`] but prefers the turret.
pub fn player_target(subject: &mut Subject, ctx: &dyn BehaviorContext) -> Option<Vec2> {
    if subject.target.is_some() {
        return resolve_target(subject, ctx);
    }
    let (id, pos) = ctx
        .player()
        .or_else(|| ctx.nearest_panel(subject.position))?;
    subject.target = Some(id);
    Some(pos)
}
