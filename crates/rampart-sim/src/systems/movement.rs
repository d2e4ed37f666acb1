//! Kinematic integration into the transform store.
//!
//! Orbiting entities are placed on their circle; everything else is damped,
//! optionally steered toward a homing target, then moved by
//! `velocity * dt`.

use glam::Vec2;

use rampart_core::components::{Motion, Orbit, ProjectileState, TargetRef, Transform};
use rampart_core::EntityId;

use crate::world::World;

/// Integrate every entity with Transform + Motion.
pub fn run(world: &mut World, dt: f32) {
    if dt <= 0.0 {
        return;
    }
    let ids = world.snapshot_ids(world.queries.movers);
    for &id in &ids {
        integrate(world, id, dt);
    }
    world.restore_scratch(ids);
}

fn integrate(world: &mut World, id: EntityId, dt: f32) {
    let registry = &mut world.registry;
    let Some(entity) = registry.get_entity(id) else {
        return;
    };
    let orbit = entity.get::<Orbit>().copied();
    let homing = entity
        .get::<ProjectileState>()
        .filter(|p| p.homing > 0.0)
        .map(|p| p.homing);
    let target = entity.get::<TargetRef>().and_then(|t| t.entity);

    let anchor_pos = orbit
        .and_then(|o| o.anchor)
        .and_then(|anchor| registry.position(anchor));
    let target_pos = match (homing, target) {
        (Some(_), Some(t)) => registry.position(t),
        _ => None,
    };

    let Some((entity, transforms)) = registry.split_mut(id) else {
        return;
    };
    let Some(slot) = entity.get::<Transform>().map(|t| t.slot) else {
        return;
    };
    let Some(position) = transforms.position(slot) else {
        return;
    };

    if let Some(mut orbit) = orbit {
        if let Some(center) = anchor_pos {
            orbit.center = center;
        }
        orbit.angle += orbit.angular_speed * dt;
        let next = orbit.center + Vec2::from_angle(orbit.angle) * orbit.radius;
        transforms.set_position(slot, next);
        if let Some(motion) = entity.get_mut::<Motion>() {
            motion.velocity = (next - position) / dt;
            let rotation = transforms.rotation(slot).unwrap_or(0.0);
            transforms.set_rotation(slot, rotation + motion.angular * dt);
        }
        if let Some(stored) = entity.get_mut::<Orbit>() {
            *stored = orbit;
        }
        return;
    }

    // A homing projectile whose target died flies straight from here on.
    if homing.is_some() && target.is_some() && target_pos.is_none() {
        if let Some(target) = entity.get_mut::<TargetRef>() {
            target.entity = None;
        }
    }

    let Some(motion) = entity.get_mut::<Motion>() else {
        return;
    };
    if let (Some(rate), Some(goal)) = (homing, target_pos) {
        motion.velocity = home(motion.velocity, goal - position, rate * dt);
    }
    if motion.damping > 0.0 {
        motion.velocity *= (1.0 - motion.damping * dt).max(0.0);
    }
    transforms.translate(slot, motion.velocity * dt);
    if motion.velocity != Vec2::ZERO && homing.is_some() {
        transforms.set_rotation(slot, motion.velocity.y.atan2(motion.velocity.x));
    } else if motion.angular != 0.0 {
        let rotation = transforms.rotation(slot).unwrap_or(0.0);
        transforms.set_rotation(slot, rotation + motion.angular * dt);
    }
}

/// Turn `velocity` toward `to_target` by at most `max_turn` radians, keeping its speed.
fn home(velocity: Vec2, to_target: Vec2, max_turn: f32) -> Vec2 {
    let speed = velocity.length();
    if speed == 0.0 || to_target == Vec2::ZERO {
        return velocity;
    }
    let heading = velocity / speed;
    let wanted = to_target.normalize_or_zero();
    let angle = heading
        .perp_dot(wanted)
        .atan2(heading.dot(wanted))
        .clamp(-max_turn, max_turn);
    Vec2::from_angle(angle).rotate(heading) * speed
}
