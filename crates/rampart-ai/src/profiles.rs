//! Archetype-specific behavioral profiles.
//!
//! Consolidates the timing and range parameters each routine reads.

use rampart_core::constants::*;
use rampart_core::enums::BehaviorKind;

/// Behavioral profile for a behavior kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorProfile {
    /// Seconds spent in `Spawn` before acting.
    pub spawn_secs: f32,
    /// Distance to the target at which the approach ends.
    pub engage_range: f32,
    /// Wind-up before the attack (charge, telegraph).
    pub windup_secs: f32,
    /// Duration of the attack itself (lunge, dash).
    pub active_secs: f32,
    pub cooldown_secs: f32,
    /// Seconds between shots, for shooters.
    pub fire_interval: f32,
    /// Shots per volley, for volley shooters.
    pub volley: u8,
    /// Total fan angle of a volley (radians).
    pub spread: f32,
}

/// Get the behavioral profile for a given behavior kind.
pub fn get_profile(kind: BehaviorKind) -> BehaviorProfile {
    match kind {
        BehaviorKind::Drifter => BehaviorProfile {
            spawn_secs: ENEMY_SPAWN_SECS,
            engage_range: DRIFTER_ATTACK_RANGE,
            windup_secs: 0.0,
            active_secs: 0.4,
            cooldown_secs: ENEMY_COOLDOWN_SECS,
            fire_interval: 0.0,
            volley: 0,
            spread: 0.0,
        },
        BehaviorKind::Orbiter => BehaviorProfile {
            spawn_secs: ENEMY_SPAWN_SECS,
            engage_range: ORBITER_RADIUS,
            windup_secs: 0.0,
            active_secs: 0.0,
            cooldown_secs: 0.0,
            fire_interval: ORBITER_FIRE_INTERVAL,
            volley: 1,
            spread: 0.0,
        },
        BehaviorKind::Charger => BehaviorProfile {
            spawn_secs: ENEMY_SPAWN_SECS,
            engage_range: 260.0,
            windup_secs: CHARGER_CHARGE_SECS,
            active_secs: CHARGER_DASH_SECS,
            cooldown_secs: ENEMY_COOLDOWN_SECS,
            fire_interval: 0.0,
            volley: 0,
            spread: 0.0,
        },
        BehaviorKind::Spinner => BehaviorProfile {
            spawn_secs: ENEMY_SPAWN_SECS * 0.5,
            engage_range: 0.0,
            windup_secs: 0.0,
            active_secs: 0.0,
            cooldown_secs: 0.0,
            fire_interval: 0.0,
            volley: 0,
            spread: 0.0,
        },
        BehaviorKind::Warden => BehaviorProfile {
            spawn_secs: ENEMY_SPAWN_SECS * 2.0,
            engage_range: 320.0,
            windup_secs: WARDEN_CHARGE_SECS,
            active_secs: WARDEN_READY_SECS,
            cooldown_secs: WARDEN_COOLDOWN_SECS,
            fire_interval: 0.08,
            volley: WARDEN_VOLLEY,
            spread: WARDEN_VOLLEY_SPREAD,
        },
    }
}
