//! What a behavior routine sees and what it may ask for.

use glam::Vec2;

use rampart_core::components::{BehaviorState, CombatStats, Health, Orbit};
use rampart_core::enums::Theme;
use rampart_core::events::{EffectKind, SoundKey};
use rampart_core::EntityId;

/// Copy of one entity's behavior-relevant data.
///
/// Filled from the registry before the routine runs and written back after,
/// so routines never hold a borrow into the registry.
#[derive(Debug, Clone, Default)]
pub struct Subject {
    pub id: EntityId,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub angular: f32,
    /// Cruise speed from the motion component.
    pub max_speed: f32,
    pub state: BehaviorState,
    /// Cached target handle; may be dangling.
    pub target: Option<EntityId>,
    pub orbit: Option<Orbit>,
    pub health: Option<Health>,
    pub combat: CombatStats,
    pub theme: Theme,
}

/// A projectile the routine wants spawned at the end of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileRequest {
    /// Archetype to expand, e.g. `"spit"`.
    pub archetype: &'static str,
    pub origin: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub pierce: u8,
    pub owner: EntityId,
    /// Homing target, if the archetype homes.
    pub target: Option<EntityId>,
}

/// Services available to a behavior routine.
///
/// Lookups return `None` for anything that no longer exists; a routine whose
/// target vanished clears its cached handle and reacquires next tick.
pub trait BehaviorContext {
    /// Seconds since the session started.
    fn elapsed(&self) -> f32;
    /// Seconds covered by this tick.
    fn delta(&self) -> f32;

    fn spawn_projectile(&mut self, request: ProjectileRequest);
    fn spawn_effect(&mut self, effect: EffectKind, theme: Theme, at: Vec2, angle: f32);
    /// `pan` is -1 (left) to 1 (right).
    fn play_sound(&mut self, sound: SoundKey, pan: f32);

    /// Current position of a live entity.
    fn locate(&self, id: EntityId) -> Option<Vec2>;
    /// Closest live panel to `from`.
    fn nearest_panel(&self, from: Vec2) -> Option<(EntityId, Vec2)>;
    /// The turret, if alive.
    fn player(&self) -> Option<(EntityId, Vec2)>;
    fn upgrade_level(&self, key: &str) -> u32;
}
