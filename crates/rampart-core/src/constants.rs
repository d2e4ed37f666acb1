//! Simulation constants and tuning parameters.

// --- Capacity ---

/// Default maximum number of simultaneously live entities.
/// Sizes the transform store and the spatial grid's chain array.
pub const DEFAULT_MAX_ENTITIES: usize = 4096;

/// Smallest batch an object pool grows by when it runs dry.
pub const POOL_MIN_GROWTH: usize = 16;

/// Floats per transform slot: x, y, rotation, scale.
pub const TRANSFORM_STRIDE: usize = 4;

// --- Spatial grid ---

/// Default grid cell edge length (world units).
pub const DEFAULT_CELL_SIZE: f32 = 64.0;

/// Default bucket table size. Must be a power of two.
pub const DEFAULT_GRID_TABLE_SIZE: usize = 4096;

/// Cell-coordinate hash multipliers.
pub const GRID_PRIME_X: i32 = 73_856_093;
pub const GRID_PRIME_Y: i32 = 19_349_663;

/// Capacity of the id buffer handed to broad-phase queries.
pub const QUERY_BUFFER_CAPACITY: usize = 256;

// --- Event bus ---

/// Default fast-channel ring capacity. Must be a power of two.
pub const DEFAULT_FAST_CAPACITY: usize = 2048;

// --- Frame ---

/// Largest delta accepted by `update`; longer frames are clamped.
pub const MAX_FRAME_DELTA: f32 = 0.1;

// --- Arena ---

/// Default half-width of the playfield.
pub const ARENA_HALF_WIDTH: f32 = 960.0;

/// Default half-height of the playfield.
pub const ARENA_HALF_HEIGHT: f32 = 540.0;

/// Distance beyond the arena edge at which stray entities are removed.
pub const ARENA_CLEANUP_MARGIN: f32 = 160.0;

/// Distance beyond the arena edge at which waves spawn.
pub const WAVE_SPAWN_MARGIN: f32 = 48.0;

// --- Combat ---

/// Velocity impulse (units/s) applied to a knocked-back entity.
pub const KNOCKBACK_FORCE: f32 = 260.0;

/// Seconds a knocked-back entity ignores its own steering.
pub const STUN_DURATION: f32 = 0.25;

/// Seconds between contact hits from the same melee attacker.
pub const ATTACK_COOLDOWN: f32 = 0.6;

/// Minimum impact speed for a direction-aware destruction burst.
pub const DIRECTIONAL_IMPACT_SPEED: f32 = 40.0;

/// Camera trauma added per destruction, by victim class.
pub const TRAUMA_ENEMY_DESTROYED: f32 = 0.2;
pub const TRAUMA_PANEL_DAMAGED: f32 = 0.15;
pub const TRAUMA_PANEL_DESTROYED: f32 = 0.5;
pub const TRAUMA_PLAYER_HIT: f32 = 0.35;

/// Identity variant marking a boss; its death requests hit-stop.
pub const BOSS_VARIANT: u8 = 2;

/// Hit-stop requested when an enemy dies (seconds).
pub const HIT_STOP_KILL: f32 = 0.03;
pub const HIT_STOP_BOSS: f32 = 0.12;

/// Hit flash intensity written on damage, and its decay per second.
pub const FLASH_ON_HIT: f32 = 1.0;
pub const FLASH_DECAY: f32 = 6.0;

// --- Behavior ---

/// Seconds an enemy spends materialising before it acts.
pub const ENEMY_SPAWN_SECS: f32 = 0.6;

/// Drifter: contact range for switching to the attack state, and its cruise speed.
pub const DRIFTER_ATTACK_RANGE: f32 = 40.0;
pub const DRIFTER_SPEED: f32 = 70.0;

/// Orbiter: orbit radius around its panel, and seconds between spit shots.
pub const ORBITER_RADIUS: f32 = 180.0;
pub const ORBITER_FIRE_INTERVAL: f32 = 1.8;
pub const ORBITER_SPEED: f32 = 110.0;

/// Charger: wind-up seconds, dash speed and dash duration.
pub const CHARGER_CHARGE_SECS: f32 = 1.2;
pub const CHARGER_DASH_SPEED: f32 = 420.0;
pub const CHARGER_DASH_SECS: f32 = 0.7;
pub const CHARGER_SPEED: f32 = 60.0;

/// Spinner: peak spin (rad/s), spin acceleration and wobble amplitude.
pub const SPINNER_MAX_SPIN: f32 = 14.0;
pub const SPINNER_SPIN_ACCEL: f32 = 6.0;
pub const SPINNER_WOBBLE: f32 = 0.6;
pub const SPINNER_SPEED: f32 = 85.0;

/// Warden: charge, telegraph and cooldown durations, and volley size.
pub const WARDEN_CHARGE_SECS: f32 = 2.5;
pub const WARDEN_READY_SECS: f32 = 0.8;
pub const WARDEN_COOLDOWN_SECS: f32 = 1.5;
pub const WARDEN_VOLLEY: u8 = 5;
pub const WARDEN_VOLLEY_SPREAD: f32 = 0.9;
pub const WARDEN_SPEED: f32 = 35.0;

/// Post-attack cooldown shared by the melee archetypes.
pub const ENEMY_COOLDOWN_SECS: f32 = 0.9;

/// Steering responsiveness: fraction of the velocity error closed per second.
pub const STEER_RESPONSE: f32 = 4.0;

/// Speed reduction per "slow_field" upgrade level.
pub const SLOW_FIELD_PER_LEVEL: f32 = 0.08;

/// Speed of enemy projectiles.
pub const SPIT_SPEED: f32 = 220.0;

// --- Upgrade keys ---

pub const UPGRADE_FIRE_RATE: &str = "fire_rate";
pub const UPGRADE_DAMAGE: &str = "damage";
pub const UPGRADE_PIERCE: &str = "pierce";
pub const UPGRADE_SLOW_FIELD: &str = "slow_field";

// --- Weapon ---

/// Fire-interval reduction per "fire_rate" upgrade level.
pub const FIRE_RATE_PER_LEVEL: f32 = 0.15;

/// Bonus damage per "damage" upgrade level.
pub const DAMAGE_PER_LEVEL: f32 = 0.5;

/// Extra pierce per "pierce" upgrade level.
pub const PIERCE_PER_LEVEL: u8 = 1;

// --- Presentation ---

/// Seconds over which a spawned entity's render progress ramps to 1.
pub const SPAWN_FADE_SECS: f32 = 0.6;

/// Integrity change (percentage points) below which no signal is published.
pub const INTEGRITY_EPSILON: f32 = 0.01;
