//! Component data and their partial-data initialisers.
//!
//! Components are plain data structs with no behavior; logic lives in
//! systems. Every component is built through the component store from a
//! [`ComponentInit`] record, whose fields default when omitted so archetype
//! files only spell out what differs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, LayerMask};

/// Typed access to one variant of [`Component`].
pub trait ComponentData: Sized {
    /// Discriminant of this component type.
    const KIND: ComponentKind;
    /// Partial-data record this component is reset from.
    type Init;

    fn from_component(component: &Component) -> Option<&Self>;
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;
    fn into_component(self) -> Component;
    fn init_of(init: &ComponentInit) -> Option<&Self::Init>;
}

macro_rules! component_set {
    ($($variant:ident($ty:ty, $init:ty)),* $(,)?) => {
        /// A component instance tagged with its kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Component {
            $($variant($ty),)*
        }

        impl Component {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Component::$variant(_) => ComponentKind::$variant,)*
                }
            }
        }

        /// Initial data for one component, as written in archetype definitions.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all = "snake_case")]
        pub enum ComponentInit {
            $($variant($init),)*
        }

        impl ComponentInit {
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(ComponentInit::$variant(_) => ComponentKind::$variant,)*
                }
            }
        }

        $(
            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$variant;
                type Init = $init;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$variant(value) => Some(value),
                        _ => None,
                    }
                }

                fn into_component(self) -> Component {
                    Component::$variant(self)
                }

                fn init_of(init: &ComponentInit) -> Option<&Self::Init> {
                    match init {
                        ComponentInit::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

component_set! {
    Transform(Transform, TransformInit),
    Motion(Motion, Motion),
    Health(Health, HealthInit),
    Combat(CombatStats, CombatStats),
    Collider(Collider, Collider),
    Behavior(BehaviorState, BehaviorInit),
    Target(TargetRef, TargetRef),
    Orbit(Orbit, Orbit),
    Lifetime(Lifetime, Lifetime),
    Identity(Identity, Identity),
    Projectile(ProjectileState, ProjectileState),
    RenderModel(RenderModel, RenderModel),
    RenderTransform(RenderTransform, RenderTransform),
    RenderEffect(RenderEffect, RenderEffect),
}

// --- Spatial ---

/// Owner of one slot in the shared transform store.
///
/// Position, rotation and scale live in the store's float buffer; the
/// component only holds the slot index it allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    pub slot: u32,
}

impl Transform {
    pub const UNALLOCATED: u32 = u32::MAX;
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            slot: Self::UNALLOCATED,
        }
    }
}

/// Values written into a freshly allocated transform slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformInit {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
}

impl Default for TransformInit {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Linear and angular velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motion {
    pub velocity: Vec2,
    /// Radians per second.
    pub angular: f32,
    /// Fraction of velocity shed per second.
    pub damping: f32,
    /// Cruise speed used by steering; impulses may exceed it.
    pub max_speed: f32,
}

// --- Combat ---

/// Hit points plus an optional absorbing shield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    pub shield: f32,
    pub max_shield: f32,
    /// While set and `shield > 0`, incoming damage depletes the shield instead of health.
    pub shield_active: bool,
}

impl Health {
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthInit {
    pub max: f32,
    pub shield: f32,
    pub shield_active: bool,
}

/// Damage dealt on contact and, for shooters, weapon cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub damage: f32,
    /// Multiplier on the knockback force applied to whatever this hits.
    pub knockback: f32,
    /// Seconds between shots; zero for entities that never fire.
    pub fire_interval: f32,
    /// Seconds until the next shot is allowed.
    pub cooldown: f32,
    /// Targeting range for automatic weapons.
    pub range: f32,
    pub projectile_speed: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            damage: 0.0,
            knockback: 1.0,
            fire_interval: 0.0,
            cooldown: 0.0,
            range: 0.0,
            projectile_speed: 0.0,
        }
    }
}

/// Circle collider on one or more layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collider {
    pub radius: f32,
    pub layer: LayerMask,
    /// Layers this collider reacts to.
    pub mask: LayerMask,
}

// --- Logic ---

/// Named countdown timers, indexed by [`TimerKey`]. Counted down each tick, floored at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timers([f32; TimerKey::COUNT]);

impl Timers {
    pub fn get(&self, key: TimerKey) -> f32 {
        self.0[key.index()]
    }

    pub fn set(&mut self, key: TimerKey, seconds: f32) {
        self.0[key.index()] = seconds.max(0.0);
    }

    pub fn running(&self, key: TimerKey) -> bool {
        self.get(key) > 0.0
    }

    pub fn tick(&mut self, dt: f32) {
        for t in &mut self.0 {
            *t = (*t - dt).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.0 = [0.0; TimerKey::COUNT];
    }
}

/// Archetype-specific scratch values held between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Scratch {
    #[default]
    Empty,
    /// Wind-up progress and the target cached when the wind-up began.
    Charge {
        charge: f32,
        target: Option<EntityId>,
        heading: Vec2,
    },
    /// Current spin velocity and wobble phase.
    Spin { spin: f32, phase: f32 },
    /// Accumulated charge and shots remaining in the current volley.
    Volley { charge: f32, shots_left: u8 },
}

/// Behavioral memory for one entity: state tag, timers and scratch data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviorState {
    pub kind: BehaviorKind,
    pub state: AiState,
    pub timers: Timers,
    pub scratch: Scratch,
}

impl BehaviorState {
    /// Move to `state`, arming the state timer. The state timer is cleared when `seconds` is zero.
    pub fn enter(&mut self, state: AiState, seconds: f32) {
        self.state = state;
        self.timers.set(TimerKey::State, seconds);
    }

    /// True while a knockback impulse must not be overwritten.
    pub fn suppressed(&self) -> bool {
        self.timers.running(TimerKey::Stun)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorInit {
    pub kind: BehaviorKind,
    pub state: AiState,
}

/// Reference to another entity; may dangle once the target is destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetRef {
    pub entity: Option<EntityId>,
}

/// Circular motion around an anchor entity or a fixed center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Orbit {
    pub anchor: Option<EntityId>,
    pub center: Vec2,
    pub radius: f32,
    /// Radians per second; the sign picks the direction.
    pub angular_speed: f32,
    pub angle: f32,
}

/// Seconds until the entity expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifetime {
    pub remaining: f32,
}

/// Archetype name plus the variant/theme pair used to pick effects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub archetype: String,
    pub variant: u8,
    pub theme: Theme,
    /// Score awarded when destroyed.
    pub bounty: u32,
}

/// Flight state of a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileState {
    pub speed: f32,
    /// Hits remaining before the projectile is consumed.
    pub pierce: u8,
    /// Turn rate toward the target in radians per second; zero flies straight.
    pub homing: f32,
    pub owner: Option<EntityId>,
}

impl Default for ProjectileState {
    fn default() -> Self {
        Self {
            speed: 0.0,
            pierce: 1,
            homing: 0.0,
            owner: None,
        }
    }
}

// --- Presentation-facing (written by the core, read by the renderer) ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderModel {
    pub model: ModelKind,
    pub color: [f32; 3],
}

impl Default for RenderModel {
    fn default() -> Self {
        Self {
            model: ModelKind::None,
            color: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTransform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: f32,
    /// 0 while materialising, 1 once fully spawned.
    pub spawn_progress: f32,
}

impl Default for RenderTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            spawn_progress: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderEffect {
    /// Hit flash intensity, decays to zero.
    pub flash: f32,
    /// Shield glow intensity.
    pub glow: f32,
}
