//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Discriminant of every component type the store knows how to build.
///
/// This is a closed set: the component store registers a builder for each
/// variant through an exhaustive match, so adding a kind without a builder
/// fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Transform,
    Motion,
    Health,
    Combat,
    Collider,
    Behavior,
    Target,
    Orbit,
    Lifetime,
    Identity,
    Projectile,
    RenderModel,
    RenderTransform,
    RenderEffect,
}

impl ComponentKind {
    pub const COUNT: usize = 14;

    pub const ALL: [ComponentKind; Self::COUNT] = [
        ComponentKind::Transform,
        ComponentKind::Motion,
        ComponentKind::Health,
        ComponentKind::Combat,
        ComponentKind::Collider,
        ComponentKind::Behavior,
        ComponentKind::Target,
        ComponentKind::Orbit,
        ComponentKind::Lifetime,
        ComponentKind::Identity,
        ComponentKind::Projectile,
        ComponentKind::RenderModel,
        ComponentKind::RenderTransform,
        ComponentKind::RenderEffect,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Stable name used in standing-query signatures.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Transform => "transform",
            ComponentKind::Motion => "motion",
            ComponentKind::Health => "health",
            ComponentKind::Combat => "combat",
            ComponentKind::Collider => "collider",
            ComponentKind::Behavior => "behavior",
            ComponentKind::Target => "target",
            ComponentKind::Orbit => "orbit",
            ComponentKind::Lifetime => "lifetime",
            ComponentKind::Identity => "identity",
            ComponentKind::Projectile => "projectile",
            ComponentKind::RenderModel => "render_model",
            ComponentKind::RenderTransform => "render_transform",
            ComponentKind::RenderEffect => "render_effect",
        }
    }
}

/// Coarse entity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Player,
    Enemy,
    Projectile,
    Particle,
    Obstacle,
    World,
}

impl Tag {
    pub const ALL: [Tag; 6] = [
        Tag::Player,
        Tag::Enemy,
        Tag::Projectile,
        Tag::Particle,
        Tag::Obstacle,
        Tag::World,
    ];

    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Behavior routine selector carried by the behavior-state component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    /// Walks to the nearest panel and rams it.
    #[default]
    Drifter,
    /// Circles a panel and lobs projectiles at it.
    Orbiter,
    /// Winds up, then dashes at a cached target.
    Charger,
    /// Spins up and wobbles toward the turret.
    Spinner,
    /// Shielded boss that charges, telegraphs and fires volleys.
    Warden,
}

impl BehaviorKind {
    pub const COUNT: usize = 5;

    pub const ALL: [BehaviorKind; Self::COUNT] = [
        BehaviorKind::Drifter,
        BehaviorKind::Orbiter,
        BehaviorKind::Charger,
        BehaviorKind::Spinner,
        BehaviorKind::Warden,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Current state of a behavior state machine. Each archetype uses a subset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    #[default]
    Spawn,
    Move,
    Attack,
    Cooldown,
    Charge,
    Ready,
    Fire,
    Dash,
}

/// Named countdown timers on the behavior-state component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKey {
    /// Time remaining in the current state.
    State,
    /// Time until the next shot.
    Fire,
    /// Knockback suppression: motion logic must not steer while running.
    Stun,
    /// Contact-damage cooldown for melee attackers.
    Attack,
}

impl TimerKey {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Visual theme of an entity; selects the destruction effect palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Neon,
    Ember,
    Frost,
    Void,
}

impl Theme {
    pub fn from_code(code: u32) -> Option<Theme> {
        match code {
            0 => Some(Theme::Neon),
            1 => Some(Theme::Ember),
            2 => Some(Theme::Frost),
            3 => Some(Theme::Void),
            _ => None,
        }
    }
}

/// Mesh/material selector read by the rendering layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    None,
    Turret,
    Panel,
    Drifter,
    Orbiter,
    Charger,
    Spinner,
    Warden,
    Bolt,
    Spit,
}

/// Session phase as seen by the embedding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No session running.
    #[default]
    Idle,
    /// Session running; `update` advances systems.
    Active,
    /// Structure integrity reached zero or the turret fell.
    GameOver,
}
