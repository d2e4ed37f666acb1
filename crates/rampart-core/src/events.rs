//! Events emitted by the simulation for the presentation and session layers.
//!
//! Two channels carry them. [`Signal`]s are state-transition events delivered
//! reliably and in order. [`FastEvent`]s are fixed-width numeric records for
//! per-frame effects, written into a ring buffer that may overwrite unread
//! records when a reader lags.

use serde::{Deserialize, Serialize};

use crate::enums::{Tag, Theme};
use crate::types::EntityId;

/// State-transition events on the reliable channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Signal {
    /// An enemy was destroyed by combat.
    EnemyDestroyed {
        entity: EntityId,
        archetype: String,
        theme: Theme,
        x: f32,
        y: f32,
        bounty: u32,
    },
    /// A panel lost health.
    PanelDamaged {
        entity: EntityId,
        amount: f32,
        remaining: f32,
    },
    /// A panel's health reached zero.
    PanelDestroyed { entity: EntityId },
    /// A non-panel entity lost health.
    Damaged {
        entity: EntityId,
        tag: Option<Tag>,
        amount: f32,
        remaining: f32,
    },
    /// A shield absorbed a hit.
    ShieldHit { entity: EntityId, remaining: f32 },
    /// The player turret was destroyed.
    PlayerDestroyed { entity: EntityId },
    /// Aggregated panel health changed.
    IntegrityChanged { percent: f32 },
    /// Session score changed.
    ScoreChanged { score: u32 },
    /// A wave began spawning.
    WaveStarted { wave: u32, enemies: u32 },
    /// The session ended.
    GameOver { score: u32, wave: u32 },
    /// The registry was cleared for a new session.
    SessionReset,
}

/// Name of a signal; the key handlers subscribe under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    EnemyDestroyed,
    PanelDamaged,
    PanelDestroyed,
    Damaged,
    ShieldHit,
    PlayerDestroyed,
    IntegrityChanged,
    ScoreChanged,
    WaveStarted,
    GameOver,
    SessionReset,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::EnemyDestroyed { .. } => SignalKind::EnemyDestroyed,
            Signal::PanelDamaged { .. } => SignalKind::PanelDamaged,
            Signal::PanelDestroyed { .. } => SignalKind::PanelDestroyed,
            Signal::Damaged { .. } => SignalKind::Damaged,
            Signal::ShieldHit { .. } => SignalKind::ShieldHit,
            Signal::PlayerDestroyed { .. } => SignalKind::PlayerDestroyed,
            Signal::IntegrityChanged { .. } => SignalKind::IntegrityChanged,
            Signal::ScoreChanged { .. } => SignalKind::ScoreChanged,
            Signal::WaveStarted { .. } => SignalKind::WaveStarted,
            Signal::GameOver { .. } => SignalKind::GameOver,
            Signal::SessionReset => SignalKind::SessionReset,
        }
    }
}

/// Fast-channel record codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FastEventKind {
    /// args: effect code, x, y, angle.
    SpawnEffect = 1,
    /// args: trauma amount.
    CameraTrauma = 2,
    /// args: sound code, pan (-1..1), volume.
    PlaySound = 3,
    /// args: freeze seconds. Honoring it is the driver's choice.
    HitStop = 4,
}

impl FastEventKind {
    pub fn from_code(code: u32) -> Option<FastEventKind> {
        match code {
            1 => Some(FastEventKind::SpawnEffect),
            2 => Some(FastEventKind::CameraTrauma),
            3 => Some(FastEventKind::PlaySound),
            4 => Some(FastEventKind::HitStop),
            _ => None,
        }
    }
}

/// Visual effects the renderer knows how to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EffectKind {
    Spark = 0,
    /// Destruction burst oriented along the impact direction.
    BurstDirectional = 1,
    /// Destruction burst with no preferred direction.
    BurstOmni = 2,
    ShieldFlash = 3,
    Muzzle = 4,
    Telegraph = 5,
}

impl EffectKind {
    pub fn from_code(code: u32) -> Option<EffectKind> {
        match code {
            0 => Some(EffectKind::Spark),
            1 => Some(EffectKind::BurstDirectional),
            2 => Some(EffectKind::BurstOmni),
            3 => Some(EffectKind::ShieldFlash),
            4 => Some(EffectKind::Muzzle),
            5 => Some(EffectKind::Telegraph),
            _ => None,
        }
    }
}

/// Sound cues for the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SoundKey {
    Shot = 0,
    Hit = 1,
    Explode = 2,
    ShieldHit = 3,
    Charge = 4,
    Volley = 5,
    PanelCrack = 6,
}

impl SoundKey {
    pub fn from_code(code: u32) -> Option<SoundKey> {
        match code {
            0 => Some(SoundKey::Shot),
            1 => Some(SoundKey::Hit),
            2 => Some(SoundKey::Explode),
            3 => Some(SoundKey::ShieldHit),
            4 => Some(SoundKey::Charge),
            5 => Some(SoundKey::Volley),
            6 => Some(SoundKey::PanelCrack),
            _ => None,
        }
    }
}

/// Pack an effect and its theme into one record argument.
pub fn effect_code(effect: EffectKind, theme: Theme) -> u32 {
    ((effect as u32) << 4) | theme as u32
}

/// Inverse of [`effect_code`].
pub fn decode_effect(code: u32) -> Option<(EffectKind, Theme)> {
    Some((EffectKind::from_code(code >> 4)?, Theme::from_code(code & 0xF)?))
}

/// One fixed-width record on the fast channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FastEvent {
    pub kind: u32,
    pub args: [f32; 4],
}

impl FastEvent {
    pub fn new(kind: FastEventKind, args: [f32; 4]) -> Self {
        Self {
            kind: kind as u32,
            args,
        }
    }

    pub fn spawn_effect(effect: EffectKind, theme: Theme, x: f32, y: f32, angle: f32) -> Self {
        Self::new(
            FastEventKind::SpawnEffect,
            [effect_code(effect, theme) as f32, x, y, angle],
        )
    }

    pub fn camera_trauma(amount: f32) -> Self {
        Self::new(FastEventKind::CameraTrauma, [amount, 0.0, 0.0, 0.0])
    }

    pub fn play_sound(sound: SoundKey, pan: f32, volume: f32) -> Self {
        Self::new(
            FastEventKind::PlaySound,
            [sound as u32 as f32, pan.clamp(-1.0, 1.0), volume, 0.0],
        )
    }

    pub fn hit_stop(seconds: f32) -> Self {
        Self::new(FastEventKind::HitStop, [seconds, 0.0, 0.0, 0.0])
    }

    pub fn decode(&self) -> Option<FastEventKind> {
        FastEventKind::from_code(self.kind)
    }
}
