//! Dual-channel event bus.
//!
//! [`SignalBus`] carries state-transition signals that must never be lost.
//! [`FastRing`] carries per-frame effect records (effects, camera trauma,
//! sounds, hit-stop) that readers drain on their own schedule and may lose
//! under overrun.

pub mod ring;
pub mod signals;

pub use ring::FastRing;
pub use signals::{Outbox, SignalBus, SubscriptionId};

use rampart_core::enums::Theme;
use rampart_core::events::{EffectKind, FastEvent, Signal, SoundKey};
use rampart_core::EcsResult;

#[derive(Debug)]
pub struct EventBus {
    pub signals: SignalBus,
    pub fast: FastRing,
}

impl EventBus {
    pub fn new(fast_capacity: usize) -> EcsResult<Self> {
        Ok(Self {
            signals: SignalBus::new(),
            fast: FastRing::new(fast_capacity)?,
        })
    }

    pub fn signal(&mut self, signal: Signal) {
        self.signals.emit(signal);
    }

    pub fn effect(&mut self, effect: EffectKind, theme: Theme, x: f32, y: f32, angle: f32) {
        self.fast
            .emit(FastEvent::spawn_effect(effect, theme, x, y, angle));
    }

    pub fn sound(&mut self, sound: SoundKey, pan: f32) {
        self.fast.emit(FastEvent::play_sound(sound, pan, 1.0));
    }

    pub fn trauma(&mut self, amount: f32) {
        self.fast.emit(FastEvent::camera_trauma(amount));
    }

    pub fn hit_stop(&mut self, seconds: f32) {
        self.fast.emit(FastEvent::hit_stop(seconds));
    }
}
