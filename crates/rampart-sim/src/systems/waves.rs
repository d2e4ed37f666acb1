//! Wave scheduler: queues a wave's enemies and releases them one at a time
//! at seeded positions along the arena edge.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use rampart_core::constants::WAVE_SPAWN_MARGIN;

use crate::spawner::{ArchetypeLibrary, Placement};
use crate::world::World;

/// Enemy counts for one wave, by archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveComposition {
    pub entries: Vec<(&'static str, u32)>,
}

impl WaveComposition {
    /// Escalating mix: drifters throughout, orbiters from wave 2, chargers
    /// from wave 3, spinners from wave 3, and a warden every fifth wave.
    pub fn for_wave(wave: u32) -> Self {
        let mut entries = vec![("drifter", 3 + 2 * wave.saturating_sub(1))];
        if wave >= 2 {
            entries.push(("orbiter", wave / 2));
        }
        if wave >= 3 {
            entries.push(("charger", (wave - 1) / 2));
            entries.push(("spinner", wave / 3));
        }
        if wave > 0 && wave % 5 == 0 {
            entries.push(("warden", 1));
        }
        Self { entries }
    }

    pub fn total(&self) -> u32 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Spawn order: archetypes interleaved round-robin in entry order.
    pub fn spawn_order(&self) -> Vec<&'static str> {
        let mut remaining: Vec<(&'static str, u32)> = self.entries.clone();
        let mut order = Vec::with_capacity(self.total() as usize);
        while remaining.iter().any(|(_, n)| *n > 0) {
            for (name, n) in remaining.iter_mut() {
                if *n > 0 {
                    order.push(*name);
                    *n -= 1;
                }
            }
        }
        order
    }
}

/// Pending spawns for the current wave.
#[derive(Debug, Clone, Default)]
pub struct WaveSchedule {
    wave: u32,
    queue: VecDeque<&'static str>,
    /// Seconds until the next queued spawn.
    timer: f32,
    interval: f32,
}

impl WaveSchedule {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            ..Default::default()
        }
    }

    /// Queue the next wave. Returns its number and enemy count.
    pub fn start_next(&mut self) -> (u32, u32) {
        self.wave += 1;
        let composition = WaveComposition::for_wave(self.wave);
        self.queue.extend(composition.spawn_order());
        self.timer = 0.0;
        info!(wave = self.wave, enemies = composition.total(), "wave started");
        (self.wave, composition.total())
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Enemies still waiting to spawn.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn reset(&mut self) {
        self.wave = 0;
        self.queue.clear();
        self.timer = 0.0;
    }
}

/// Release queued enemies whose spawn time has come. Returns how many
/// entered the world.
pub fn run(
    world: &mut World,
    library: &ArchetypeLibrary,
    schedule: &mut WaveSchedule,
    rng: &mut ChaCha8Rng,
    dt: f32,
) -> usize {
    if schedule.queue.is_empty() {
        return 0;
    }
    let mut released = 0;
    schedule.timer -= dt;
    while schedule.timer <= 0.0 {
        let Some(archetype) = schedule.queue.pop_front() else {
            break;
        };
        let position = edge_position(rng, world.arena);
        match library.spawn(&mut world.registry, archetype, Placement::at(position)) {
            Ok(_) => released += 1,
            Err(err) => warn!(archetype, %err, "wave spawn failed"),
        }
        schedule.timer += schedule.interval;
    }
    released
}

/// A random point just inside one of the four arena edges.
pub fn edge_position(rng: &mut ChaCha8Rng, arena: Vec2) -> Vec2 {
    let inner = (arena - Vec2::splat(WAVE_SPAWN_MARGIN)).max(Vec2::ZERO);
    let along: f32 = rng.gen_range(-1.0..=1.0);
    match rng.gen_range(0..4u8) {
        0 => Vec2::new(along * inner.x, inner.y),
        1 => Vec2::new(along * inner.x, -inner.y),
        2 => Vec2::new(inner.x, along * inner.y),
        _ => Vec2::new(-inner.x, along * inner.y),
    }
}
