//! Structure-of-arrays transform storage.
//!
//! One flat `f32` buffer holds `[x, y, rotation, scale]` per slot. Slots are
//! handed out by [`Transform`](rampart_core::components::Transform)
//! components and returned when the component is released. Freed slots are
//! reused before the high-water mark advances, and the buffer is sized once
//! at construction.

use glam::Vec2;

use rampart_core::constants::TRANSFORM_STRIDE;
use rampart_core::{EcsError, EcsResult};

const X: usize = 0;
const Y: usize = 1;
const ROTATION: usize = 2;
const SCALE: usize = 3;

#[derive(Debug, Clone)]
pub struct TransformStore {
    data: Vec<f32>,
    free: Vec<u32>,
    /// Whether each slot is currently held.
    live: Vec<bool>,
    high_water: u32,
    capacity: usize,
}

impl TransformStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0.0; capacity * TRANSFORM_STRIDE],
            free: Vec::with_capacity(capacity),
            live: vec![false; capacity],
            high_water: 0,
            capacity,
        }
    }

    /// Claim a slot, reusing a freed one when available.
    pub fn allocate(&mut self) -> EcsResult<u32> {
        if let Some(slot) = self.free.pop() {
            self.live[slot as usize] = true;
            return Ok(slot);
        }
        if (self.high_water as usize) < self.capacity {
            let slot = self.high_water;
            self.high_water += 1;
            self.live[slot as usize] = true;
            return Ok(slot);
        }
        Err(EcsError::TransformStoreFull {
            capacity: self.capacity,
        })
    }

    /// Return a slot to the free list. Slots that are not currently held
    /// are ignored, so a second free of the same slot is a no-op.
    pub(crate) fn free(&mut self, slot: u32) {
        let Some(live) = self.live.get_mut(slot as usize) else {
            return;
        };
        if !*live {
            return;
        }
        *live = false;
        self.zero(slot);
        self.free.push(slot);
    }

    /// Release every slot without reallocating the buffer.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.free.clear();
        self.live.fill(false);
        self.high_water = 0;
    }

    pub fn set(&mut self, slot: u32, position: Vec2, rotation: f32, scale: f32) {
        if let Some(chunk) = self.chunk_mut(slot) {
            chunk[X] = position.x;
            chunk[Y] = position.y;
            chunk[ROTATION] = rotation;
            chunk[SCALE] = scale;
        }
    }

    pub fn position(&self, slot: u32) -> Option<Vec2> {
        self.chunk(slot).map(|c| Vec2::new(c[X], c[Y]))
    }

    pub fn set_position(&mut self, slot: u32, position: Vec2) {
        if let Some(chunk) = self.chunk_mut(slot) {
            chunk[X] = position.x;
            chunk[Y] = position.y;
        }
    }

    pub fn translate(&mut self, slot: u32, delta: Vec2) {
        if let Some(chunk) = self.chunk_mut(slot) {
            chunk[X] += delta.x;
            chunk[Y] += delta.y;
        }
    }

    pub fn rotation(&self, slot: u32) -> Option<f32> {
        self.chunk(slot).map(|c| c[ROTATION])
    }

    pub fn set_rotation(&mut self, slot: u32, rotation: f32) {
        if let Some(chunk) = self.chunk_mut(slot) {
            chunk[ROTATION] = rotation;
        }
    }

    pub fn scale(&self, slot: u32) -> Option<f32> {
        self.chunk(slot).map(|c| c[SCALE])
    }

    /// Slots currently held by live transforms.
    pub fn live_count(&self) -> usize {
        self.high_water as usize - self.free.len()
    }

    /// Number of slots ever handed out since the last clear.
    pub fn high_water(&self) -> usize {
        self.high_water as usize
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw `[x, y, rotation, scale]` floats for every slot below the high-water mark.
    pub fn as_slice(&self) -> &[f32] {
        &self.data[..self.high_water as usize * TRANSFORM_STRIDE]
    }

    fn chunk(&self, slot: u32) -> Option<&[f32]> {
        if slot >= self.high_water {
            return None;
        }
        let start = slot as usize * TRANSFORM_STRIDE;
        self.data.get(start..start + TRANSFORM_STRIDE)
    }

    fn chunk_mut(&mut self, slot: u32) -> Option<&mut [f32]> {
        if slot >= self.high_water {
            return None;
        }
        let start = slot as usize * TRANSFORM_STRIDE;
        self.data.get_mut(start..start + TRANSFORM_STRIDE)
    }

    fn zero(&mut self, slot: u32) {
        if let Some(chunk) = self.chunk_mut(slot) {
            chunk.fill(0.0);
        }
    }
}
