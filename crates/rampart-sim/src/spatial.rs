//! Spatial hash grid for broad-phase proximity queries.
//!
//! Positions are floored to integer cells, and cells hash into a fixed,
//! power-of-two bucket table. Each bucket is a singly linked list threaded
//! through a parallel `next` array indexed by entity index, so inserting and
//! clearing never allocate.
//!
//! Every entity lands in exactly one bucket, by its centre point. A query
//! scans the buckets of every cell its bounding box touches and returns every
//! occupant of those buckets: results are a superset filtered by bucket, not
//! by distance (and hash collisions can add far-away entities). Callers that
//! need exact distances post-filter.

use glam::Vec2;
use tracing::trace;

use rampart_core::constants::{GRID_PRIME_X, GRID_PRIME_Y};
use rampart_core::{EcsError, EcsResult, EntityId};

const EMPTY: i32 = -1;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    inv_cell: f32,
    mask: usize,
    /// First occupant index per bucket, or `EMPTY`.
    heads: Vec<i32>,
    /// Next occupant index in the same bucket, per entity index.
    next: Vec<i32>,
    /// Full id per entity index, for the current frame's occupants.
    occupants: Vec<EntityId>,
    /// Frame stamp of each entity index's last insert; guards double inserts.
    inserted: Vec<u32>,
    /// Query stamp per bucket; stops a query visiting one bucket twice.
    visited: Vec<u32>,
    frame: u32,
    stamp: u32,
    len: usize,
}

impl SpatialGrid {
    /// `table_size` must be a power of two; `max_entities` bounds entity indices.
    pub fn new(cell_size: f32, table_size: usize, max_entities: usize) -> EcsResult<Self> {
        if !table_size.is_power_of_two() {
            return Err(EcsError::NotPowerOfTwo {
                what: "grid table size",
                value: table_size,
            });
        }
        Ok(Self {
            cell_size,
            inv_cell: 1.0 / cell_size.max(f32::EPSILON),
            mask: table_size - 1,
            heads: vec![EMPTY; table_size],
            next: vec![EMPTY; max_entities],
            occupants: vec![EntityId::DANGLING; max_entities],
            inserted: vec![0; max_entities],
            visited: vec![0; table_size],
            frame: 1,
            stamp: 0,
            len: 0,
        })
    }

    /// Empty every bucket. Only the head array is touched.
    pub fn clear(&mut self) {
        self.heads.fill(EMPTY);
        self.len = 0;
        self.frame = self.frame.wrapping_add(1);
        if self.frame == 0 {
            self.inserted.fill(0);
            self.frame = 1;
        }
    }

    /// Add `id` at `position`. Returns false if its index is beyond the
    /// grid's capacity or it was already inserted since the last clear.
    pub fn insert(&mut self, id: EntityId, position: Vec2) -> bool {
        let index = id.index as usize;
        if index >= self.next.len() {
            trace!(%id, capacity = self.next.len(), "grid insert beyond capacity");
            return false;
        }
        if self.inserted[index] == self.frame {
            return false;
        }
        let bucket = self.bucket_of(self.cell(position.x), self.cell(position.y));
        self.next[index] = self.heads[bucket];
        self.heads[bucket] = index as i32;
        self.occupants[index] = id;
        self.inserted[index] = self.frame;
        self.len += 1;
        true
    }

    /// Write the occupants of every bucket overlapping the square
    /// `center ± radius` into `out`, returning how many were written.
    ///
    /// Matches beyond `out.len()` are dropped.
    pub fn query(&mut self, center: Vec2, radius: f32, out: &mut [EntityId]) -> usize {
        let radius = radius.max(0.0);
        let (x0, x1) = (self.cell(center.x - radius), self.cell(center.x + radius));
        let (y0, y1) = (self.cell(center.y - radius), self.cell(center.y + radius));

        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.visited.fill(0);
            self.stamp = 1;
        }

        let mut written = 0;
        let mut dropped = 0usize;
        let cells = (x1 as i64 - x0 as i64 + 1) * (y1 as i64 - y0 as i64 + 1);
        if cells >= self.heads.len() as i64 {
            // The box covers at least as many cells as there are buckets.
            for bucket in 0..self.heads.len() {
                self.collect(bucket, out, &mut written, &mut dropped);
            }
        } else {
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    let bucket = self.bucket_of(cx, cy);
                    if self.visited[bucket] == self.stamp {
                        continue;
                    }
                    self.visited[bucket] = self.stamp;
                    self.collect(bucket, out, &mut written, &mut dropped);
                }
            }
        }
        if dropped > 0 {
            trace!(dropped, capacity = out.len(), "grid query buffer full");
        }
        written
    }

    /// Number of entities inserted since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn table_size(&self) -> usize {
        self.heads.len()
    }

    fn collect(&self, bucket: usize, out: &mut [EntityId], written: &mut usize, dropped: &mut usize) {
        let mut cursor = self.heads[bucket];
        while cursor != EMPTY {
            let index = cursor as usize;
            match out.get_mut(*written) {
                Some(slot) => {
                    *slot = self.occupants[index];
                    *written += 1;
                }
                None => *dropped += 1,
            }
            cursor = self.next[index];
        }
    }

    fn cell(&self, coord: f32) -> i32 {
        (coord * self.inv_cell).floor() as i32
    }

    fn bucket_of(&self, cx: i32, cy: i32) -> usize {
        let h = cx.wrapping_mul(GRID_PRIME_X) ^ cy.wrapping_mul(GRID_PRIME_Y);
        h as u32 as usize & self.mask
    }
}
