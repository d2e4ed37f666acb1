//! Reusable-instance pool with on-demand batch growth.
//!
//! `acquire` hands out an instance, growing the pool by a batch when it is
//! empty; `release` takes an instance back without resetting it. Resetting is
//! the caller's job (the component store does it on every build), so a pooled
//! instance may still hold the previous owner's field values until then.
//!
//! `release` takes the instance by value, so the same instance cannot be
//! released twice while also being held elsewhere.

use tracing::debug;

use rampart_core::constants::POOL_MIN_GROWTH;

/// Pool usage counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances ever constructed by the factory.
    pub total_created: usize,
    /// Instances currently waiting in the pool.
    pub available: usize,
    /// Number of times the pool had to grow.
    pub growths: usize,
}

impl PoolStats {
    /// Instances currently handed out.
    pub fn checked_out(&self) -> usize {
        self.total_created - self.available
    }
}

pub struct Pool<T> {
    available: Vec<T>,
    factory: fn() -> T,
    min_growth: usize,
    total_created: usize,
    growths: usize,
}

impl<T> Pool<T> {
    /// Create an empty pool. Nothing is constructed until the first `acquire`.
    pub fn new(factory: fn() -> T) -> Self {
        Self::with_min_growth(factory, POOL_MIN_GROWTH)
    }

    pub fn with_min_growth(factory: fn() -> T, min_growth: usize) -> Self {
        Self {
            available: Vec::new(),
            factory,
            min_growth: min_growth.max(1),
            total_created: 0,
            growths: 0,
        }
    }

    /// Take an instance, growing by `max(min_growth, total / 2)` when empty.
    pub fn acquire(&mut self) -> T {
        if let Some(item) = self.available.pop() {
            return item;
        }
        self.grow();
        match self.available.pop() {
            Some(item) => item,
            None => (self.factory)(),
        }
    }

    /// Return an instance. It is not reset.
    pub fn release(&mut self, item: T) {
        self.available.push(item);
    }

    /// Construct instances up front so the first `count` acquisitions do not grow.
    pub fn prewarm(&mut self, count: usize) {
        let missing = count.saturating_sub(self.available.len());
        self.create(missing);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_created: self.total_created,
            available: self.available.len(),
            growths: self.growths,
        }
    }

    pub fn available(&self) -> usize {
        self.available.len()
    }

    pub fn total_created(&self) -> usize {
        self.total_created
    }

    fn grow(&mut self) {
        let batch = self.min_growth.max(self.total_created / 2);
        self.growths += 1;
        debug!(
            batch,
            total = self.total_created + batch,
            "pool exhausted, growing"
        );
        self.create(batch);
    }

    fn create(&mut self, count: usize) {
        self.available.reserve(count);
        for _ in 0..count {
            self.available.push((self.factory)());
        }
        self.total_created += count;
    }
}
