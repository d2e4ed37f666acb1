//! Contact detection and the layer-pair collision matrix.
//!
//! Detection walks every collider, asks the grid for neighbours within its
//! radius plus the largest collider radius present this frame, keeps pairs whose layer masks
//! accept each other and whose circles overlap, and records each pair once
//! (from its lower-index side). The matrix then maps the unordered pair of
//! layers to a handler.

use std::collections::HashMap;

use glam::Vec2;

use rampart_core::components::Collider;
use rampart_core::types::LayerMask;
use rampart_core::EntityId;

use super::combat::{resolve_contact, CombatTally};
use crate::world::World;

/// Two overlapping colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub b: EntityId,
    pub layer_a: LayerMask,
    pub layer_b: LayerMask,
    /// Unit vector from `a` toward `b`.
    pub normal: Vec2,
    /// Overlap distance along the normal.
    pub depth: f32,
}

impl Contact {
    /// The same contact seen from `b`'s side.
    pub fn flipped(&self) -> Contact {
        Contact {
            a: self.b,
            b: self.a,
            layer_a: self.layer_b,
            layer_b: self.layer_a,
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Collect every overlapping, mutually interested collider pair into `contacts`.
pub fn detect(world: &mut World, contacts: &mut Vec<Contact>) {
    contacts.clear();
    let ids = world.snapshot_ids(world.queries.colliders);
    let widest = ids
        .iter()
        .filter_map(|&id| collider_at(world, id))
        .map(|(_, collider)| collider.radius)
        .fold(0.0_f32, f32::max);
    for &a in &ids {
        let Some((pos_a, col_a)) = collider_at(world, a) else {
            continue;
        };
        let count = world
            .grid
            .query(pos_a, col_a.radius + widest, &mut world.neighbors);
        for i in 0..count {
            let b = world.neighbors[i];
            if b.index <= a.index {
                continue;
            }
            let Some((pos_b, col_b)) = collider_at(world, b) else {
                continue;
            };
            if !col_a.mask.intersects(col_b.layer) && !col_b.mask.intersects(col_a.layer) {
                continue;
            }
            let reach = col_a.radius + col_b.radius;
            let offset = pos_b - pos_a;
            let dist_sq = offset.length_squared();
            if dist_sq > reach * reach {
                continue;
            }
            let dist = dist_sq.sqrt();
            contacts.push(Contact {
                a,
                b,
                layer_a: col_a.layer,
                layer_b: col_b.layer,
                normal: offset.try_normalize().unwrap_or(Vec2::X),
                depth: reach - dist,
            });
        }
    }
    world.restore_scratch(ids);
}

fn collider_at(world: &World, id: EntityId) -> Option<(Vec2, Collider)> {
    let collider = *world.registry.get_entity(id)?.get::<Collider>()?;
    Some((world.registry.position(id)?, collider))
}

/// Handles one oriented contact.
pub type ContactHandler = fn(&mut World, &Contact, &mut CombatTally);

/// Unordered layer pair → handler.
#[derive(Debug, Clone, Default)]
pub struct CollisionMatrix {
    handlers: HashMap<u64, (LayerMask, ContactHandler)>,
}

fn pair_key(a: LayerMask, b: LayerMask) -> u64 {
    let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
    (lo as u64) << 32 | hi as u64
}

impl CollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every hostile pairing resolved through combat.
    pub fn with_defaults() -> Self {
        let mut matrix = Self::new();
        let pairs = [
            (LayerMask::PLAYER_SHOT, LayerMask::ENEMY),
            (LayerMask::ENEMY, LayerMask::PANEL),
            (LayerMask::ENEMY, LayerMask::PLAYER),
            (LayerMask::ENEMY_SHOT, LayerMask::PANEL),
            (LayerMask::ENEMY_SHOT, LayerMask::PLAYER),
            (LayerMask::PLAYER_SHOT, LayerMask::ENEMY_SHOT),
        ];
        for (first, second) in pairs {
            matrix.register(first, second, resolve_contact);
        }
        matrix
    }

    /// Route contacts between `first` and `second` to `handler`. The handler
    /// always sees the `first`-layer entity as `contact.a`.
    pub fn register(&mut self, first: LayerMask, second: LayerMask, handler: ContactHandler) {
        self.handlers.insert(pair_key(first, second), (first, handler));
    }

    pub fn contains(&self, a: LayerMask, b: LayerMask) -> bool {
        self.handlers.contains_key(&pair_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The handler for a contact's layer pair and the contact oriented for it.
    ///
    /// Same-layer pairs are oriented lower index first, so the result does
    /// not depend on which side detection happened to report as `a`.
    pub fn lookup(&self, contact: &Contact) -> Option<(ContactHandler, Contact)> {
        let (first, handler) = *self
            .handlers
            .get(&pair_key(contact.layer_a, contact.layer_b))?;
        let flip = if contact.layer_a == contact.layer_b {
            contact.b.index < contact.a.index
        } else {
            contact.layer_a != first
        };
        let oriented = if flip { contact.flipped() } else { *contact };
        Some((handler, oriented))
    }

    /// Dispatch one contact. Returns false when no handler covers its layers.
    pub fn resolve(&self, world: &mut World, contact: &Contact, tally: &mut CombatTally) -> bool {
        match self.lookup(contact) {
            Some((handler, oriented)) => {
                handler(world, &oriented, tally);
                true
            }
            None => false,
        }
    }
}
