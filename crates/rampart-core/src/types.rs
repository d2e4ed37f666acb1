//! Fundamental identity, bitset and simulation-time types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::enums::{ComponentKind, Tag};

/// Handle to an entity: a recycled slot index plus the generation it was issued with.
///
/// The registry bumps the generation every time an index is reissued, so a
/// handle kept past its entity's destruction never resolves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

impl EntityId {
    /// Placeholder used to pre-fill fixed buffers. Never issued by the allocator.
    pub const DANGLING: EntityId = EntityId {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::DANGLING
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}g{}", self.index, self.generation)
    }
}

/// Set of coarse classification tags carried by an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(u8);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    pub fn contains(self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn insert(&mut self, tag: Tag) -> bool {
        let had = self.contains(tag);
        self.0 |= tag.bit();
        !had
    }

    pub fn remove(&mut self, tag: Tag) -> bool {
        let had = self.contains(tag);
        self.0 &= !tag.bit();
        had
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn iter(self) -> impl Iterator<Item = Tag> {
        Tag::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::EMPTY;
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Bitmask over [`ComponentKind`]; one bit per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComponentMask(u32);

impl ComponentMask {
    pub const EMPTY: ComponentMask = ComponentMask(0);

    pub fn of(kinds: &[ComponentKind]) -> Self {
        kinds.iter().fold(Self::EMPTY, |mask, k| mask.with(*k))
    }

    pub fn with(self, kind: ComponentKind) -> Self {
        ComponentMask(self.0 | kind.bit())
    }

    pub fn without(self, kind: ComponentKind) -> Self {
        ComponentMask(self.0 & !kind.bit())
    }

    pub fn contains(self, kind: ComponentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when every bit of `other` is set in `self`.
    pub fn contains_all(self, other: ComponentMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: ComponentMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Collision layer bitmask. An entity sits on one or more layers and
/// collides with the layers named in its collider mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const PLAYER: LayerMask = LayerMask(1 << 0);
    pub const ENEMY: LayerMask = LayerMask(1 << 1);
    pub const PLAYER_SHOT: LayerMask = LayerMask(1 << 2);
    pub const ENEMY_SHOT: LayerMask = LayerMask(1 << 3);
    pub const PANEL: LayerMask = LayerMask(1 << 4);

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of `update` calls processed.
    pub frame: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed: f32,
    /// Delta of the most recent frame in seconds.
    pub delta: f32,
}

impl SimTime {
    pub fn advance(&mut self, delta: f32) {
        self.frame += 1;
        self.delta = delta;
        self.elapsed += delta;
    }
}

/// Named-key → level accessor injected into behavior and weapon logic.
pub trait UpgradeLookup {
    /// Current level for `key`; unknown keys are level zero.
    fn level(&self, key: &str) -> u32;
}

/// Upgrade levels keyed by name, owned by the embedding application and
/// copied into the simulation config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeTable(HashMap<String, u32>);

impl UpgradeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, level: u32) {
        self.0.insert(key.into(), level);
    }

    pub fn with(mut self, key: impl Into<String>, level: u32) -> Self {
        self.set(key, level);
        self
    }
}

impl UpgradeLookup for UpgradeTable {
    fn level(&self, key: &str) -> u32 {
        self.0.get(key).copied().unwrap_or(0)
    }
}
