//! Sparse set of entity ids.

use rampart_core::EntityId;

const ABSENT: u32 = u32::MAX;

/// Set of entity ids with O(1) insert, remove and membership.
///
/// Members live in a dense array (iterated in a deterministic order that
/// depends only on the sequence of operations); a sparse array indexed by
/// `EntityId::index` maps back into it. Removal swaps the last member into
/// the vacated position.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    dense: Vec<EntityId>,
    sparse: Vec<u32>,
}

impl EntitySet {
    pub const fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Insert `id`. Returns false if it was already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.contains(id) {
            return false;
        }
        let index = id.index as usize;
        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, ABSENT);
        }
        match self.sparse[index] {
            // Same index, older generation: replace in place.
            pos if pos != ABSENT => self.dense[pos as usize] = id,
            _ => {
                self.sparse[index] = self.dense.len() as u32;
                self.dense.push(id);
            }
        }
        true
    }

    /// Remove `id`. Returns false if it was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.dense.swap_remove(pos);
        if let Some(moved) = self.dense.get(pos) {
            self.sparse[moved.index as usize] = pos as u32;
        }
        self.sparse[id.index as usize] = ABSENT;
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.dense.iter().copied()
    }

    pub fn as_slice(&self) -> &[EntityId] {
        &self.dense
    }

    /// Remove every member, keeping allocations.
    pub fn clear(&mut self) {
        for id in &self.dense {
            self.sparse[id.index as usize] = ABSENT;
        }
        self.dense.clear();
    }

    fn position(&self, id: EntityId) -> Option<usize> {
        let pos = *self.sparse.get(id.index as usize)?;
        if pos == ABSENT {
            return None;
        }
        let pos = pos as usize;
        (self.dense.get(pos) == Some(&id)).then_some(pos)
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = EntityId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, EntityId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.dense.iter().copied()
    }
}
