//! Standing-query definitions.

use rampart_core::enums::ComponentKind;
use rampart_core::types::ComponentMask;

use super::set::EntitySet;

/// Component-signature filter: entities holding every `all` kind, at least
/// one `any` kind (if any are listed), and no `none` kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryDef {
    pub all: Vec<ComponentKind>,
    pub any: Vec<ComponentKind>,
    pub none: Vec<ComponentKind>,
}

impl QueryDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self, kinds: &[ComponentKind]) -> Self {
        self.all.extend_from_slice(kinds);
        self
    }

    pub fn any(mut self, kinds: &[ComponentKind]) -> Self {
        self.any.extend_from_slice(kinds);
        self
    }

    pub fn none(mut self, kinds: &[ComponentKind]) -> Self {
        self.none.extend_from_slice(kinds);
        self
    }

    /// Canonical signature: each list sorted and deduplicated, so filters
    /// differing only in order share one cache entry.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        for (label, kinds) in [("all", &self.all), ("any", &self.any), ("none", &self.none)] {
            if !out.is_empty() {
                out.push('|');
            }
            out.push_str(label);
            out.push(':');
            let mut sorted = kinds.clone();
            sorted.sort();
            sorted.dedup();
            for (i, kind) in sorted.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(kind.name());
            }
        }
        out
    }

    pub fn filter(&self) -> QueryFilter {
        QueryFilter {
            all: ComponentMask::of(&self.all),
            any: ComponentMask::of(&self.any),
            none: ComponentMask::of(&self.none),
        }
    }
}

/// A [`QueryDef`] compiled to bitmasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    all: ComponentMask,
    any: ComponentMask,
    none: ComponentMask,
}

impl QueryFilter {
    pub fn matches(&self, mask: ComponentMask) -> bool {
        mask.contains_all(self.all)
            && (self.any.is_empty() || mask.intersects(self.any))
            && !mask.intersects(self.none)
    }
}

/// Handle to a registered standing query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryId(pub(crate) u32);

/// A filter plus its incrementally maintained result set.
#[derive(Debug)]
pub(crate) struct StandingQuery {
    pub(crate) signature: String,
    pub(crate) filter: QueryFilter,
    pub(crate) results: EntitySet,
}
