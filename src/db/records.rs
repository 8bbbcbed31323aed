//! Store-owned mutable records wrapping the immutable values.

use super::arena::Handle;
use crate::types::{Feature, FeatureId, FeatureSet};
use feature_types::Envelope;
use rustc_hash::FxHashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub(crate) type FeatureHandle = Handle<FeatureRecord>;
pub(crate) type SetHandle = Handle<FeatureSetRecord>;

/// Case-folded key used by the name indices.
pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug)]
pub(crate) struct FeatureRecord {
    pub feature: Arc<Feature>,
    pub set: SetHandle,
    pub envelope: Envelope,
    pub name_key: String,
}

impl FeatureRecord {
    pub fn id(&self) -> FeatureId {
        self.feature.id
    }
}

/// Visibility of a set's members.
///
/// `deviations` holds the members whose visibility differs from `visible`.
/// It is never equal in size to the membership: a toggle that would make it
/// so clears the list and flips `visible` instead.
#[derive(Debug)]
pub(crate) struct FeatureSetRecord {
    pub set: Arc<FeatureSet>,
    pub visible: bool,
    pub members: FxHashSet<FeatureHandle>,
    pub deviations: FxHashSet<FeatureId>,
    pub name_key: String,
}

impl FeatureSetRecord {
    pub fn new(set: Arc<FeatureSet>) -> Self {
        let name_key = name_key(&set.name);
        Self {
            set,
            visible: true,
            members: FxHashSet::default(),
            deviations: FxHashSet::default(),
            name_key,
        }
    }

    /// Number of members currently visible.
    pub fn visible_count(&self) -> usize {
        if self.visible {
            self.members.len() - self.deviations.len()
        } else {
            self.deviations.len()
        }
    }
}

/// Quadtree entry: a feature handle plus the envelope it was indexed under.
///
/// Equality and hashing use the handle only, so an entry built with a new
/// envelope still finds the stale one on refresh.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpatialEntry {
    pub key: FeatureHandle,
    pub bounds: Envelope,
}

impl SpatialEntry {
    pub fn new(key: FeatureHandle, bounds: Envelope) -> Self {
        Self { key, bounds }
    }

    pub fn bounds(&self) -> Envelope {
        self.bounds
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SpatialEntry {}

impl Hash for SpatialEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
