//! Per-set visibility with per-feature deviations.
//!
//! A feature is visible when its set's flag and its own deviation disagree:
//! `visible XOR deviates`. Toggling every member of a set individually
//! collapses into a flip of the set flag.

use super::StoreInner;
use super::records::FeatureSetRecord;
use crate::error::{Result, StoreError};
use crate::query::{FeatureQuery, FeatureSetQuery};
use crate::types::{FeatureId, FeatureSetId};

impl FeatureSetRecord {
    pub(crate) fn is_member_visible(&self, id: FeatureId) -> bool {
        self.visible != self.deviations.contains(&id)
    }

    /// Set the flag for the whole set, dropping every deviation.
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.deviations.clear();
    }

    pub(crate) fn set_member_visible(&mut self, id: FeatureId, visible: bool) {
        if visible == self.visible {
            self.deviations.remove(&id);
        } else if self.deviations.insert(id) && self.deviations.len() == self.members.len() {
            self.set_visible(visible);
        }
    }

    /// Drop a departed member's deviation and restore the size invariant.
    pub(crate) fn forget_member(&mut self, id: FeatureId) {
        self.deviations.remove(&id);
        if self.members.is_empty() {
            self.deviations.clear();
        } else if self.deviations.len() == self.members.len() {
            let flipped = !self.visible;
            self.set_visible(flipped);
        }
    }
}

impl StoreInner {
    pub(super) fn is_feature_visible(&self, id: FeatureId) -> Result<bool> {
        let record = self
            .feature_record(id)
            .ok_or_else(|| StoreError::invalid(format!("no feature with id {}", id)))?;
        let set = self
            .sets
            .get(record.set)
            .ok_or_else(|| StoreError::illegal(format!("feature {} has no set", id)))?;
        Ok(set.is_member_visible(id))
    }

    pub(super) fn is_feature_set_visible(&self, id: FeatureSetId) -> Result<bool> {
        self.set_record(id)
            .map(|set| set.visible)
            .ok_or_else(|| StoreError::invalid(format!("no feature set with id {}", id)))
    }

    pub(super) fn set_feature_visible(&mut self, id: FeatureId, visible: bool) -> Result<()> {
        let handle = self.feature_handle(id)?;
        let set_handle = self
            .features
            .get(handle)
            .map(|record| record.set)
            .ok_or_else(|| StoreError::illegal(format!("feature {} has no record", id)))?;
        let set = self
            .sets
            .get_mut(set_handle)
            .ok_or_else(|| StoreError::illegal(format!("feature {} has no set", id)))?;
        set.set_member_visible(id, visible);
        Ok(())
    }

    pub(super) fn set_features_visible(
        &mut self,
        query: &FeatureQuery,
        visible: bool,
    ) -> Result<usize> {
        if let Some(ids) = &query.ids {
            for id in ids.iter().filter(|id| !self.feature_ids.contains_key(*id)) {
                log::warn!("set_features_visible: no feature with id {}", id);
            }
        }

        let (matched, _) = self.matching_features(query)?;
        let targets: Vec<_> = matched
            .iter()
            .filter_map(|handle| self.features.get(*handle))
            .map(|record| (record.set, record.id()))
            .collect();
        for (set_handle, id) in &targets {
            if let Some(set) = self.sets.get_mut(*set_handle) {
                set.set_member_visible(*id, visible);
            }
        }
        Ok(targets.len())
    }

    pub(super) fn set_feature_set_visible(
        &mut self,
        id: FeatureSetId,
        visible: bool,
    ) -> Result<()> {
        let handle = self.set_handle(id)?;
        if let Some(set) = self.sets.get_mut(handle) {
            set.set_visible(visible);
        }
        Ok(())
    }

    pub(super) fn set_feature_sets_visible(
        &mut self,
        query: &FeatureSetQuery,
        visible: bool,
    ) -> Result<usize> {
        let (matched, _) = self.matching_feature_sets(query)?;
        for handle in &matched {
            if let Some(set) = self.sets.get_mut(*handle) {
                set.set_visible(visible);
            }
        }
        Ok(matched.len())
    }
}
