//! Internal store operations and index maintenance.

use super::StoreInner;
use super::arena::Arena;
use super::records::{
    FeatureHandle, FeatureRecord, FeatureSetRecord, SetHandle, SpatialEntry, name_key,
};
use crate::compute::quadtree::Quadtree;
use crate::compute::validation::{geometry_envelope, validate_required, validate_resolution};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::query::FeatureQuery;
use crate::types::{
    AttributeUpdateMode, Feature, FeatureDefinition, FeatureId, FeatureSet, FeatureSetDefinition,
    FeatureSetId, FeatureSetUpdate, FeatureUpdate, StoreStats,
};
use feature_types::{Envelope, GeometryType};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;

/// Remove `value` from the bucket under `key`, dropping the bucket once empty.
fn bucket_remove<K: Ord, V: Eq + Hash>(
    index: &mut BTreeMap<K, FxHashSet<V>>,
    key: &K,
    value: &V,
) {
    if let Some(bucket) = index.get_mut(key) {
        bucket.remove(value);
        if bucket.is_empty() {
            index.remove(key);
        }
    }
}

fn type_bucket_remove(
    index: &mut FxHashMap<GeometryType, FxHashSet<FeatureHandle>>,
    key: GeometryType,
    value: &FeatureHandle,
) {
    if let Some(bucket) = index.get_mut(&key) {
        bucket.remove(value);
        if bucket.is_empty() {
            index.remove(&key);
        }
    }
}

/// Next id issued by a counter, honouring a caller-chosen id when present.
///
/// The counter always ends strictly above every id handed out, so an id the
/// counter cannot move past is refused rather than issued twice.
fn allocate_id(counter: &mut u64, requested: Option<u64>) -> Result<u64> {
    match requested {
        Some(id) => {
            let next = id.checked_add(1).ok_or_else(|| {
                StoreError::invalid(format!("id {} is beyond the assignable range", id))
            })?;
            *counter = (*counter).max(next);
            Ok(id)
        }
        None => {
            let id = *counter;
            *counter = id
                .checked_add(1)
                .ok_or_else(|| StoreError::illegal("id space is exhausted"))?;
            Ok(id)
        }
    }
}

/// Fails unless `count` more ids can be issued automatically.
fn reserve_ids(counter: u64, count: usize) -> Result<()> {
    u64::try_from(count)
        .ok()
        .and_then(|count| counter.checked_add(count))
        .map(|_| ())
        .ok_or_else(|| StoreError::illegal("id space is exhausted"))
}

/// A validated feature definition, ready to be indexed.
pub(super) struct PreparedFeature {
    definition: FeatureDefinition,
    envelope: Envelope,
}

impl StoreInner {
    pub(crate) fn new_with_config(config: &Config) -> Self {
        Self {
            features: Arena::new(),
            sets: Arena::new(),
            feature_ids: BTreeMap::new(),
            feature_names: BTreeMap::new(),
            feature_types: FxHashMap::default(),
            feature_sets_of: FxHashMap::default(),
            spatial: Quadtree::new(
                config.world_bounds,
                config.quadtree_node_capacity,
                config.quadtree_max_depth,
                SpatialEntry::bounds as fn(&SpatialEntry) -> Envelope,
            ),
            set_ids: BTreeMap::new(),
            set_names: BTreeMap::new(),
            next_feature_id: 1,
            next_set_id: 1,
            in_bulk: false,
            disposed: false,
            stats: StoreStats::default(),
        }
    }

    pub(super) fn ensure_open(&self) -> Result<()> {
        if self.disposed {
            return Err(StoreError::illegal("store has been disposed"));
        }
        Ok(())
    }

    pub(super) fn set_handle(&self, id: FeatureSetId) -> Result<SetHandle> {
        self.set_ids
            .get(&id)
            .copied()
            .ok_or_else(|| StoreError::invalid(format!("no feature set with id {}", id)))
    }

    pub(super) fn feature_handle(&self, id: FeatureId) -> Result<FeatureHandle> {
        self.feature_ids
            .get(&id)
            .copied()
            .ok_or_else(|| StoreError::invalid(format!("no feature with id {}", id)))
    }

    pub(super) fn feature_record(&self, id: FeatureId) -> Option<&FeatureRecord> {
        self.feature_ids
            .get(&id)
            .and_then(|handle| self.features.get(*handle))
    }

    pub(super) fn set_record(&self, id: FeatureSetId) -> Option<&FeatureSetRecord> {
        self.set_ids
            .get(&id)
            .and_then(|handle| self.sets.get(*handle))
    }

    pub(super) fn stats(&self) -> StoreStats {
        StoreStats {
            feature_count: self.features.len(),
            feature_set_count: self.sets.len(),
            quadtree_nodes: self.spatial.node_count(),
            ..self.stats.clone()
        }
    }

    // ===== Feature sets =====

    pub(super) fn insert_feature_set(
        &mut self,
        requested: Option<FeatureSetId>,
        definition: FeatureSetDefinition,
    ) -> Result<Arc<FeatureSet>> {
        validate_required("provider", &definition.provider)?;
        validate_required("type", &definition.set_type)?;
        validate_required("name", &definition.name)?;
        validate_resolution(definition.min_resolution, definition.max_resolution)?;
        if let Some(id) = requested {
            if id == 0 {
                return Err(StoreError::invalid("feature set id 0 is reserved"));
            }
            if self.set_ids.contains_key(&id) {
                return Err(StoreError::invalid(format!(
                    "feature set id {} is already in use",
                    id
                )));
            }
        }

        let id = allocate_id(&mut self.next_set_id, requested)?;
        let set = Arc::new(FeatureSet {
            id,
            version: 1,
            provider: definition.provider,
            set_type: definition.set_type,
            name: definition.name,
            min_resolution: definition.min_resolution,
            max_resolution: definition.max_resolution,
        });

        let record = FeatureSetRecord::new(Arc::clone(&set));
        let key = record.name_key.clone();
        let handle = self.sets.insert(record);
        self.set_ids.insert(id, handle);
        self.set_names.entry(key).or_default().insert(handle);

        log::debug!("inserted feature set {} ({})", id, set.name);
        Ok(set)
    }

    pub(super) fn update_feature_set(
        &mut self,
        id: FeatureSetId,
        update: FeatureSetUpdate,
    ) -> Result<Arc<FeatureSet>> {
        let handle = self.set_handle(id)?;
        if let Some(name) = &update.name {
            validate_required("name", name)?;
        }
        if let Some((min, max)) = update.resolution {
            validate_resolution(min, max)?;
        }

        let record = self
            .sets
            .get_mut(handle)
            .ok_or_else(|| StoreError::illegal(format!("feature set {} has no record", id)))?;
        let old = &record.set;
        let mut next = FeatureSet {
            version: old.version + 1,
            ..FeatureSet::clone(old)
        };
        if let Some((min, max)) = update.resolution {
            next.min_resolution = min;
            next.max_resolution = max;
        }

        let old_key = record.name_key.clone();
        if let Some(name) = update.name {
            next.name = name;
            record.name_key = name_key(&next.name);
        }
        let new_key = record.name_key.clone();
        let set = Arc::new(next);
        record.set = Arc::clone(&set);

        if new_key != old_key {
            bucket_remove(&mut self.set_names, &old_key, &handle);
            self.set_names.entry(new_key).or_default().insert(handle);
        }
        Ok(set)
    }

    /// Delete a set and cascade to its features.
    pub(super) fn delete_feature_set(&mut self, id: FeatureSetId) -> Result<()> {
        let handle = self.set_handle(id)?;
        let members: Vec<FeatureHandle> = self
            .sets
            .get(handle)
            .map(|record| record.members.iter().copied().collect())
            .unwrap_or_default();
        let cascaded = members.len();
        for member in members {
            self.remove_feature(member, false);
        }

        if let Some(record) = self.sets.remove(handle) {
            bucket_remove(&mut self.set_names, &record.name_key, &handle);
        }
        self.set_ids.remove(&id);

        log::debug!("deleted feature set {} with {} features", id, cascaded);
        Ok(())
    }

    pub(super) fn delete_all_feature_sets(&mut self) -> Result<usize> {
        let ids: Vec<FeatureSetId> = self.set_ids.keys().copied().collect();
        for id in &ids {
            self.delete_feature_set(*id)?;
        }
        Ok(ids.len())
    }

    // ===== Features =====

    /// Validate a definition without touching the store.
    pub(super) fn prepare_feature(&self, definition: FeatureDefinition) -> Result<PreparedFeature> {
        let envelope = geometry_envelope(&definition.geometry)?;
        if !definition.extrude.is_finite() {
            return Err(StoreError::invalid(format!(
                "extrude must be finite, got: {}",
                definition.extrude
            )));
        }
        Ok(PreparedFeature {
            definition,
            envelope,
        })
    }

    pub(super) fn check_feature_id(&self, id: FeatureId) -> Result<()> {
        if id == 0 {
            return Err(StoreError::invalid("feature id 0 is reserved"));
        }
        if self.feature_ids.contains_key(&id) {
            return Err(StoreError::invalid(format!(
                "feature id {} is already in use",
                id
            )));
        }
        Ok(())
    }

    /// Index a prepared feature. The set and any requested id must already be
    /// validated.
    pub(super) fn insert_prepared(
        &mut self,
        set_handle: SetHandle,
        requested: Option<FeatureId>,
        prepared: PreparedFeature,
    ) -> Result<Arc<Feature>> {
        let set_id = self
            .sets
            .get(set_handle)
            .map(|record| record.set.id)
            .ok_or_else(|| StoreError::illegal("feature set vanished during insert"))?;

        let PreparedFeature {
            definition,
            envelope,
        } = prepared;
        let id = allocate_id(&mut self.next_feature_id, requested)?;
        let key = name_key(&definition.name);
        let feature = Arc::new(Feature {
            id,
            feature_set_id: set_id,
            version: 1,
            name: definition.name,
            geometry: Arc::new(definition.geometry),
            style: definition.style.map(Arc::new),
            attributes: Arc::new(definition.attributes),
            altitude_mode: definition.altitude_mode,
            extrude: definition.extrude,
        });
        let geometry_type = feature.geometry_type();

        let handle = self.features.insert(FeatureRecord {
            feature: Arc::clone(&feature),
            set: set_handle,
            envelope,
            name_key: key.clone(),
        });
        self.feature_ids.insert(id, handle);
        self.feature_names.entry(key).or_default().insert(handle);
        self.feature_types
            .entry(geometry_type)
            .or_default()
            .insert(handle);
        self.feature_sets_of.insert(id, set_id);
        self.spatial.add(SpatialEntry::new(handle, envelope));
        if let Some(set) = self.sets.get_mut(set_handle) {
            set.members.insert(handle);
        }

        Ok(feature)
    }

    pub(super) fn insert_feature(
        &mut self,
        set_id: FeatureSetId,
        requested: Option<FeatureId>,
        definition: FeatureDefinition,
    ) -> Result<Arc<Feature>> {
        let set_handle = self.set_handle(set_id)?;
        if let Some(id) = requested {
            self.check_feature_id(id)?;
        }
        let prepared = self.prepare_feature(definition)?;
        self.insert_prepared(set_handle, requested, prepared)
    }

    /// Insert a batch into one set. Every definition is validated first so a
    /// bad entry leaves the store untouched.
    pub(super) fn insert_features(
        &mut self,
        set_id: FeatureSetId,
        definitions: Vec<FeatureDefinition>,
    ) -> Result<Vec<Arc<Feature>>> {
        let set_handle = self.set_handle(set_id)?;
        let prepared = definitions
            .into_iter()
            .map(|definition| self.prepare_feature(definition))
            .collect::<Result<Vec<_>>>()?;
        reserve_ids(self.next_feature_id, prepared.len())?;

        prepared
            .into_iter()
            .map(|p| self.insert_prepared(set_handle, None, p))
            .collect()
    }

    pub(super) fn update_feature(
        &mut self,
        id: FeatureId,
        update: FeatureUpdate,
    ) -> Result<Arc<Feature>> {
        let handle = self.feature_handle(id)?;
        let envelope = update.geometry.as_ref().map(geometry_envelope).transpose()?;
        if let Some(extrude) = update.extrude
            && !extrude.is_finite()
        {
            return Err(StoreError::invalid(format!(
                "extrude must be finite, got: {}",
                extrude
            )));
        }

        let record = self
            .features
            .get_mut(handle)
            .ok_or_else(|| StoreError::illegal(format!("feature {} has no record", id)))?;
        let old = Arc::clone(&record.feature);

        let attributes = match update.attributes {
            None => Arc::clone(&old.attributes),
            Some((attributes, AttributeUpdateMode::Replace)) => Arc::new(attributes),
            Some((attributes, AttributeUpdateMode::AddOrReplace)) => {
                let mut merged = (*old.attributes).clone();
                merged.merge(&attributes);
                Arc::new(merged)
            }
        };
        let feature = Arc::new(Feature {
            id,
            feature_set_id: old.feature_set_id,
            version: old.version + 1,
            name: update.name.unwrap_or_else(|| old.name.clone()),
            geometry: update
                .geometry
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&old.geometry)),
            style: match update.style {
                Some(style) => style.map(Arc::new),
                None => old.style.clone(),
            },
            attributes,
            altitude_mode: update.altitude_mode.unwrap_or(old.altitude_mode),
            extrude: update.extrude.unwrap_or(old.extrude),
        });

        let old_key = std::mem::replace(&mut record.name_key, name_key(&feature.name));
        let new_key = record.name_key.clone();
        record.feature = Arc::clone(&feature);
        if let Some(envelope) = envelope {
            record.envelope = envelope;
        }

        if old_key != new_key {
            bucket_remove(&mut self.feature_names, &old_key, &handle);
            self.feature_names.entry(new_key).or_default().insert(handle);
        }
        let (old_type, new_type) = (old.geometry_type(), feature.geometry_type());
        if old_type != new_type {
            type_bucket_remove(&mut self.feature_types, old_type, &handle);
            self.feature_types.entry(new_type).or_default().insert(handle);
        }
        if let Some(envelope) = envelope {
            self.spatial.refresh(SpatialEntry::new(handle, envelope));
        }

        Ok(feature)
    }

    pub(super) fn delete_feature(&mut self, id: FeatureId) -> Result<()> {
        let handle = self.feature_handle(id)?;
        self.remove_feature(handle, true);
        Ok(())
    }

    pub(super) fn delete_features(&mut self, query: &FeatureQuery) -> Result<usize> {
        let (matched, _) = self.matching_features(query)?;
        for handle in &matched {
            self.remove_feature(*handle, true);
        }
        Ok(matched.len())
    }

    /// Delete every feature of a set, keeping the set itself.
    pub(super) fn delete_all_features(&mut self, set_id: FeatureSetId) -> Result<usize> {
        let set_handle = self.set_handle(set_id)?;
        let members: Vec<FeatureHandle> = match self.sets.get_mut(set_handle) {
            Some(record) => {
                record.deviations.clear();
                record.members.drain().collect()
            }
            None => Vec::new(),
        };
        let count = members.len();
        for member in members {
            self.remove_feature(member, false);
        }
        Ok(count)
    }

    /// Drop a feature from every index, the primary map last.
    ///
    /// `maintain_set` is false when the owning set is being emptied or
    /// deleted and its member list is handled by the caller.
    pub(super) fn remove_feature(&mut self, handle: FeatureHandle, maintain_set: bool) {
        let Some(record) = self.features.get(handle) else {
            return;
        };
        let id = record.id();
        let set_handle = record.set;
        let geometry_type = record.feature.geometry_type();
        let key = record.name_key.clone();
        let envelope = record.envelope;

        self.spatial.remove(&SpatialEntry::new(handle, envelope));
        bucket_remove(&mut self.feature_names, &key, &handle);
        type_bucket_remove(&mut self.feature_types, geometry_type, &handle);
        if maintain_set && let Some(set) = self.sets.get_mut(set_handle) {
            set.members.remove(&handle);
            set.forget_member(id);
        }
        self.feature_sets_of.remove(&id);
        self.feature_ids.remove(&id);
        self.features.remove(handle);
    }

    /// Release every record and index.
    pub(super) fn clear(&mut self) {
        self.spatial.clear();
        self.feature_names.clear();
        self.feature_types.clear();
        self.feature_sets_of.clear();
        self.feature_ids.clear();
        self.features.clear();
        self.set_names.clear();
        self.set_ids.clear();
        self.sets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_types::Geometry;

    fn inner() -> StoreInner {
        StoreInner::new_with_config(&Config::default())
    }

    fn set_def(name: &str) -> FeatureSetDefinition {
        FeatureSetDefinition::new("provider", "type", name)
    }

    fn point(name: &str, x: f64, y: f64) -> FeatureDefinition {
        FeatureDefinition::new(name, Geometry::point(x, y))
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut inner = inner();
        let a = inner.insert_feature_set(None, set_def("a")).unwrap();
        let b = inner.insert_feature_set(None, set_def("b")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let f = inner.insert_feature(a.id, None, point("f", 0.0, 0.0)).unwrap();
        assert_eq!(f.id, 1);
        assert_eq!(f.version, 1);
        assert_eq!(f.feature_set_id, a.id);
    }

    #[test]
    fn test_explicit_id_advances_counter() {
        let mut inner = inner();
        let set = inner.insert_feature_set(Some(10), set_def("a")).unwrap();
        assert_eq!(set.id, 10);
        assert_eq!(inner.insert_feature_set(None, set_def("b")).unwrap().id, 11);

        assert!(inner.insert_feature_set(Some(10), set_def("c")).is_err());
        assert!(inner.insert_feature_set(Some(0), set_def("c")).is_err());

        inner.insert_feature(10, Some(50), point("f", 0.0, 0.0)).unwrap();
        assert!(inner.insert_feature(10, Some(50), point("g", 0.0, 0.0)).is_err());
        assert_eq!(inner.insert_feature(10, None, point("g", 0.0, 0.0)).unwrap().id, 51);
    }

    #[test]
    fn test_id_counter_never_reissues() {
        let mut inner = inner();
        assert!(matches!(
            inner.insert_feature_set(Some(u64::MAX), set_def("max")),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(inner.set_ids.is_empty());

        let last = inner.insert_feature_set(Some(u64::MAX - 1), set_def("last")).unwrap();
        assert!(matches!(
            inner.insert_feature_set(None, set_def("next")),
            Err(StoreError::IllegalState(_))
        ));
        assert_eq!(inner.sets.len(), 1);

        assert!(matches!(
            inner.insert_feature(last.id, Some(u64::MAX), point("max", 0.0, 0.0)),
            Err(StoreError::InvalidArgument(_))
        ));
        inner
            .insert_feature(last.id, Some(u64::MAX - 2), point("a", 0.0, 0.0))
            .unwrap();
        assert!(matches!(
            inner.insert_features(last.id, vec![point("b", 0.0, 0.0), point("c", 0.0, 0.0)]),
            Err(StoreError::IllegalState(_))
        ));
        assert_eq!(inner.features.len(), 1);

        let b = inner.insert_feature(last.id, None, point("b", 0.0, 0.0)).unwrap();
        assert_eq!(b.id, u64::MAX - 1);
        assert!(inner.insert_feature(last.id, None, point("c", 0.0, 0.0)).is_err());
        assert_eq!(inner.features.len(), 2);
        assert_eq!(inner.spatial.len(), 2);
    }

    #[test]
    fn test_insert_validation() {
        let mut inner = inner();
        assert!(inner
            .insert_feature_set(None, FeatureSetDefinition::new("", "t", "n"))
            .is_err());
        assert!(inner
            .insert_feature_set(None, set_def("n").with_resolution(10.0, 5000.0))
            .is_err());

        let set = inner.insert_feature_set(None, set_def("a")).unwrap();
        assert!(inner.insert_feature(99, None, point("f", 0.0, 0.0)).is_err());
        let empty = FeatureDefinition::new("empty", Geometry::LineString(geo::LineString::new(vec![])));
        assert!(inner.insert_feature(set.id, None, empty).is_err());
        assert_eq!(inner.features.len(), 0);
        assert_eq!(inner.next_feature_id, 1);
    }

    #[test]
    fn test_batch_insert_is_all_or_nothing() {
        let mut inner = inner();
        let set = inner.insert_feature_set(None, set_def("a")).unwrap();
        let bad = FeatureDefinition::new("bad", Geometry::point(f64::NAN, 0.0));
        let result = inner.insert_features(set.id, vec![point("a", 0.0, 0.0), bad]);
        assert!(result.is_err());
        assert!(inner.features.is_empty());
        assert!(inner.spatial.is_empty());

        let inserted = inner
            .insert_features(set.id, vec![point("a", 0.0, 0.0), point("b", 1.0, 1.0)])
            .unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(inner.spatial.len(), 2);
    }

    #[test]
    fn test_update_moves_index_entries() {
        let mut inner = inner();
        let set = inner.insert_feature_set(None, set_def("a")).unwrap();
        let f = inner.insert_feature(set.id, None, point("Old", 0.0, 0.0)).unwrap();

        let updated = inner
            .update_feature(
                f.id,
                FeatureUpdate::new()
                    .name("New")
                    .geometry(Geometry::from_envelope(&Envelope::new(10.0, 10.0, 11.0, 11.0))),
            )
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "New");

        assert!(!inner.feature_names.contains_key("old"));
        assert_eq!(inner.feature_names["new"].len(), 1);
        assert!(!inner.feature_types.contains_key(&GeometryType::Point));
        assert_eq!(inner.feature_types[&GeometryType::Polygon].len(), 1);
        assert!(inner.spatial.query(&Envelope::new(-1.0, -1.0, 1.0, 1.0)).is_empty());
        assert_eq!(inner.spatial.size(&Envelope::new(9.0, 9.0, 12.0, 12.0)), 1);

        // the old snapshot is untouched
        assert_eq!(f.name, "Old");
        assert_eq!(f.version, 1);
    }

    #[test]
    fn test_update_shares_unchanged_parts() {
        let mut inner = inner();
        let set = inner.insert_feature_set(None, set_def("a")).unwrap();
        let f = inner.insert_feature(set.id, None, point("f", 0.0, 0.0)).unwrap();
        let updated = inner
            .update_feature(f.id, FeatureUpdate::new().extrude(3.0))
            .unwrap();
        assert!(Arc::ptr_eq(&f.geometry, &updated.geometry));
        assert!(Arc::ptr_eq(&f.attributes, &updated.attributes));
        assert_eq!(updated.extrude, 3.0);
    }

    #[test]
    fn test_delete_set_cascades() {
        let mut inner = inner();
        let a = inner.insert_feature_set(None, set_def("a")).unwrap();
        let b = inner.insert_feature_set(None, set_def("b")).unwrap();
        for i in 0..10 {
            inner.insert_feature(a.id, None, point("x", i as f64, 0.0)).unwrap();
        }
        let kept = inner.insert_feature(b.id, None, point("y", 0.0, 0.0)).unwrap();

        inner.delete_feature_set(a.id).unwrap();
        assert_eq!(inner.features.len(), 1);
        assert_eq!(inner.spatial.len(), 1);
        assert!(!inner.feature_names.contains_key("x"));
        assert!(inner.feature_record(kept.id).is_some());
        assert!(inner.set_record(a.id).is_none());
        assert!(!inner.set_names.contains_key("a"));
        assert!(inner.delete_feature_set(a.id).is_err());
    }

    #[test]
    fn test_delete_all_features_keeps_set() {
        let mut inner = inner();
        let set = inner.insert_feature_set(None, set_def("a")).unwrap();
        inner.insert_feature(set.id, None, point("x", 0.0, 0.0)).unwrap();
        inner.insert_feature(set.id, None, point("y", 1.0, 0.0)).unwrap();

        assert_eq!(inner.delete_all_features(set.id).unwrap(), 2);
        assert!(inner.features.is_empty());
        assert!(inner.feature_ids.is_empty());
        assert!(inner.set_record(set.id).unwrap().members.is_empty());
    }

    #[test]
    fn test_update_feature_set_renames_index() {
        let mut inner = inner();
        let set = inner.insert_feature_set(None, set_def("Roads")).unwrap();
        let updated = inner
            .update_feature_set(set.id, FeatureSetUpdate::new().name("Rails").resolution(100.0, 1.0))
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.min_resolution, 100.0);
        assert!(!inner.set_names.contains_key("roads"));
        assert!(inner.set_names.contains_key("rails"));
        assert!(inner
            .update_feature_set(set.id, FeatureSetUpdate::new().name(""))
            .is_err());
    }
}
