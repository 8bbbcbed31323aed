//! The feature data store contract.
//!
//! [`FeatureDataStore`] is the interface every feature store exposes;
//! [`RuntimeFeatureStore`](crate::RuntimeFeatureStore) is the in-memory,
//! fully indexed implementation.

use crate::db::{FeatureCursor, FeatureSetCursor, QueryPlan};
use crate::error::Result;
use crate::query::{FeatureQuery, FeatureSetQuery};
use crate::types::{
    Feature, FeatureDefinition, FeatureId, FeatureSet, FeatureSetDefinition, FeatureSetId,
    FeatureSetUpdate, FeatureUpdate, StoreStats,
};
use std::sync::Arc;

/// Receives a notification whenever the store's content changes.
///
/// Callbacks run synchronously on the mutating thread while the store lock is
/// held. They may call back into the store.
pub trait ContentChangedListener: Send + Sync {
    fn content_changed(&self);
}

impl<F> ContentChangedListener for F
where
    F: Fn() + Send + Sync,
{
    fn content_changed(&self) {
        self()
    }
}

/// Identifies a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Feature data store operations.
///
/// Mutations notify registered listeners once each, except inside a bulk
/// modification, which notifies once when it ends successfully.
pub trait FeatureDataStore: Send + Sync {
    // ===== Feature sets =====

    /// Insert a feature set with a store-issued id.
    fn insert_feature_set(&self, definition: FeatureSetDefinition) -> Result<Arc<FeatureSet>>;

    /// Insert a feature set with a caller-chosen id.
    fn insert_feature_set_with_id(
        &self,
        id: FeatureSetId,
        definition: FeatureSetDefinition,
    ) -> Result<Arc<FeatureSet>>;

    fn update_feature_set(&self, id: FeatureSetId, update: FeatureSetUpdate)
    -> Result<Arc<FeatureSet>>;

    /// Delete a feature set and every feature in it.
    fn delete_feature_set(&self, id: FeatureSetId) -> Result<()>;

    /// Delete every feature set. Returns how many were deleted.
    fn delete_all_feature_sets(&self) -> Result<usize>;

    fn get_feature_set(&self, id: FeatureSetId) -> Result<Option<Arc<FeatureSet>>>;

    fn query_feature_sets(&self, query: &FeatureSetQuery) -> Result<FeatureSetCursor>;

    fn query_feature_sets_count(&self, query: &FeatureSetQuery) -> Result<usize>;

    // ===== Features =====

    fn insert_feature(
        &self,
        set_id: FeatureSetId,
        definition: FeatureDefinition,
    ) -> Result<Arc<Feature>>;

    fn insert_feature_with_id(
        &self,
        set_id: FeatureSetId,
        id: FeatureId,
        definition: FeatureDefinition,
    ) -> Result<Arc<Feature>>;

    /// Insert several features into one set. Either all are inserted or none.
    fn insert_features(
        &self,
        set_id: FeatureSetId,
        definitions: Vec<FeatureDefinition>,
    ) -> Result<Vec<Arc<Feature>>>;

    fn update_feature(&self, id: FeatureId, update: FeatureUpdate) -> Result<Arc<Feature>>;

    fn delete_feature(&self, id: FeatureId) -> Result<()>;

    /// Delete every feature matching the query. Returns how many were deleted.
    fn delete_features(&self, query: &FeatureQuery) -> Result<usize>;

    /// Delete every feature of a set, keeping the set.
    fn delete_all_features(&self, set_id: FeatureSetId) -> Result<usize>;

    fn get_feature(&self, id: FeatureId) -> Result<Option<Arc<Feature>>>;

    fn query_features(&self, query: &FeatureQuery) -> Result<FeatureCursor>;

    fn query_features_count(&self, query: &FeatureQuery) -> Result<usize>;

    /// The plan the query would run with, without running it.
    fn explain_features(&self, query: &FeatureQuery) -> Result<QueryPlan>;

    // ===== Visibility =====

    fn is_feature_visible(&self, id: FeatureId) -> Result<bool>;

    fn is_feature_set_visible(&self, id: FeatureSetId) -> Result<bool>;

    fn set_feature_visible(&self, id: FeatureId, visible: bool) -> Result<()>;

    /// Set the visibility of every matching feature. Returns the match count.
    fn set_features_visible(&self, query: &FeatureQuery, visible: bool) -> Result<usize>;

    fn set_feature_set_visible(&self, id: FeatureSetId, visible: bool) -> Result<()>;

    /// Set the visibility of every matching set. Returns the match count.
    fn set_feature_sets_visible(&self, query: &FeatureSetQuery, visible: bool) -> Result<usize>;

    // ===== Bulk modification =====

    fn begin_bulk_modification(&self) -> Result<()>;

    /// End the bulk modification. Listeners are notified once if `successful`.
    /// Mutations made inside it are kept either way.
    fn end_bulk_modification(&self, successful: bool) -> Result<()>;

    fn is_in_bulk_modification(&self) -> Result<bool>;

    /// Run `f` inside a bulk modification, ending it successfully when `f`
    /// returns `Ok`.
    fn bulk<R, F>(&self, f: F) -> Result<R>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<R>,
    {
        self.begin_bulk_modification()?;
        let result = f(self);
        self.end_bulk_modification(result.is_ok())?;
        result
    }

    // ===== Listeners and lifecycle =====

    fn add_content_changed_listener(
        &self,
        listener: Arc<dyn ContentChangedListener>,
    ) -> Result<ListenerId>;

    fn remove_content_changed_listener(&self, id: ListenerId) -> Result<bool>;

    /// Release every record. Later operations fail with `IllegalState`.
    fn dispose(&self) -> Result<()>;

    /// True while the store is open and holds at least one feature set.
    fn is_available(&self) -> bool;

    fn uri(&self) -> &str;

    fn stats(&self) -> Result<StoreStats>;
}
