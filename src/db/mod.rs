//! Core store implementation.
//!
//! This module defines [`RuntimeFeatureStore`], the in-memory feature data
//! store, along with the record arenas, secondary indices and query planner
//! behind it.

use crate::compute::quadtree::Quadtree;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::query::{FeatureQuery, FeatureSetQuery};
use crate::store::{ContentChangedListener, FeatureDataStore, ListenerId};
use crate::types::{
    Feature, FeatureDefinition, FeatureId, FeatureSet, FeatureSetDefinition, FeatureSetId,
    FeatureSetUpdate, FeatureUpdate, StoreStats,
};
use feature_types::GeometryType;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

mod arena;
mod bulk;
mod cursor;
mod filter;
mod internal;
mod planner;
mod records;
mod visibility;

pub use cursor::{Cursor, FeatureCursor, FeatureSetCursor, QueryStats};
pub use planner::{QueryPlan, SeedIndex};

use arena::Arena;
use records::{FeatureHandle, FeatureRecord, FeatureSetRecord, SetHandle, SpatialEntry};

/// In-memory feature data store.
///
/// Features and feature sets live in generational arenas. Features are
/// indexed by id, case-folded name, geometry type, owning set and envelope
/// (quadtree); feature sets by id and case-folded name. Queries pick the
/// cheapest index as their seed and filter the rest.
///
/// # Thread Safety
///
/// Every operation takes a re-entrant store lock, so a store can be shared
/// between threads behind an `Arc`. The thread holding the lock may re-enter
/// the store: change listeners run on the mutating thread while the lock is
/// held and may query or mutate the store themselves.
///
/// # Examples
///
/// ```rust
/// use feature_store::prelude::*;
///
/// let store = RuntimeFeatureStore::new();
///
/// let roads = store.insert_feature_set(FeatureSetDefinition::new("osm", "roads", "Roads"))?;
/// store.insert_feature(roads.id, FeatureDefinition::new("A1", Geometry::point(-0.12, 51.5)))?;
/// store.insert_feature(roads.id, FeatureDefinition::new("M25", Geometry::point(-0.5, 51.7)))?;
///
/// let query = FeatureQuery::new()
///     .feature_set_ids([roads.id])
///     .spatial(SpatialFilter::region(-0.2, 51.4, 0.0, 51.6));
/// let names: Vec<String> = store
///     .query_features(&query)?
///     .map(|feature| feature.name.clone())
///     .collect();
/// assert_eq!(names, vec!["A1".to_string()]);
/// # Ok::<(), feature_store::StoreError>(())
/// ```
///
/// ## Bulk modification
///
/// ```rust
/// use feature_store::prelude::*;
///
/// let store = RuntimeFeatureStore::new();
/// let set = store.insert_feature_set(FeatureSetDefinition::new("p", "t", "points"))?;
///
/// // Listeners are notified once, when the closure returns Ok
/// store.bulk(|store| {
///     for i in 0..10 {
///         store.insert_feature(set.id, FeatureDefinition::new("p", Geometry::point(i as f64, 0.0)))?;
///     }
///     Ok(())
/// })?;
/// assert_eq!(store.query_features_count(&FeatureQuery::new())?, 10);
/// # Ok::<(), feature_store::StoreError>(())
/// ```
pub struct RuntimeFeatureStore {
    uri: String,
    lock_timeout: Option<Duration>,
    state: ReentrantMutex<RefCell<StoreInner>>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ContentChangedListener>)>>,
    next_listener_id: AtomicU64,
}

pub(crate) struct StoreInner {
    /// Feature records (primary owner)
    pub features: Arena<FeatureRecord>,
    /// Feature set records (primary owner)
    pub sets: Arena<FeatureSetRecord>,
    /// Feature id to record, in id order
    pub feature_ids: BTreeMap<FeatureId, FeatureHandle>,
    /// Case-folded feature name to records
    pub feature_names: BTreeMap<String, FxHashSet<FeatureHandle>>,
    /// Geometry type to records
    pub feature_types: FxHashMap<GeometryType, FxHashSet<FeatureHandle>>,
    /// Feature id to owning set id
    pub feature_sets_of: FxHashMap<FeatureId, FeatureSetId>,
    /// Feature envelopes
    pub spatial: Quadtree<SpatialEntry>,
    /// Feature set id to record, in id order
    pub set_ids: BTreeMap<FeatureSetId, SetHandle>,
    /// Case-folded feature set name to records
    pub set_names: BTreeMap<String, FxHashSet<SetHandle>>,
    pub next_feature_id: FeatureId,
    pub next_set_id: FeatureSetId,
    /// Whether a bulk modification is in progress
    pub in_bulk: bool,
    /// Whether the store has been disposed
    pub disposed: bool,
    /// Store statistics
    pub stats: StoreStats,
}

type StateGuard<'a> = ReentrantMutexGuard<'a, RefCell<StoreInner>>;

impl RuntimeFeatureStore {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::from_parts(crate::builder::StoreRegistry::global().next_uri(), &Config::default())
    }

    /// Creates an empty store with the given configuration.
    ///
    /// Fails with `InvalidArgument` if the configuration does not validate.
    pub fn with_config(config: Config) -> Result<Self> {
        crate::builder::StoreBuilder::new().config(config).build()
    }

    pub(crate) fn from_parts(uri: String, config: &Config) -> Self {
        log::debug!("created feature store {}", uri);
        Self {
            uri,
            lock_timeout: config.lock_timeout(),
            state: ReentrantMutex::new(RefCell::new(StoreInner::new_with_config(config))),
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> Result<StateGuard<'_>> {
        match self.lock_timeout {
            Some(timeout) => self.state.try_lock_for(timeout).ok_or_else(|| {
                StoreError::lock(format!(
                    "timed out after {:?} waiting for store {}",
                    timeout, self.uri
                ))
            }),
            None => Ok(self.state.lock()),
        }
    }

    /// Run a read-only operation under the store lock.
    fn read<R>(&self, op: impl FnOnce(&StoreInner) -> Result<R>) -> Result<R> {
        let guard = self.lock()?;
        let inner = guard
            .try_borrow()
            .map_err(|_| StoreError::lock("store state is being mutated on this thread"))?;
        inner.ensure_open()?;
        op(&inner)
    }

    /// Run a mutation under the store lock, then notify listeners unless a
    /// bulk modification is in progress.
    fn mutate<R>(&self, op: impl FnOnce(&mut StoreInner) -> Result<R>) -> Result<R> {
        let guard = self.lock()?;
        let (result, notify) = {
            let mut inner = guard
                .try_borrow_mut()
                .map_err(|_| StoreError::lock("store state is already borrowed on this thread"))?;
            inner.ensure_open()?;
            let result = op(&mut inner)?;
            inner.stats.record_operation();
            let notify = !inner.in_bulk;
            if notify {
                inner.stats.record_notification();
            }
            (result, notify)
        };

        if notify {
            self.dispatch_changed();
        }
        drop(guard);
        Ok(result)
    }

    /// Notify every listener. Runs with the store lock held but the state
    /// unborrowed, so listeners may call back into the store.
    fn dispatch_changed(&self) {
        let listeners: Vec<Arc<dyn ContentChangedListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener.content_changed();
        }
    }

    fn feature_snapshots(inner: &StoreInner, handles: &[FeatureHandle]) -> Vec<Arc<Feature>> {
        handles
            .iter()
            .filter_map(|handle| inner.features.get(*handle))
            .map(|record| Arc::clone(&record.feature))
            .collect()
    }
}

impl Default for RuntimeFeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuntimeFeatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeFeatureStore")
            .field("uri", &self.uri)
            .field("lock_timeout", &self.lock_timeout)
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

impl FeatureDataStore for RuntimeFeatureStore {
    fn insert_feature_set(&self, definition: FeatureSetDefinition) -> Result<Arc<FeatureSet>> {
        self.mutate(|inner| inner.insert_feature_set(None, definition))
    }

    fn insert_feature_set_with_id(
        &self,
        id: FeatureSetId,
        definition: FeatureSetDefinition,
    ) -> Result<Arc<FeatureSet>> {
        self.mutate(|inner| inner.insert_feature_set(Some(id), definition))
    }

    fn update_feature_set(
        &self,
        id: FeatureSetId,
        update: FeatureSetUpdate,
    ) -> Result<Arc<FeatureSet>> {
        self.mutate(|inner| inner.update_feature_set(id, update))
    }

    fn delete_feature_set(&self, id: FeatureSetId) -> Result<()> {
        self.mutate(|inner| inner.delete_feature_set(id))
    }

    fn delete_all_feature_sets(&self) -> Result<usize> {
        self.mutate(|inner| inner.delete_all_feature_sets())
    }

    fn get_feature_set(&self, id: FeatureSetId) -> Result<Option<Arc<FeatureSet>>> {
        self.read(|inner| Ok(inner.set_record(id).map(|record| Arc::clone(&record.set))))
    }

    fn query_feature_sets(&self, query: &FeatureSetQuery) -> Result<FeatureSetCursor> {
        self.read(|inner| {
            let (handles, stats) = inner.matching_feature_sets(query)?;
            let sets = handles
                .iter()
                .filter_map(|handle| inner.sets.get(*handle))
                .map(|record| Arc::clone(&record.set))
                .collect();
            Ok(Cursor::new(sets, stats))
        })
    }

    fn query_feature_sets_count(&self, query: &FeatureSetQuery) -> Result<usize> {
        self.read(|inner| inner.count_feature_sets(query))
    }

    fn insert_feature(
        &self,
        set_id: FeatureSetId,
        definition: FeatureDefinition,
    ) -> Result<Arc<Feature>> {
        self.mutate(|inner| inner.insert_feature(set_id, None, definition))
    }

    fn insert_feature_with_id(
        &self,
        set_id: FeatureSetId,
        id: FeatureId,
        definition: FeatureDefinition,
    ) -> Result<Arc<Feature>> {
        self.mutate(|inner| inner.insert_feature(set_id, Some(id), definition))
    }

    fn insert_features(
        &self,
        set_id: FeatureSetId,
        definitions: Vec<FeatureDefinition>,
    ) -> Result<Vec<Arc<Feature>>> {
        self.mutate(|inner| inner.insert_features(set_id, definitions))
    }

    fn update_feature(&self, id: FeatureId, update: FeatureUpdate) -> Result<Arc<Feature>> {
        self.mutate(|inner| inner.update_feature(id, update))
    }

    fn delete_feature(&self, id: FeatureId) -> Result<()> {
        self.mutate(|inner| inner.delete_feature(id))
    }

    fn delete_features(&self, query: &FeatureQuery) -> Result<usize> {
        self.mutate(|inner| inner.delete_features(query))
    }

    fn delete_all_features(&self, set_id: FeatureSetId) -> Result<usize> {
        self.mutate(|inner| inner.delete_all_features(set_id))
    }

    fn get_feature(&self, id: FeatureId) -> Result<Option<Arc<Feature>>> {
        self.read(|inner| {
            Ok(inner
                .feature_record(id)
                .map(|record| Arc::clone(&record.feature)))
        })
    }

    fn query_features(&self, query: &FeatureQuery) -> Result<FeatureCursor> {
        self.read(|inner| {
            let (handles, stats) = inner.matching_features(query)?;
            Ok(Cursor::new(Self::feature_snapshots(inner, &handles), stats))
        })
    }

    fn query_features_count(&self, query: &FeatureQuery) -> Result<usize> {
        self.read(|inner| inner.count_features(query))
    }

    fn explain_features(&self, query: &FeatureQuery) -> Result<QueryPlan> {
        self.read(|inner| inner.explain_features(query))
    }

    fn is_feature_visible(&self, id: FeatureId) -> Result<bool> {
        self.read(|inner| inner.is_feature_visible(id))
    }

    fn is_feature_set_visible(&self, id: FeatureSetId) -> Result<bool> {
        self.read(|inner| inner.is_feature_set_visible(id))
    }

    fn set_feature_visible(&self, id: FeatureId, visible: bool) -> Result<()> {
        self.mutate(|inner| inner.set_feature_visible(id, visible))
    }

    fn set_features_visible(&self, query: &FeatureQuery, visible: bool) -> Result<usize> {
        self.mutate(|inner| inner.set_features_visible(query, visible))
    }

    fn set_feature_set_visible(&self, id: FeatureSetId, visible: bool) -> Result<()> {
        self.mutate(|inner| inner.set_feature_set_visible(id, visible))
    }

    fn set_feature_sets_visible(&self, query: &FeatureSetQuery, visible: bool) -> Result<usize> {
        self.mutate(|inner| inner.set_feature_sets_visible(query, visible))
    }

    fn begin_bulk_modification(&self) -> Result<()> {
        let guard = self.lock()?;
        let mut inner = guard
            .try_borrow_mut()
            .map_err(|_| StoreError::lock("store state is already borrowed on this thread"))?;
        inner.ensure_open()?;
        inner.begin_bulk()
    }

    fn end_bulk_modification(&self, successful: bool) -> Result<()> {
        let guard = self.lock()?;
        let notify = {
            let mut inner = guard
                .try_borrow_mut()
                .map_err(|_| StoreError::lock("store state is already borrowed on this thread"))?;
            inner.ensure_open()?;
            let notify = inner.end_bulk(successful)?;
            if notify {
                inner.stats.record_notification();
            }
            notify
        };
        if notify {
            self.dispatch_changed();
        }
        drop(guard);
        Ok(())
    }

    fn is_in_bulk_modification(&self) -> Result<bool> {
        self.read(|inner| Ok(inner.in_bulk))
    }

    fn add_content_changed_listener(
        &self,
        listener: Arc<dyn ContentChangedListener>,
    ) -> Result<ListenerId> {
        self.read(|_| Ok(()))?;
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        Ok(id)
    }

    fn remove_content_changed_listener(&self, id: ListenerId) -> Result<bool> {
        self.read(|_| Ok(()))?;
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        Ok(listeners.len() != before)
    }

    fn dispose(&self) -> Result<()> {
        let guard = self.lock()?;
        {
            let mut inner = guard
                .try_borrow_mut()
                .map_err(|_| StoreError::lock("store state is already borrowed on this thread"))?;
            if inner.disposed {
                return Ok(());
            }
            inner.clear();
            inner.in_bulk = false;
            inner.disposed = true;
        }
        self.listeners.write().clear();
        drop(guard);

        log::info!("disposed feature store {}", self.uri);
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.read(|inner| Ok(!inner.sets.is_empty()))
            .unwrap_or(false)
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn stats(&self) -> Result<StoreStats> {
        self.read(|inner| Ok(inner.stats()))
    }
}
