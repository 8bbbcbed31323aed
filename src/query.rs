//! Query parameters for features and feature sets.
//!
//! Every list-valued field is optional: `None` leaves the predicate out of the
//! query, while `Some(vec![])` is a predicate that matches nothing. String
//! lists accept `%` wildcards (`abc%`, `%abc`, or `%` alone) and compare
//! case-insensitively.

use crate::types::{FeatureId, FeatureSetId};
use feature_types::{Envelope, GeometryType};
use geo::Point;

/// Spatial predicate of a feature query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialFilter {
    /// Features whose envelope intersects the region.
    Region(Envelope),
    /// Features within `meters` of `center` (haversine distance to the
    /// nearest point of the feature's envelope).
    Radius { center: Point, meters: f64 },
}

impl SpatialFilter {
    pub fn region(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        SpatialFilter::Region(Envelope::new(min_x, min_y, max_x, max_y))
    }

    pub fn radius(center: Point, meters: f64) -> Self {
        SpatialFilter::Radius { center, meters }
    }
}

/// Feature result ordering. Several orders apply lexicographically.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureOrder {
    Id,
    /// Case-insensitive name order.
    Name,
    FeatureSetId,
    /// Nearest first, measured to the center of the feature's envelope.
    Distance(Point),
    /// Position of the geometry type in the list; unlisted types sort last.
    GeometryType(Vec<GeometryType>),
}

/// Feature-set result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSetOrder {
    Id,
    Name,
    Provider,
    Type,
}

/// Parameters for feature queries.
///
/// # Examples
///
/// ```
/// use feature_store::{FeatureOrder, FeatureQuery, SpatialFilter};
///
/// let query = FeatureQuery::new()
///     .feature_set_ids([1, 2])
///     .names(["road%"])
///     .spatial(SpatialFilter::region(-75.0, 40.0, -73.0, 41.0))
///     .visible_only(true)
///     .order_by(FeatureOrder::Name)
///     .limit(10);
///
/// assert!(query.has_predicates());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureQuery {
    pub ids: Option<Vec<FeatureId>>,
    pub names: Option<Vec<String>>,
    pub providers: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub feature_set_ids: Option<Vec<FeatureSetId>>,
    pub feature_set_names: Option<Vec<String>>,
    pub spatial: Option<SpatialFilter>,
    pub min_resolution: Option<f64>,
    pub max_resolution: Option<f64>,
    pub geometry_types: Option<Vec<GeometryType>>,
    pub visible_only: bool,
    pub order: Vec<FeatureOrder>,
    pub offset: usize,
    pub limit: Option<usize>,
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

/// A resolution bound of 0 or NaN leaves that side unconstrained.
fn resolution_bound(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan() && *v != 0.0)
}

impl FeatureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: impl IntoIterator<Item = FeatureId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(strings(names));
        self
    }

    pub fn providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(strings(providers));
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(strings(types));
        self
    }

    pub fn feature_set_ids(mut self, ids: impl IntoIterator<Item = FeatureSetId>) -> Self {
        self.feature_set_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn feature_set_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_set_names = Some(strings(names));
        self
    }

    pub fn spatial(mut self, filter: SpatialFilter) -> Self {
        self.spatial = Some(filter);
        self
    }

    /// Only sets displayable at resolutions between `min` (coarsest) and
    /// `max` (finest). Pass 0 to leave a side open.
    pub fn resolution(mut self, min_resolution: f64, max_resolution: f64) -> Self {
        self.min_resolution = Some(min_resolution);
        self.max_resolution = Some(max_resolution);
        self
    }

    pub fn geometry_types(mut self, types: impl IntoIterator<Item = GeometryType>) -> Self {
        self.geometry_types = Some(types.into_iter().collect());
        self
    }

    pub fn visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    pub fn order_by(mut self, order: FeatureOrder) -> Self {
        self.order.push(order);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn effective_min_resolution(&self) -> Option<f64> {
        resolution_bound(self.min_resolution)
    }

    pub(crate) fn effective_max_resolution(&self) -> Option<f64> {
        resolution_bound(self.max_resolution)
    }

    /// True when any predicate touches the owning feature set.
    pub fn has_set_predicates(&self) -> bool {
        self.feature_set_ids.is_some()
            || self.feature_set_names.is_some()
            || self.providers.is_some()
            || self.types.is_some()
            || self.effective_min_resolution().is_some()
            || self.effective_max_resolution().is_some()
    }

    /// True when any predicate restricts the result.
    pub fn has_predicates(&self) -> bool {
        self.ids.is_some()
            || self.names.is_some()
            || self.spatial.is_some()
            || self.geometry_types.is_some()
            || self.visible_only
            || self.has_set_predicates()
    }

    pub(crate) fn is_paged(&self) -> bool {
        self.offset > 0 || self.limit.is_some()
    }
}

/// Parameters for feature-set queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSetQuery {
    pub ids: Option<Vec<FeatureSetId>>,
    pub names: Option<Vec<String>>,
    pub providers: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub min_resolution: Option<f64>,
    pub max_resolution: Option<f64>,
    pub visible_only: bool,
    pub order: Vec<FeatureSetOrder>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl FeatureSetQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: impl IntoIterator<Item = FeatureSetId>) -> Self {
        self.ids = Some(ids.into_iter().collect());
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(strings(names));
        self
    }

    pub fn providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.providers = Some(strings(providers));
        self
    }

    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(strings(types));
        self
    }

    pub fn resolution(mut self, min_resolution: f64, max_resolution: f64) -> Self {
        self.min_resolution = Some(min_resolution);
        self.max_resolution = Some(max_resolution);
        self
    }

    pub fn visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    pub fn order_by(mut self, order: FeatureSetOrder) -> Self {
        self.order.push(order);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn effective_min_resolution(&self) -> Option<f64> {
        resolution_bound(self.min_resolution)
    }

    pub(crate) fn effective_max_resolution(&self) -> Option<f64> {
        resolution_bound(self.max_resolution)
    }

    pub fn has_predicates(&self) -> bool {
        self.ids.is_some()
            || self.names.is_some()
            || self.providers.is_some()
            || self.types.is_some()
            || self.effective_min_resolution().is_some()
            || self.effective_max_resolution().is_some()
            || self.visible_only
    }

    pub(crate) fn is_paged(&self) -> bool {
        self.offset > 0 || self.limit.is_some()
    }
}
