//! Record filters applied after the planner seeds its candidates.

use super::records::{FeatureRecord, FeatureSetRecord};
use crate::compute::spatial::distance_to_envelope;
use crate::compute::wildcard::WildcardMatcher;
use crate::error::Result;
use crate::query::{FeatureQuery, FeatureSetQuery};
use crate::types::{FeatureId, FeatureSet, FeatureSetId};
use feature_types::{Envelope, GeometryType};
use geo::Point;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Resolution containment for a set.
///
/// A query `min` passes sets whose `min_resolution` is unbounded or not
/// coarser than it; a query `max` passes sets whose `max_resolution` is
/// unbounded or not finer than it.
pub(crate) fn resolution_accepts(set: &FeatureSet, min: Option<f64>, max: Option<f64>) -> bool {
    if let Some(min) = min
        && set.min_resolution != 0.0
        && set.min_resolution > min
    {
        return false;
    }
    if let Some(max) = max
        && set.max_resolution != 0.0
        && set.max_resolution < max
    {
        return false;
    }
    true
}

/// One predicate of a feature query.
#[derive(Debug, Clone)]
pub(crate) enum FeatureFilter {
    Providers(WildcardMatcher),
    Types(WildcardMatcher),
    SetIds(FxHashSet<FeatureSetId>),
    SetNames(WildcardMatcher),
    Ids(FxHashSet<FeatureId>),
    Names(WildcardMatcher),
    Region(Envelope),
    Radius {
        center: Point,
        meters: f64,
        envelope: Envelope,
    },
    Resolution {
        min: Option<f64>,
        max: Option<f64>,
    },
    GeometryTypes(FxHashSet<GeometryType>),
    VisibleOnly,
}

impl FeatureFilter {
    pub fn accepts(&self, record: &FeatureRecord, set: &FeatureSetRecord) -> bool {
        match self {
            FeatureFilter::Providers(matcher) => matcher.matches(&set.set.provider),
            FeatureFilter::Types(matcher) => matcher.matches(&set.set.set_type),
            FeatureFilter::SetIds(ids) => ids.contains(&set.set.id),
            FeatureFilter::SetNames(matcher) => matcher.matches_folded(&set.name_key),
            FeatureFilter::Ids(ids) => ids.contains(&record.id()),
            FeatureFilter::Names(matcher) => matcher.matches_folded(&record.name_key),
            FeatureFilter::Region(region) => record.envelope.intersects(region),
            FeatureFilter::Radius {
                center,
                meters,
                envelope,
            } => {
                record.envelope.intersects(envelope)
                    && distance_to_envelope(center, &record.envelope) <= *meters
            }
            FeatureFilter::Resolution { min, max } => resolution_accepts(&set.set, *min, *max),
            FeatureFilter::GeometryTypes(types) => {
                types.contains(&record.feature.geometry_type())
            }
            FeatureFilter::VisibleOnly => {
                set.deviations.contains(&record.id()) != set.visible
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeatureFilter::Providers(_) => "providers",
            FeatureFilter::Types(_) => "types",
            FeatureFilter::SetIds(_) => "feature_set_ids",
            FeatureFilter::SetNames(_) => "feature_set_names",
            FeatureFilter::Ids(_) => "ids",
            FeatureFilter::Names(_) => "names",
            FeatureFilter::Region(_) => "region",
            FeatureFilter::Radius { .. } => "radius",
            FeatureFilter::Resolution { .. } => "resolution",
            FeatureFilter::GeometryTypes(_) => "geometry_types",
            FeatureFilter::VisibleOnly => "visible_only",
        }
    }
}

/// AND of feature filters.
pub(crate) type FilterChain = SmallVec<[FeatureFilter; 4]>;

pub(crate) fn chain_accepts(
    chain: &FilterChain,
    record: &FeatureRecord,
    set: &FeatureSetRecord,
) -> bool {
    chain.iter().all(|f| f.accepts(record, set))
}

/// Set-level predicates shared by feature and feature-set queries.
#[derive(Debug, Clone, Default)]
pub(crate) struct SetPredicates {
    pub ids: Option<FxHashSet<FeatureSetId>>,
    pub names: Option<WildcardMatcher>,
    pub providers: Option<WildcardMatcher>,
    pub types: Option<WildcardMatcher>,
    pub min_resolution: Option<f64>,
    pub max_resolution: Option<f64>,
}

fn matcher(patterns: &Option<Vec<String>>) -> Result<Option<WildcardMatcher>> {
    patterns.as_deref().map(WildcardMatcher::new).transpose()
}

impl SetPredicates {
    pub fn from_feature_query(query: &FeatureQuery) -> Result<Self> {
        Ok(Self {
            ids: query
                .feature_set_ids
                .as_ref()
                .map(|ids| ids.iter().copied().collect()),
            names: matcher(&query.feature_set_names)?,
            providers: matcher(&query.providers)?,
            types: matcher(&query.types)?,
            min_resolution: query.effective_min_resolution(),
            max_resolution: query.effective_max_resolution(),
        })
    }

    pub fn from_set_query(query: &FeatureSetQuery) -> Result<Self> {
        Ok(Self {
            ids: query.ids.as_ref().map(|ids| ids.iter().copied().collect()),
            names: matcher(&query.names)?,
            providers: matcher(&query.providers)?,
            types: matcher(&query.types)?,
            min_resolution: query.effective_min_resolution(),
            max_resolution: query.effective_max_resolution(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_none()
            && self.names.is_none()
            && self.providers.is_none()
            && self.types.is_none()
            && self.min_resolution.is_none()
            && self.max_resolution.is_none()
    }

    pub fn accepts(&self, record: &FeatureSetRecord) -> bool {
        let set = &record.set;
        if let Some(ids) = &self.ids
            && !ids.contains(&set.id)
        {
            return false;
        }
        if let Some(names) = &self.names
            && !names.matches_folded(&record.name_key)
        {
            return false;
        }
        if let Some(providers) = &self.providers
            && !providers.matches(&set.provider)
        {
            return false;
        }
        if let Some(types) = &self.types
            && !types.matches(&set.set_type)
        {
            return false;
        }
        resolution_accepts(set, self.min_resolution, self.max_resolution)
    }

    /// The same predicates as a feature filter chain.
    pub fn into_filters(self, chain: &mut FilterChain) {
        if let Some(providers) = self.providers {
            chain.push(FeatureFilter::Providers(providers));
        }
        if let Some(types) = self.types {
            chain.push(FeatureFilter::Types(types));
        }
        if let Some(ids) = self.ids {
            chain.push(FeatureFilter::SetIds(ids));
        }
        if let Some(names) = self.names {
            chain.push(FeatureFilter::SetNames(names));
        }
        if self.min_resolution.is_some() || self.max_resolution.is_some() {
            chain.push(FeatureFilter::Resolution {
                min: self.min_resolution,
                max: self.max_resolution,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(min_resolution: f64, max_resolution: f64) -> FeatureSet {
        FeatureSet {
            id: 1,
            version: 1,
            provider: "p".into(),
            set_type: "t".into(),
            name: "s".into(),
            min_resolution,
            max_resolution,
        }
    }

    #[test]
    fn test_resolution_unbounded_set_always_passes() {
        let s = set(0.0, 0.0);
        assert!(resolution_accepts(&s, Some(10.0), Some(1.0)));
        assert!(resolution_accepts(&s, None, None));
    }

    #[test]
    fn test_resolution_bounds() {
        let s = set(5000.0, 10.0);
        assert!(resolution_accepts(&s, Some(5000.0), None));
        assert!(resolution_accepts(&s, Some(10_000.0), None));
        assert!(!resolution_accepts(&s, Some(1000.0), None));

        assert!(resolution_accepts(&s, None, Some(10.0)));
        assert!(resolution_accepts(&s, None, Some(5.0)));
        assert!(!resolution_accepts(&s, None, Some(50.0)));
    }

    #[test]
    fn test_set_predicates_accept() {
        let record = FeatureSetRecord::new(std::sync::Arc::new(FeatureSet {
            name: "Roads".into(),
            ..set(0.0, 0.0)
        }));

        let query = FeatureSetQuery::new().names(["road%"]).providers(["P"]);
        let predicates = SetPredicates::from_set_query(&query).unwrap();
        assert!(predicates.accepts(&record));

        let query = FeatureSetQuery::new().ids([2]);
        let predicates = SetPredicates::from_set_query(&query).unwrap();
        assert!(!predicates.accepts(&record));

        assert!(SetPredicates::from_set_query(&FeatureSetQuery::new()).unwrap().is_empty());
    }

    #[test]
    fn test_into_filters() {
        let query = FeatureQuery::new()
            .providers(["p"])
            .feature_set_ids([1])
            .resolution(100.0, 0.0);
        let mut chain = FilterChain::new();
        SetPredicates::from_feature_query(&query)
            .unwrap()
            .into_filters(&mut chain);

        let labels: Vec<_> = chain.iter().map(FeatureFilter::label).collect();
        assert_eq!(labels, vec!["providers", "feature_set_ids", "resolution"]);
    }
}
