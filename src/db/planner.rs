//! Cost-based query planning and execution.
//!
//! Each applicable index reports how many candidates it would produce. The
//! planner seeds from the cheapest one and runs every predicate that index
//! does not already guarantee as a filter chain over the candidates. Ties go
//! to the earlier index in [`SeedIndex`] order.

use super::StoreInner;
use super::cursor::QueryStats;
use super::filter::{FeatureFilter, FilterChain, SetPredicates, chain_accepts};
use super::records::{FeatureHandle, FeatureRecord, FeatureSetRecord, SetHandle};
use crate::compute::spatial::{haversine_distance, radius_envelope};
use crate::compute::validation::validate_spatial_filter;
use crate::compute::wildcard::{Pattern, WildcardMatcher};
use crate::error::Result;
use crate::query::{FeatureOrder, FeatureQuery, FeatureSetOrder, FeatureSetQuery, SpatialFilter};
use crate::types::FeatureId;
use feature_types::{Envelope, GeometryType};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::Hash;
use std::ops::Bound;

/// Index a query's candidates are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedIndex {
    FeatureIds,
    FeatureSets,
    Spatial,
    Visibility,
    GeometryTypes,
    Names,
    FullScan,
}

impl SeedIndex {
    pub fn label(&self) -> &'static str {
        match self {
            SeedIndex::FeatureIds => "feature_ids",
            SeedIndex::FeatureSets => "feature_sets",
            SeedIndex::Spatial => "spatial",
            SeedIndex::Visibility => "visibility",
            SeedIndex::GeometryTypes => "geometry_types",
            SeedIndex::Names => "names",
            SeedIndex::FullScan => "full_scan",
        }
    }
}

impl std::fmt::Display for SeedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The plan a feature query runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Chosen seed index
    pub seed: SeedIndex,

    /// Candidate estimate of the chosen index
    pub estimate: usize,

    /// Every index that was considered, with its estimate
    pub estimates: Vec<(SeedIndex, usize)>,

    /// Predicates evaluated per candidate, in order
    pub filters: Vec<&'static str>,
}

enum Seed {
    FullScan,
    Ids(Vec<FeatureId>),
    Sets(Vec<SetHandle>),
    Spatial(Envelope),
    Visibility(Vec<SetHandle>),
    GeometryTypes(Vec<GeometryType>),
    Names(WildcardMatcher),
}

struct FeaturePlan {
    seed: Seed,
    index: SeedIndex,
    estimate: usize,
    estimates: Vec<(SeedIndex, usize)>,
    filters: FilterChain,
}

type Match<'a> = (FeatureHandle, &'a FeatureRecord);

fn prefix_range<'a, V>(
    index: &'a BTreeMap<String, V>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a V)> + 'a {
    index
        .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(move |(key, _)| key.starts_with(prefix))
}

fn name_estimate<H>(index: &BTreeMap<String, FxHashSet<H>>, matcher: &WildcardMatcher) -> usize {
    matcher
        .patterns()
        .iter()
        .map(|pattern| match pattern {
            Pattern::Exact(text) => index.get(text.as_str()).map_or(0, |bucket| bucket.len()),
            Pattern::Prefix(text) => prefix_range(index, text).map(|(_, b)| b.len()).sum(),
            Pattern::Any | Pattern::Suffix(_) => index.values().map(|b| b.len()).sum(),
        })
        .sum()
}

/// Distinct entries of the name index buckets matched by `matcher`.
fn name_candidates<H: Copy + Eq + Hash>(
    index: &BTreeMap<String, FxHashSet<H>>,
    matcher: &WildcardMatcher,
) -> Vec<H> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    let mut take = |bucket: &FxHashSet<H>| {
        for handle in bucket {
            if seen.insert(*handle) {
                out.push(*handle);
            }
        }
    };

    for pattern in matcher.patterns() {
        match pattern {
            Pattern::Exact(text) => {
                if let Some(bucket) = index.get(text.as_str()) {
                    take(bucket);
                }
            }
            Pattern::Prefix(text) => prefix_range(index, text).for_each(|(_, b)| take(b)),
            Pattern::Any | Pattern::Suffix(_) => index
                .iter()
                .filter(|(key, _)| pattern.matches_folded(key))
                .for_each(|(_, b)| take(b)),
        }
    }
    out
}

fn distinct_types(types: &[GeometryType]) -> Vec<GeometryType> {
    let mut types = types.to_vec();
    types.sort();
    types.dedup();
    types
}

fn compare_features(order: &[FeatureOrder], a: &FeatureRecord, b: &FeatureRecord) -> Ordering {
    order
        .iter()
        .map(|order| match order {
            FeatureOrder::Id => a.id().cmp(&b.id()),
            FeatureOrder::Name => a.name_key.cmp(&b.name_key),
            FeatureOrder::FeatureSetId => a.feature.feature_set_id.cmp(&b.feature.feature_set_id),
            FeatureOrder::Distance(point) => {
                let da = haversine_distance(point, &a.envelope.center());
                let db = haversine_distance(point, &b.envelope.center());
                da.total_cmp(&db)
            }
            FeatureOrder::GeometryType(types) => {
                let rank = |record: &FeatureRecord| {
                    let ty = record.feature.geometry_type();
                    types.iter().position(|t| *t == ty).unwrap_or(types.len())
                };
                rank(a).cmp(&rank(b))
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.id().cmp(&b.id()))
}

fn compare_sets(order: &[FeatureSetOrder], a: &FeatureSetRecord, b: &FeatureSetRecord) -> Ordering {
    order
        .iter()
        .map(|order| match order {
            FeatureSetOrder::Id => a.set.id.cmp(&b.set.id),
            FeatureSetOrder::Name => a.name_key.cmp(&b.name_key),
            FeatureSetOrder::Provider => a.set.provider.cmp(&b.set.provider),
            FeatureSetOrder::Type => a.set.set_type.cmp(&b.set.set_type),
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.set.id.cmp(&b.set.id))
}

fn page<T>(items: Vec<T>, offset: usize, limit: Option<usize>) -> impl Iterator<Item = T> {
    items
        .into_iter()
        .skip(offset)
        .take(limit.unwrap_or(usize::MAX))
}

fn paged_count(matches: usize, offset: usize, limit: Option<usize>) -> usize {
    matches
        .saturating_sub(offset)
        .min(limit.unwrap_or(usize::MAX))
}

/// The region, when it is the query's only predicate.
fn region_only(query: &FeatureQuery) -> Option<&Envelope> {
    match &query.spatial {
        Some(SpatialFilter::Region(region))
            if query.ids.is_none()
                && query.names.is_none()
                && query.geometry_types.is_none()
                && !query.visible_only
                && !query.has_set_predicates() =>
        {
            Some(region)
        }
        _ => None,
    }
}

impl StoreInner {
    /// Candidate sets for set-level predicates, plus the index used and its
    /// estimate. Candidates are not yet filtered.
    fn set_candidates(&self, predicates: &SetPredicates) -> (SeedIndex, usize, Vec<SetHandle>) {
        if let Some(ids) = &predicates.ids {
            let handles = ids
                .iter()
                .filter_map(|id| self.set_ids.get(id).copied())
                .collect();
            return (SeedIndex::FeatureSets, ids.len(), handles);
        }
        if let Some(names) = &predicates.names
            && !names.needs_scan()
        {
            let estimate = name_estimate(&self.set_names, names);
            return (
                SeedIndex::Names,
                estimate,
                name_candidates(&self.set_names, names),
            );
        }
        (
            SeedIndex::FullScan,
            self.sets.len(),
            self.set_ids.values().copied().collect(),
        )
    }

    /// Sets satisfying every set-level predicate, and how many were examined.
    fn resolve_sets(&self, predicates: &SetPredicates) -> (Vec<SetHandle>, usize) {
        let (_, _, candidates) = self.set_candidates(predicates);
        let examined = candidates.len();
        let accepted = candidates
            .into_iter()
            .filter(|handle| {
                self.sets
                    .get(*handle)
                    .is_some_and(|record| predicates.accepts(record))
            })
            .collect();
        (accepted, examined)
    }

    fn member_count(&self, sets: &[SetHandle]) -> usize {
        sets.iter()
            .filter_map(|handle| self.sets.get(*handle))
            .map(|record| record.members.len())
            .sum()
    }

    fn plan_features(&self, query: &FeatureQuery) -> Result<FeaturePlan> {
        if let Some(filter) = &query.spatial {
            validate_spatial_filter(filter)?;
        }
        let predicates = SetPredicates::from_feature_query(query)?;
        let mut names = query
            .names
            .as_deref()
            .map(WildcardMatcher::new)
            .transpose()?;
        let spatial = query.spatial.map(|filter| match filter {
            SpatialFilter::Region(region) => region,
            SpatialFilter::Radius { center, meters } => radius_envelope(&center, meters),
        });
        let mut candidate_sets = (!predicates.is_empty()).then(|| self.resolve_sets(&predicates));
        let types = query.geometry_types.as_deref().map(distinct_types);

        let mut estimates = Vec::new();
        if let Some(ids) = &query.ids {
            estimates.push((SeedIndex::FeatureIds, ids.len()));
        }
        if let Some((sets, examined)) = &candidate_sets {
            estimates.push((SeedIndex::FeatureSets, examined + self.member_count(sets)));
        }
        if let Some(region) = &spatial {
            estimates.push((SeedIndex::Spatial, self.spatial.size(region)));
        }
        if query.visible_only {
            let visible = match &candidate_sets {
                Some((sets, _)) => sets
                    .iter()
                    .filter_map(|handle| self.sets.get(*handle))
                    .map(FeatureSetRecord::visible_count)
                    .sum(),
                None => self.sets.iter().map(|(_, set)| set.visible_count()).sum(),
            };
            estimates.push((SeedIndex::Visibility, visible));
        }
        if let Some(types) = &types {
            let count = types
                .iter()
                .map(|ty| self.feature_types.get(ty).map_or(0, |bucket| bucket.len()))
                .sum();
            estimates.push((SeedIndex::GeometryTypes, count));
        }
        if let Some(matcher) = &names
            && !matcher.needs_scan()
        {
            estimates.push((SeedIndex::Names, name_estimate(&self.feature_names, matcher)));
        }

        let (index, estimate) = estimates
            .iter()
            .copied()
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
            .unwrap_or((SeedIndex::FullScan, self.features.len()));

        let sets_satisfied = index == SeedIndex::FeatureSets
            || (index == SeedIndex::Visibility && candidate_sets.is_some());
        let seed = match index {
            SeedIndex::FeatureIds => Seed::Ids(query.ids.clone().unwrap_or_default()),
            SeedIndex::FeatureSets => {
                Seed::Sets(candidate_sets.take().map(|(s, _)| s).unwrap_or_default())
            }
            SeedIndex::Spatial => Seed::Spatial(spatial.unwrap_or(self.spatial.world())),
            SeedIndex::Visibility => Seed::Visibility(match candidate_sets.take() {
                Some((sets, _)) => sets,
                None => self.sets.iter().map(|(handle, _)| handle).collect(),
            }),
            SeedIndex::GeometryTypes => Seed::GeometryTypes(types.clone().unwrap_or_default()),
            SeedIndex::Names => match names.take() {
                Some(matcher) => Seed::Names(matcher),
                None => Seed::FullScan,
            },
            SeedIndex::FullScan => Seed::FullScan,
        };

        let mut filters = FilterChain::new();
        if !sets_satisfied {
            predicates.into_filters(&mut filters);
        }
        if index != SeedIndex::FeatureIds
            && let Some(ids) = &query.ids
        {
            filters.push(FeatureFilter::Ids(ids.iter().copied().collect()));
        }
        if let Some(matcher) = names {
            filters.push(FeatureFilter::Names(matcher));
        }
        match (query.spatial, spatial) {
            (Some(SpatialFilter::Region(region)), _) if index != SeedIndex::Spatial => {
                filters.push(FeatureFilter::Region(region));
            }
            (Some(SpatialFilter::Radius { center, meters }), Some(envelope)) => {
                filters.push(FeatureFilter::Radius {
                    center,
                    meters,
                    envelope,
                });
            }
            _ => {}
        }
        if index != SeedIndex::GeometryTypes
            && let Some(types) = types
        {
            filters.push(FeatureFilter::GeometryTypes(types.into_iter().collect()));
        }
        if query.visible_only && index != SeedIndex::Visibility {
            filters.push(FeatureFilter::VisibleOnly);
        }

        Ok(FeaturePlan {
            seed,
            index,
            estimate,
            estimates,
            filters,
        })
    }

    fn visible_members(&self, set: &FeatureSetRecord, visit: &mut impl FnMut(FeatureHandle)) {
        if set.visible {
            for handle in &set.members {
                let deviates = !set.deviations.is_empty()
                    && self
                        .features
                        .get(*handle)
                        .is_some_and(|record| set.deviations.contains(&record.id()));
                if !deviates {
                    visit(*handle);
                }
            }
        } else {
            for id in &set.deviations {
                if let Some(handle) = self.feature_ids.get(id) {
                    visit(*handle);
                }
            }
        }
    }

    /// Visit every distinct candidate the seed produces.
    fn for_each_candidate(&self, seed: &Seed, mut visit: impl FnMut(FeatureHandle)) {
        match seed {
            Seed::FullScan => self.feature_ids.values().for_each(|h| visit(*h)),
            Seed::Ids(ids) => {
                let mut seen = FxHashSet::default();
                for id in ids {
                    if seen.insert(*id)
                        && let Some(handle) = self.feature_ids.get(id)
                    {
                        visit(*handle);
                    }
                }
            }
            Seed::Sets(sets) => {
                for set in sets.iter().filter_map(|handle| self.sets.get(*handle)) {
                    set.members.iter().for_each(|h| visit(*h));
                }
            }
            Seed::Spatial(region) => self.spatial.get(region, |entry| visit(entry.key)),
            Seed::Visibility(sets) => {
                for set in sets.iter().filter_map(|handle| self.sets.get(*handle)) {
                    self.visible_members(set, &mut visit);
                }
            }
            Seed::GeometryTypes(types) => {
                for bucket in types.iter().filter_map(|ty| self.feature_types.get(ty)) {
                    bucket.iter().for_each(|h| visit(*h));
                }
            }
            Seed::Names(matcher) => name_candidates(&self.feature_names, matcher)
                .into_iter()
                .for_each(visit),
        }
    }

    fn accept(&self, filters: &FilterChain, handle: FeatureHandle) -> Option<&FeatureRecord> {
        let record = self.features.get(handle)?;
        let set = self.sets.get(record.set)?;
        chain_accepts(filters, record, set).then_some(record)
    }

    /// Run the plan. A full scan walks the id index in order and may stop
    /// once `stop_after` matches are collected.
    fn collect_features(
        &self,
        plan: &FeaturePlan,
        stop_after: Option<usize>,
    ) -> (Vec<Match<'_>>, usize) {
        let mut examined = 0;
        let mut matched = Vec::new();

        if let (Seed::FullScan, Some(wanted)) = (&plan.seed, stop_after) {
            for handle in self.feature_ids.values() {
                if matched.len() >= wanted {
                    break;
                }
                examined += 1;
                if let Some(record) = self.accept(&plan.filters, *handle) {
                    matched.push((*handle, record));
                }
            }
        } else {
            self.for_each_candidate(&plan.seed, |handle| {
                examined += 1;
                if let Some(record) = self.accept(&plan.filters, handle) {
                    matched.push((handle, record));
                }
            });
        }
        (matched, examined)
    }

    /// Handles of the matching features in result order, after offset and
    /// limit.
    pub(super) fn matching_features(
        &self,
        query: &FeatureQuery,
    ) -> Result<(Vec<FeatureHandle>, QueryStats)> {
        let plan = self.plan_features(query)?;
        let in_id_order = matches!(plan.seed, Seed::FullScan)
            && query.order.iter().all(|order| *order == FeatureOrder::Id);
        let stop_after = query
            .limit
            .filter(|_| in_id_order)
            .map(|limit| query.offset.saturating_add(limit));

        let (mut matched, examined) = self.collect_features(&plan, stop_after);
        if !in_id_order {
            matched.sort_by(|(_, a), (_, b)| compare_features(&query.order, a, b));
        }

        let handles: Vec<FeatureHandle> = page(matched, query.offset, query.limit)
            .map(|(handle, _)| handle)
            .collect();
        let stats = QueryStats {
            seed: plan.index,
            estimate: plan.estimate,
            candidates_examined: examined,
            results_returned: handles.len(),
        };
        log::debug!(
            "feature query seeded from {} (estimate {}), examined {}, returned {}",
            stats.seed,
            stats.estimate,
            stats.candidates_examined,
            stats.results_returned
        );
        Ok((handles, stats))
    }

    pub(super) fn count_features(&self, query: &FeatureQuery) -> Result<usize> {
        if !query.is_paged() {
            if !query.has_predicates() {
                return Ok(self.features.len());
            }
            if let Some(region) = region_only(query) {
                validate_spatial_filter(&SpatialFilter::Region(*region))?;
                return Ok(self.spatial.size(region));
            }
        }

        let plan = self.plan_features(query)?;
        let (matched, _) = self.collect_features(&plan, None);
        Ok(paged_count(matched.len(), query.offset, query.limit))
    }

    pub(super) fn explain_features(&self, query: &FeatureQuery) -> Result<QueryPlan> {
        let plan = self.plan_features(query)?;
        Ok(QueryPlan {
            seed: plan.index,
            estimate: plan.estimate,
            estimates: plan.estimates,
            filters: plan.filters.iter().map(FeatureFilter::label).collect(),
        })
    }

    /// Handles of the matching sets in result order, after offset and limit.
    pub(super) fn matching_feature_sets(
        &self,
        query: &FeatureSetQuery,
    ) -> Result<(Vec<SetHandle>, QueryStats)> {
        let predicates = SetPredicates::from_set_query(query)?;
        let (index, estimate, candidates) = self.set_candidates(&predicates);
        let examined = candidates.len();

        let mut matched: Vec<(SetHandle, &FeatureSetRecord)> = candidates
            .into_iter()
            .filter_map(|handle| self.sets.get(handle).map(|record| (handle, record)))
            .filter(|(_, record)| predicates.accepts(record))
            .filter(|(_, record)| !query.visible_only || record.visible)
            .collect();
        matched.sort_by(|(_, a), (_, b)| compare_sets(&query.order, a, b));

        let handles: Vec<SetHandle> = page(matched, query.offset, query.limit)
            .map(|(handle, _)| handle)
            .collect();
        let stats = QueryStats {
            seed: index,
            estimate,
            candidates_examined: examined,
            results_returned: handles.len(),
        };
        Ok((handles, stats))
    }

    pub(super) fn count_feature_sets(&self, query: &FeatureSetQuery) -> Result<usize> {
        if !query.has_predicates() && !query.is_paged() {
            return Ok(self.sets.len());
        }
        let (matched, _) = self.matching_feature_sets(query)?;
        Ok(matched.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{FeatureDefinition, FeatureSetDefinition, FeatureSetId};
    use feature_types::Geometry;
    use geo::Point;

    fn inner() -> StoreInner {
        StoreInner::new_with_config(&Config::default())
    }

    fn add_set(inner: &mut StoreInner, name: &str) -> FeatureSetId {
        inner
            .insert_feature_set(None, FeatureSetDefinition::new("provider", "type", name))
            .unwrap()
            .id
    }

    fn add_point(inner: &mut StoreInner, set: FeatureSetId, name: &str, x: f64, y: f64) -> FeatureId {
        inner
            .insert_feature(set, None, FeatureDefinition::new(name, Geometry::point(x, y)))
            .unwrap()
            .id
    }

    fn ids(inner: &StoreInner, query: &FeatureQuery) -> Vec<FeatureId> {
        let (handles, _) = inner.matching_features(query).unwrap();
        handles
            .into_iter()
            .map(|h| inner.features.get(h).unwrap().id())
            .collect()
    }

    #[test]
    fn test_full_scan_without_predicates() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        for i in 0..5 {
            add_point(&mut inner, set, "p", i as f64, 0.0);
        }
        let plan = inner.explain_features(&FeatureQuery::new()).unwrap();
        assert_eq!(plan.seed, SeedIndex::FullScan);
        assert_eq!(plan.estimate, 5);
        assert!(plan.filters.is_empty());
        assert_eq!(ids(&inner, &FeatureQuery::new()), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_full_scan_stops_at_limit() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        for i in 0..100 {
            add_point(&mut inner, set, "p", i as f64 / 10.0, 0.0);
        }
        let query = FeatureQuery::new().offset(2).limit(3);
        let (handles, stats) = inner.matching_features(&query).unwrap();
        assert_eq!(handles.len(), 3);
        assert_eq!(stats.candidates_examined, 5);
        assert_eq!(ids(&inner, &query), vec![3, 4, 5]);
    }

    #[test]
    fn test_small_set_seeds_from_feature_sets() {
        let mut inner = inner();
        let small = add_set(&mut inner, "small");
        let big = add_set(&mut inner, "big");
        add_point(&mut inner, small, "a", 0.0, 0.0);
        for i in 0..200 {
            add_point(&mut inner, big, "b", (i % 100) as f64, 0.0);
        }

        let query = FeatureQuery::new()
            .feature_set_ids([small])
            .spatial(SpatialFilter::region(-180.0, -90.0, 180.0, 90.0));
        let (handles, stats) = inner.matching_features(&query).unwrap();
        assert_eq!(stats.seed, SeedIndex::FeatureSets);
        assert_eq!(stats.estimate, 2);
        assert_eq!(stats.candidates_examined, 1);
        assert_eq!(handles.len(), 1);

        let plan = inner.explain_features(&query).unwrap();
        assert_eq!(plan.filters, vec!["region"]);
        assert_eq!(
            plan.estimates,
            vec![(SeedIndex::FeatureSets, 2), (SeedIndex::Spatial, 201)]
        );
    }

    #[test]
    fn test_ties_prefer_earlier_index() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "a", 0.0, 0.0);
        add_point(&mut inner, set, "b", 1.0, 0.0);

        // both estimate 1
        let query = FeatureQuery::new().ids([1]).names(["b"]);
        let plan = inner.explain_features(&query).unwrap();
        assert_eq!(plan.seed, SeedIndex::FeatureIds);
        assert_eq!(plan.filters, vec!["names"]);
        assert!(ids(&inner, &query).is_empty());
    }

    #[test]
    fn test_names_seed_from_prefix() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "Road 1", 0.0, 0.0);
        add_point(&mut inner, set, "road 2", 0.0, 0.0);
        add_point(&mut inner, set, "Rail", 0.0, 0.0);
        add_point(&mut inner, set, "Lake", 0.0, 0.0);

        let query = FeatureQuery::new().names(["ROAD%"]).visible_only(true);
        let plan = inner.explain_features(&query).unwrap();
        assert_eq!(plan.seed, SeedIndex::Names);
        assert_eq!(plan.estimate, 2);
        assert_eq!(plan.filters, vec!["visible_only"]);
        assert_eq!(ids(&inner, &query), vec![1, 2]);

        // suffix patterns stay a filter
        let query = FeatureQuery::new().names(["%ake"]);
        let plan = inner.explain_features(&query).unwrap();
        assert_eq!(plan.seed, SeedIndex::FullScan);
        assert_eq!(plan.filters, vec!["names"]);
        assert_eq!(ids(&inner, &query), vec![4]);
    }

    #[test]
    fn test_empty_id_list_matches_nothing() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "a", 0.0, 0.0);

        let query = FeatureQuery::new().ids(Vec::<FeatureId>::new());
        let (handles, stats) = inner.matching_features(&query).unwrap();
        assert!(handles.is_empty());
        assert_eq!(stats.seed, SeedIndex::FeatureIds);
        assert_eq!(stats.candidates_examined, 0);
        assert_eq!(inner.count_features(&query).unwrap(), 0);
    }

    #[test]
    fn test_visibility_seed() {
        let mut inner = inner();
        let shown = add_set(&mut inner, "shown");
        let hidden = add_set(&mut inner, "hidden");
        add_point(&mut inner, shown, "a", 0.0, 0.0);
        let b = add_point(&mut inner, shown, "b", 0.0, 0.0);
        for i in 0..10 {
            add_point(&mut inner, hidden, "h", i as f64, 0.0);
        }
        inner.set_feature_set_visible(hidden, false).unwrap();
        inner.set_feature_visible(b, false).unwrap();

        let query = FeatureQuery::new()
            .visible_only(true)
            .spatial(SpatialFilter::region(-1.0, -1.0, 20.0, 1.0));
        let (handles, stats) = inner.matching_features(&query).unwrap();
        assert_eq!(stats.seed, SeedIndex::Visibility);
        assert_eq!(stats.estimate, 1);
        assert_eq!(handles.len(), 1);
    }

    #[test]
    fn test_radius_keeps_exact_distance_check() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "near", 0.0, 0.0);
        add_point(&mut inner, set, "corner", 0.0089, 0.0089);

        // the corner point sits inside the radius envelope but ~1.4 km away
        let query = FeatureQuery::new().spatial(SpatialFilter::radius(Point::new(0.0, 0.0), 1000.0));
        let plan = inner.explain_features(&query).unwrap();
        assert_eq!(plan.seed, SeedIndex::Spatial);
        assert_eq!(plan.filters, vec!["radius"]);
        assert_eq!(ids(&inner, &query), vec![1]);
    }

    #[test]
    fn test_ordering() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "charlie", 3.0, 0.0);
        add_point(&mut inner, set, "Alpha", 1.0, 0.0);
        add_point(&mut inner, set, "bravo", 2.0, 0.0);

        let by_name = FeatureQuery::new().order_by(FeatureOrder::Name);
        assert_eq!(ids(&inner, &by_name), vec![2, 3, 1]);

        let by_distance = FeatureQuery::new().order_by(FeatureOrder::Distance(Point::new(3.1, 0.0)));
        assert_eq!(ids(&inner, &by_distance), vec![1, 3, 2]);

        let paged = by_name.clone().offset(1).limit(1);
        assert_eq!(ids(&inner, &paged), vec![3]);
    }

    #[test]
    fn test_geometry_type_order_puts_unlisted_last() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        add_point(&mut inner, set, "p", 0.0, 0.0);
        inner
            .insert_feature(
                set,
                None,
                FeatureDefinition::new("poly", Geometry::from_envelope(&Envelope::new(0.0, 0.0, 1.0, 1.0))),
            )
            .unwrap();

        let query = FeatureQuery::new()
            .order_by(FeatureOrder::GeometryType(vec![GeometryType::Polygon]));
        assert_eq!(ids(&inner, &query), vec![2, 1]);
    }

    #[test]
    fn test_counts() {
        let mut inner = inner();
        let set = add_set(&mut inner, "s");
        for i in 0..10 {
            add_point(&mut inner, set, "p", i as f64, 0.0);
        }

        assert_eq!(inner.count_features(&FeatureQuery::new()).unwrap(), 10);
        let region = FeatureQuery::new().spatial(SpatialFilter::region(-0.5, -1.0, 4.5, 1.0));
        assert_eq!(inner.count_features(&region).unwrap(), 5);
        assert_eq!(inner.count_features(&region.clone().offset(3)).unwrap(), 2);
        assert_eq!(inner.count_features(&region.clone().limit(1)).unwrap(), 1);
        assert_eq!(inner.count_features(&region.offset(10)).unwrap(), 0);
    }

    #[test]
    fn test_feature_set_queries() {
        let mut inner = inner();
        let roads = add_set(&mut inner, "Roads");
        let rails = add_set(&mut inner, "Rails");
        let lakes = add_set(&mut inner, "Lakes");
        inner.set_feature_set_visible(rails, false).unwrap();

        let names = |query: &FeatureSetQuery| -> Vec<FeatureSetId> {
            let (handles, _) = inner.matching_feature_sets(query).unwrap();
            handles
                .into_iter()
                .map(|h| inner.sets.get(h).unwrap().set.id)
                .collect()
        };

        assert_eq!(names(&FeatureSetQuery::new()), vec![roads, rails, lakes]);
        assert_eq!(names(&FeatureSetQuery::new().names(["r%"])), vec![roads, rails]);
        assert_eq!(
            names(&FeatureSetQuery::new().order_by(FeatureSetOrder::Name)),
            vec![lakes, rails, roads]
        );
        assert_eq!(names(&FeatureSetQuery::new().visible_only(true)), vec![roads, lakes]);
        assert_eq!(names(&FeatureSetQuery::new().ids([lakes, 99])), vec![lakes]);
        assert_eq!(inner.count_feature_sets(&FeatureSetQuery::new()).unwrap(), 3);
        assert_eq!(
            inner
                .count_feature_sets(&FeatureSetQuery::new().offset(1).limit(5))
                .unwrap(),
            2
        );
    }

    #[test]
    fn test_unsupported_pattern_is_rejected() {
        let inner = inner();
        assert!(inner
            .matching_features(&FeatureQuery::new().names(["a%b"]))
            .is_err());
    }
}
