//! Detached query results.

use super::planner::SeedIndex;
use crate::types::{Feature, FeatureSet};
use std::sync::Arc;

/// Statistics about a query execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Index the candidates were drawn from
    pub seed: SeedIndex,

    /// Planner estimate for that index
    pub estimate: usize,

    /// Number of candidate records run through the filter chain
    pub candidates_examined: usize,

    /// Number of results returned (after offset and limit)
    pub results_returned: usize,
}

/// Iterator over a query's results.
///
/// The results are immutable snapshots copied out while the store lock was
/// held; later mutations of the store do not affect an outstanding cursor.
#[derive(Debug)]
pub struct Cursor<T> {
    items: std::vec::IntoIter<Arc<T>>,
    stats: QueryStats,
}

pub type FeatureCursor = Cursor<Feature>;
pub type FeatureSetCursor = Cursor<FeatureSet>;

impl<T> Cursor<T> {
    pub(crate) fn new(items: Vec<Arc<T>>, stats: QueryStats) -> Self {
        Self {
            items: items.into_iter(),
            stats,
        }
    }

    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }

    /// Remaining results without consuming the cursor.
    pub fn remaining(&self) -> &[Arc<T>] {
        self.items.as_slice()
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl<T> ExactSizeIterator for Cursor<T> {}
