//! Compute layer for indexing and matching.
//!
//! This module holds the pieces of the query engine that do not depend on the
//! store's records:
//! - the generic quadtree spatial index
//! - wildcard pattern matching
//! - geographic distance helpers
//! - input validation

pub mod quadtree;
pub mod spatial;
pub mod validation;
pub mod wildcard;

pub use quadtree::Quadtree;
pub use spatial::{distance_to_envelope, haversine_distance, radius_envelope};
pub use wildcard::{Pattern, WildcardMatcher};
