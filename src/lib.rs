//! In-memory feature data store with spatial, name and visibility indexing.
//!
//! Features (named geometries with style and attributes) are grouped into
//! feature sets. The store keeps them in memory, indexes them several ways and
//! answers queries through a cost-based planner that seeds from the most
//! selective index.
//!
//! ```rust
//! use feature_store::prelude::*;
//!
//! let store = RuntimeFeatureStore::new();
//! let set = store.insert_feature_set(FeatureSetDefinition::new("osm", "poi", "Cafes"))?;
//! store.insert_feature(set.id, FeatureDefinition::new("Blue Door", Geometry::point(-74.0, 40.7)))?;
//!
//! let nearby = FeatureQuery::new()
//!     .spatial(SpatialFilter::radius(Point::new(-74.0, 40.7), 500.0))
//!     .visible_only(true);
//! assert_eq!(store.query_features_count(&nearby)?, 1);
//! # Ok::<(), feature_store::StoreError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod query;
pub mod store;
pub mod types;

pub use builder::{StoreBuilder, StoreRegistry};
pub use config::Config;
pub use db::{
    Cursor, FeatureCursor, FeatureSetCursor, QueryPlan, QueryStats, RuntimeFeatureStore,
    SeedIndex,
};
pub use error::{Result, StoreError};
pub use query::{FeatureOrder, FeatureQuery, FeatureSetOrder, FeatureSetQuery, SpatialFilter};
pub use store::{ContentChangedListener, FeatureDataStore, ListenerId};
pub use types::{
    AltitudeMode, AttributeUpdateMode, Feature, FeatureDefinition, FeatureId, FeatureSet,
    FeatureSetDefinition, FeatureSetId, FeatureSetUpdate, FeatureUpdate, StoreStats,
};

pub use feature_types::{
    AttributeSet, AttributeValue, Envelope, Geometry, GeometryType, Style,
};
pub use geo::{Point, Polygon, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        Config, FeatureDataStore, Result, RuntimeFeatureStore, StoreBuilder, StoreError,
    };

    pub use crate::{
        Feature, FeatureDefinition, FeatureSet, FeatureSetDefinition, FeatureSetUpdate,
        FeatureUpdate,
    };

    pub use crate::{FeatureOrder, FeatureQuery, FeatureSetOrder, FeatureSetQuery, SpatialFilter};

    pub use feature_types::{AttributeSet, AttributeValue, Envelope, Geometry, GeometryType, Style};

    pub use geo::Point;
}
