//! # feature-types
//!
//! Value types stored by the feature store:
//!
//! - **Envelope**: axis-aligned bounding box used for spatial indexing
//! - **Geometry**: point, line, polygon and multi/collection geometries
//! - **Style**: point, icon, label, stroke, fill and composite styles
//! - **AttributeSet**: typed name/value attribute map
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives. The store treats them as opaque values: it clones
//! them, compares them, and asks geometries for their envelope.
//!
//! ## Examples
//!
//! ```rust
//! use feature_types::{Geometry, GeometryType};
//!
//! let geometry = Geometry::point(-74.0060, 40.7128);
//! assert_eq!(geometry.geometry_type(), GeometryType::Point);
//!
//! let envelope = geometry.envelope().unwrap();
//! assert_eq!(envelope.min_x, -74.0060);
//! ```

pub mod attributes;
pub mod envelope;
pub mod geometry;
pub mod style;

pub use attributes::{AttributeSet, AttributeValue};
pub use envelope::Envelope;
pub use geometry::{Geometry, GeometryType};
pub use style::Style;
