//! Value types returned by and passed into the store.

use feature_types::{AttributeSet, Geometry, GeometryType, Style};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type FeatureId = u64;
pub type FeatureSetId = u64;

/// How feature altitudes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AltitudeMode {
    #[default]
    ClampToGround,
    Relative,
    Absolute,
}

/// How an attribute update combines with the existing attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUpdateMode {
    /// The new set replaces the old one.
    #[default]
    Replace,
    /// New entries are merged in, overwriting equal names.
    AddOrReplace,
}

/// Immutable snapshot of a feature.
///
/// Updates produce a new instance; geometry, style and attributes that did not
/// change are shared with the previous version.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    pub feature_set_id: FeatureSetId,
    pub version: u64,
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub style: Option<Arc<Style>>,
    pub attributes: Arc<AttributeSet>,
    pub altitude_mode: AltitudeMode,
    pub extrude: f64,
}

impl Feature {
    pub fn geometry_type(&self) -> GeometryType {
        self.geometry.geometry_type()
    }
}

/// Immutable snapshot of a feature set.
///
/// Resolutions are ground sample distances in meters per pixel; 0 means
/// unbounded. `min_resolution` is the coarsest resolution the set is shown at,
/// so when both bounds are set `min_resolution >= max_resolution`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub id: FeatureSetId,
    pub version: u64,
    pub provider: String,
    pub set_type: String,
    pub name: String,
    pub min_resolution: f64,
    pub max_resolution: f64,
}

/// Input for a feature insert.
#[derive(Debug, Clone)]
pub struct FeatureDefinition {
    pub name: String,
    pub geometry: Geometry,
    pub style: Option<Style>,
    pub attributes: AttributeSet,
    pub altitude_mode: AltitudeMode,
    pub extrude: f64,
}

impl FeatureDefinition {
    pub fn new(name: impl Into<String>, geometry: impl Into<Geometry>) -> Self {
        Self {
            name: name.into(),
            geometry: geometry.into(),
            style: None,
            attributes: AttributeSet::new(),
            altitude_mode: AltitudeMode::default(),
            extrude: 0.0,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_altitude_mode(mut self, mode: AltitudeMode) -> Self {
        self.altitude_mode = mode;
        self
    }

    pub fn with_extrude(mut self, extrude: f64) -> Self {
        self.extrude = extrude;
        self
    }
}

/// Input for a feature-set insert.
#[derive(Debug, Clone)]
pub struct FeatureSetDefinition {
    pub provider: String,
    pub set_type: String,
    pub name: String,
    pub min_resolution: f64,
    pub max_resolution: f64,
}

impl FeatureSetDefinition {
    pub fn new(
        provider: impl Into<String>,
        set_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            set_type: set_type.into(),
            name: name.into(),
            min_resolution: 0.0,
            max_resolution: 0.0,
        }
    }

    pub fn with_resolution(mut self, min_resolution: f64, max_resolution: f64) -> Self {
        self.min_resolution = min_resolution;
        self.max_resolution = max_resolution;
        self
    }
}

/// A partial feature update. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct FeatureUpdate {
    pub name: Option<String>,
    pub geometry: Option<Geometry>,
    /// `Some(None)` removes the style.
    pub style: Option<Option<Style>>,
    pub attributes: Option<(AttributeSet, AttributeUpdateMode)>,
    pub altitude_mode: Option<AltitudeMode>,
    pub extrude: Option<f64>,
}

impl FeatureUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn geometry(mut self, geometry: impl Into<Geometry>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    pub fn style(mut self, style: Option<Style>) -> Self {
        self.style = Some(style);
        self
    }

    pub fn attributes(mut self, attributes: AttributeSet, mode: AttributeUpdateMode) -> Self {
        self.attributes = Some((attributes, mode));
        self
    }

    pub fn altitude_mode(mut self, mode: AltitudeMode) -> Self {
        self.altitude_mode = Some(mode);
        self
    }

    pub fn extrude(mut self, extrude: f64) -> Self {
        self.extrude = Some(extrude);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.geometry.is_none()
            && self.style.is_none()
            && self.attributes.is_none()
            && self.altitude_mode.is_none()
            && self.extrude.is_none()
    }
}

/// A partial feature-set update: name, resolution range, or both.
#[derive(Debug, Clone, Default)]
pub struct FeatureSetUpdate {
    pub name: Option<String>,
    pub resolution: Option<(f64, f64)>,
}

impl FeatureSetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn resolution(mut self, min_resolution: f64, max_resolution: f64) -> Self {
        self.resolution = Some((min_resolution, max_resolution));
        self
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of live features
    pub feature_count: usize,
    /// Number of live feature sets
    pub feature_set_count: usize,
    /// Mutations applied since the store was created
    pub operations_count: u64,
    /// Change notifications delivered to listeners
    pub notifications_count: u64,
    /// Nodes allocated by the spatial index
    pub quadtree_nodes: usize,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_operation(&mut self) {
        self.operations_count += 1;
    }

    pub fn record_notification(&mut self) {
        self.notifications_count += 1;
    }
}
