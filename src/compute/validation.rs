//! Input validation for store mutations and query parameters.

use crate::error::{Result, StoreError};
use crate::query::SpatialFilter;
use feature_types::{Envelope, Geometry};
use geo::Point;

/// Rejects empty (or whitespace-only) required strings.
pub fn validate_required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Validates a feature-set resolution range.
///
/// Both bounds must be finite and non-negative; 0 means unbounded. When both
/// are set, `min` is the coarser resolution and must not be below `max`.
///
/// # Examples
///
/// ```
/// use feature_store::compute::validation::validate_resolution;
///
/// assert!(validate_resolution(0.0, 0.0).is_ok());
/// assert!(validate_resolution(5000.0, 10.0).is_ok());
/// assert!(validate_resolution(10.0, 5000.0).is_err());
/// assert!(validate_resolution(-1.0, 0.0).is_err());
/// ```
pub fn validate_resolution(min_resolution: f64, max_resolution: f64) -> Result<()> {
    for (label, value) in [("min", min_resolution), ("max", max_resolution)] {
        if !value.is_finite() {
            return Err(StoreError::invalid(format!(
                "{} resolution must be finite, got: {}",
                label, value
            )));
        }
        if value < 0.0 {
            return Err(StoreError::invalid(format!(
                "{} resolution must not be negative, got: {}",
                label, value
            )));
        }
    }

    if min_resolution != 0.0 && max_resolution != 0.0 && min_resolution < max_resolution {
        return Err(StoreError::invalid(format!(
            "min resolution {} is finer than max resolution {}",
            min_resolution, max_resolution
        )));
    }
    Ok(())
}

/// Returns the geometry's envelope, rejecting geometries that have none.
pub fn geometry_envelope(geometry: &Geometry) -> Result<Envelope> {
    geometry.envelope().ok_or_else(|| {
        StoreError::invalid(format!(
            "{} geometry is empty or has non-finite coordinates",
            geometry.geometry_type()
        ))
    })
}

/// Validates a 2D point has valid longitude and latitude.
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() || !y.is_finite() {
        return Err(StoreError::invalid(format!(
            "Coordinates must be finite, got: ({}, {})",
            x, y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(StoreError::invalid(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(StoreError::invalid(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

pub fn validate_spatial_filter(filter: &SpatialFilter) -> Result<()> {
    match filter {
        SpatialFilter::Region(region) => {
            if !region.is_finite() {
                return Err(StoreError::invalid("Region bounds must be finite"));
            }
            Ok(())
        }
        SpatialFilter::Radius { center, meters } => {
            validate_geographic_point(center)?;
            if !meters.is_finite() || *meters < 0.0 {
                return Err(StoreError::invalid(format!(
                    "Radius must be finite and non-negative, got: {}",
                    meters
                )));
            }
            Ok(())
        }
    }
}
