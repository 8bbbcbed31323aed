use crate::envelope::Envelope;
use geo::{BoundingRect, Coord, CoordsIter, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Geometry classification used by the geometry-type index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GeometryType {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
    Collection,
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryType::Point => "point",
            GeometryType::LineString => "linestring",
            GeometryType::Polygon => "polygon",
            GeometryType::MultiPoint => "multipoint",
            GeometryType::MultiLineString => "multilinestring",
            GeometryType::MultiPolygon => "multipolygon",
            GeometryType::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// A feature geometry in longitude/latitude coordinates.
///
/// # Examples
///
/// ```
/// use feature_types::{Geometry, GeometryType};
/// use geo::{LineString, coord};
///
/// let line = Geometry::from(LineString::new(vec![
///     coord! { x: 0.0, y: 0.0 },
///     coord! { x: 2.0, y: 1.0 },
/// ]));
/// assert_eq!(line.geometry_type(), GeometryType::LineString);
/// assert_eq!(line.envelope().unwrap().max_x, 2.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPoint(MultiPoint<f64>),
    MultiLineString(MultiLineString<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Convenience constructor for a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    /// Rectangular polygon covering `envelope`.
    pub fn from_envelope(envelope: &Envelope) -> Self {
        Geometry::Polygon(envelope.to_rect().to_polygon())
    }

    pub fn geometry_type(&self) -> GeometryType {
        match self {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::Polygon(_) => GeometryType::Polygon,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::Collection(_) => GeometryType::Collection,
        }
    }

    /// Bounding envelope of the geometry.
    ///
    /// Returns `None` for empty geometries and for geometries with non-finite
    /// coordinates anywhere, including inside a collection member.
    pub fn envelope(&self) -> Option<Envelope> {
        if !self.coords_finite() {
            return None;
        }
        let envelope = match self {
            Geometry::Point(point) => Some(Envelope::from_rect(point.bounding_rect())),
            Geometry::LineString(line) => line.bounding_rect().map(Envelope::from_rect),
            Geometry::Polygon(polygon) => polygon.bounding_rect().map(Envelope::from_rect),
            Geometry::MultiPoint(points) => points.bounding_rect().map(Envelope::from_rect),
            Geometry::MultiLineString(lines) => lines.bounding_rect().map(Envelope::from_rect),
            Geometry::MultiPolygon(polygons) => {
                polygons.bounding_rect().map(Envelope::from_rect)
            }
            Geometry::Collection(children) => children
                .iter()
                .filter_map(Geometry::envelope)
                .reduce(|acc, env| acc.union(&env)),
        };
        envelope.filter(Envelope::is_finite)
    }

    pub fn is_empty(&self) -> bool {
        self.envelope().is_none()
    }

    fn coords_finite(&self) -> bool {
        fn all_finite(mut coords: impl Iterator<Item = Coord<f64>>) -> bool {
            coords.all(|c| c.x.is_finite() && c.y.is_finite())
        }

        match self {
            Geometry::Point(point) => all_finite(point.coords_iter()),
            Geometry::LineString(line) => all_finite(line.coords_iter()),
            Geometry::Polygon(polygon) => all_finite(polygon.coords_iter()),
            Geometry::MultiPoint(points) => all_finite(points.coords_iter()),
            Geometry::MultiLineString(lines) => all_finite(lines.coords_iter()),
            Geometry::MultiPolygon(polygons) => all_finite(polygons.coords_iter()),
            Geometry::Collection(children) => children.iter().all(Geometry::coords_finite),
        }
    }
}

impl From<Point<f64>> for Geometry {
    fn from(point: Point<f64>) -> Self {
        Geometry::Point(point)
    }
}

impl From<LineString<f64>> for Geometry {
    fn from(line: LineString<f64>) -> Self {
        Geometry::LineString(line)
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(polygon: Polygon<f64>) -> Self {
        Geometry::Polygon(polygon)
    }
}

impl From<MultiPoint<f64>> for Geometry {
    fn from(points: MultiPoint<f64>) -> Self {
        Geometry::MultiPoint(points)
    }
}

impl From<MultiLineString<f64>> for Geometry {
    fn from(lines: MultiLineString<f64>) -> Self {
        Geometry::MultiLineString(lines)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(polygons: MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon(polygons)
    }
}
