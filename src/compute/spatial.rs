//! Geographic helpers for radius filters and distance ordering.

use feature_types::Envelope;
use geo::{Distance, Haversine, HaversineMeasure, Point};

/// Haversine distance in meters.
pub fn haversine_distance(a: &Point, b: &Point) -> f64 {
    Haversine.distance(*a, *b)
}

/// Bounding envelope of the circle of `meters` around `center`.
///
/// Latitude is clamped to the poles. When the circle crosses the
/// antimeridian or reaches a pole the envelope spans every longitude.
pub fn radius_envelope(center: &Point, meters: f64) -> Envelope {
    let earth_radius = HaversineMeasure::GRS80_MEAN_RADIUS.radius();
    let lat_degrees = (meters / earth_radius).to_degrees();

    let min_y = center.y() - lat_degrees;
    let max_y = center.y() + lat_degrees;
    if min_y <= -90.0 || max_y >= 90.0 {
        return Envelope::new(-180.0, min_y.max(-90.0), 180.0, max_y.min(90.0));
    }

    let lon_degrees = (meters / (earth_radius * center.y().to_radians().cos())).to_degrees();
    let min_x = center.x() - lon_degrees;
    let max_x = center.x() + lon_degrees;
    if !lon_degrees.is_finite() || min_x < -180.0 || max_x > 180.0 {
        return Envelope::new(-180.0, min_y, 180.0, max_y);
    }

    Envelope::new(min_x, min_y, max_x, max_y)
}

/// Haversine distance from `point` to the nearest point of `envelope`, in
/// meters. Zero when the point lies inside.
pub fn distance_to_envelope(point: &Point, envelope: &Envelope) -> f64 {
    let nearest = envelope.nearest_point(point);
    haversine_distance(point, &nearest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_envelope_contains_circle() {
        let center = Point::new(-74.0060, 40.7128);
        let env = radius_envelope(&center, 10_000.0);

        assert!(env.contains_point(&center));
        for bearing_point in [
            Point::new(env.min_x, center.y()),
            Point::new(env.max_x, center.y()),
            Point::new(center.x(), env.min_y),
            Point::new(center.x(), env.max_y),
        ] {
            let d = haversine_distance(&center, &bearing_point);
            assert!((d - 10_000.0).abs() < 50.0, "edge at {d} m");
        }
    }

    #[test]
    fn test_radius_envelope_wraps_longitude() {
        let env = radius_envelope(&Point::new(179.9, 0.0), 50_000.0);
        assert_eq!(env.min_x, -180.0);
        assert_eq!(env.max_x, 180.0);
    }

    #[test]
    fn test_radius_envelope_clamps_poles() {
        let env = radius_envelope(&Point::new(0.0, 89.9), 50_000.0);
        assert_eq!(env.max_y, 90.0);
        assert_eq!(env.min_x, -180.0);
        assert_eq!(env.max_x, 180.0);
    }

    #[test]
    fn test_distance_to_envelope() {
        let env = Envelope::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(distance_to_envelope(&Point::new(0.5, 0.5), &env), 0.0);

        let outside = distance_to_envelope(&Point::new(2.0, 0.5), &env);
        let expected = haversine_distance(&Point::new(2.0, 0.5), &Point::new(1.0, 0.5));
        assert_eq!(outside, expected);
        assert!(outside > 100_000.0);
    }
}
