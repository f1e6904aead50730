//! Distance and search-region construction around the estimation target.

use crate::types::point::Point;
use crate::types::quadrant::Quadrant;
use crate::types::query::Polygon;
use haversine::{distance as haversine_distance, Location as HaversineLocation, Units};

/// Width of one search ring, and the radius of the first-round circle.
pub const RING_WIDTH_KM: f64 = 20.0;

const KM_PER_DEGREE_LAT: f64 = 111.32;
const CIRCLE_VERTICES: usize = 20;
const ARC_SEGMENTS: usize = 5;

fn to_haversine(point: &Point) -> HaversineLocation {
    HaversineLocation {
        latitude: point.latitude,
        longitude: point.longitude,
    }
}

/// Great-circle distance in kilometres, ignoring elevation.
pub fn surface_distance(a: &Point, b: &Point) -> f64 {
    haversine_distance(to_haversine(a), to_haversine(b), Units::Kilometers)
}

/// Distance in kilometres between two points. When both carry an elevation the height
/// difference is folded in with Pythagoras; otherwise this is the surface distance.
pub fn distance(a: &Point, b: &Point) -> f64 {
    let surface = surface_distance(a, b);
    match (a.elevation, b.elevation) {
        (Some(ea), Some(eb)) => {
            let height_km = (eb - ea) / 1000.0;
            (surface * surface + height_km * height_km).sqrt()
        }
        _ => surface,
    }
}

/// Moves `distance_km` from `origin` along `bearing_deg` (clockwise from north), using an
/// equirectangular approximation that is good enough at search-ring scale.
pub fn destination_point(origin: &Point, distance_km: f64, bearing_deg: f64) -> Point {
    let bearing = bearing_deg.to_radians();
    let north_km = bearing.cos() * distance_km;
    let east_km = bearing.sin() * distance_km;
    let km_per_degree_lon = KM_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
    Point::new(
        origin.latitude + north_km / KM_PER_DEGREE_LAT,
        origin.longitude + east_km / km_per_degree_lon,
    )
}

/// The first-round region: a 20-gon of the given radius.
pub fn search_circle(center: &Point, radius_km: f64) -> Polygon {
    let vertices = (0..CIRCLE_VERTICES)
        .map(|i| {
            let bearing = i as f64 / CIRCLE_VERTICES as f64 * 360.0;
            destination_point(center, radius_km, bearing)
        })
        .collect();
    Polygon(vertices)
}

/// The 90° slice of the ring between `outer_radius_km - 20` and `outer_radius_km` on the
/// side of `quadrant`. Six vertices run along the outer arc, then six back along the inner arc.
pub fn annular_sector(center: &Point, outer_radius_km: f64, quadrant: Quadrant) -> Polygon {
    let inner_radius_km = (outer_radius_km - RING_WIDTH_KM).max(0.0);
    let start = quadrant.start_bearing();
    let bearing_at = |i: usize| start + i as f64 / ARC_SEGMENTS as f64 * 90.0;

    let outer = (0..=ARC_SEGMENTS).map(|i| destination_point(center, outer_radius_km, bearing_at(i)));
    let inner = (0..=ARC_SEGMENTS)
        .rev()
        .map(|i| destination_point(center, inner_radius_km, bearing_at(i)));
    Polygon(outer.chain(inner).collect())
}

/// Outer radius of the ring searched at `step`.
pub fn ring_radius(step: u32) -> f64 {
    step as f64 * RING_WIDTH_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_distance_properties() {
        let oslo = Point::new(59.91, 10.75).with_elevation(23.0);
        let lillehammer = Point::new(61.115, 10.466).with_elevation(180.0);

        assert_eq!(distance(&oslo, &oslo), 0.0);
        assert_relative_eq!(
            distance(&oslo, &lillehammer),
            distance(&lillehammer, &oslo)
        );
        assert!(distance(&oslo, &lillehammer) >= surface_distance(&oslo, &lillehammer));
        assert_eq!(
            distance(&oslo.surface(), &lillehammer),
            surface_distance(&oslo, &lillehammer)
        );
    }

    #[test]
    fn test_elevation_only_distance() {
        let low = Point::new(60.0, 10.0).with_elevation(0.0);
        let high = Point::new(60.0, 10.0).with_elevation(3000.0);
        assert_relative_eq!(distance(&low, &high), 3.0);
    }

    #[test]
    fn test_destination_point_round_trips_through_distance() {
        let origin = Point::new(59.91, 10.75);
        for bearing in [0.0, 45.0, 90.0, 180.0, 270.0] {
            let moved = destination_point(&origin, 20.0, bearing);
            assert_abs_diff_eq!(surface_distance(&origin, &moved), 20.0, epsilon = 0.2);
        }
        let north = destination_point(&origin, 10.0, 0.0);
        assert!(north.latitude > origin.latitude);
        assert_abs_diff_eq!(north.longitude, origin.longitude, epsilon = 1e-9);
    }

    #[test]
    fn test_search_circle_shape() {
        let center = Point::new(59.91, 10.75);
        let circle = search_circle(&center, RING_WIDTH_KM);
        assert_eq!(circle.vertices().len(), 20);
        assert!(circle.contains(&center));
        assert!(circle.contains(&destination_point(&center, 15.0, 200.0)));
        assert!(!circle.contains(&destination_point(&center, 25.0, 200.0)));
    }

    #[test]
    fn test_annular_sector_covers_its_quadrant_only() {
        let center = Point::new(59.91, 10.75);
        let sector = annular_sector(&center, ring_radius(2), Quadrant::NorthEast);
        assert_eq!(sector.vertices().len(), 12);

        assert!(sector.contains(&destination_point(&center, 30.0, 45.0)));
        assert!(!sector.contains(&destination_point(&center, 10.0, 45.0)));
        assert!(!sector.contains(&destination_point(&center, 45.0, 45.0)));
        assert!(!sector.contains(&destination_point(&center, 30.0, 225.0)));

        let south_west = annular_sector(&center, ring_radius(3), Quadrant::SouthWest);
        assert!(south_west.contains(&destination_point(&center, 50.0, 225.0)));
    }
}
