//! Queries handed to a [`FrostSource`](crate::FrostSource).

use crate::types::point::Point;
use crate::types::time_range::TimeRange;
use serde::Serialize;
use std::collections::BTreeSet;

/// A closed ring of vertices. The last vertex connects back to the first implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    /// Ray-casting point-in-polygon test on raw latitude/longitude.
    ///
    /// The search itself never calls this: Frost filters stations server-side. It is the
    /// filter a custom [`FrostSource`](crate::FrostSource) serving stations from memory or a
    /// local cache applies to each [`RegionQuery`] polygon.
    ///
    /// # Examples
    ///
    /// ```
    /// use frost_climate::{annular_sector, ring_radius, search_circle, Point, Quadrant};
    ///
    /// let oslo = Point::new(59.91, 10.75);
    /// let circle = search_circle(&oslo, ring_radius(1));
    /// assert!(circle.contains(&Point::new(59.95, 10.80)));
    /// assert!(!circle.contains(&Point::new(61.11, 10.47)));
    ///
    /// let ring = annular_sector(&oslo, ring_radius(2), Quadrant::NorthEast);
    /// assert!(!ring.contains(&oslo));
    /// ```
    pub fn contains(&self, point: &Point) -> bool {
        let vertices = &self.0;
        if vertices.len() < 3 {
            return false;
        }
        let (x, y) = (point.longitude, point.latitude);
        let mut inside = false;
        let mut j = vertices.len() - 1;
        for i in 0..vertices.len() {
            let (xi, yi) = (vertices[i].longitude, vertices[i].latitude);
            let (xj, yj) = (vertices[j].longitude, vertices[j].latitude);
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

#[derive(Serialize)]
struct PolygonParam {
    #[serde(rename = "type")]
    kind: &'static str,
    pos: Vec<PositionParam>,
}

#[derive(Serialize)]
struct PositionParam {
    lat: f64,
    lon: f64,
}

/// Frost does not accept more than four decimals.
fn round_coordinate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One station-search round: the union of `polygons`, for every element in `elements`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionQuery {
    pub elements: Vec<String>,
    pub time_range: TimeRange,
    pub polygons: Vec<Polygon>,
}

impl RegionQuery {
    /// Serializes the polygon set as the `inside` parameter:
    /// `[{"type":"polygon","pos":[{"lat":..,"lon":..},..]},..]`.
    pub fn polygons_json(&self) -> Result<String, serde_json::Error> {
        let params: Vec<PolygonParam> = self
            .polygons
            .iter()
            .map(|polygon| PolygonParam {
                kind: "polygon",
                pos: polygon
                    .vertices()
                    .iter()
                    .map(|p| PositionParam {
                        lat: round_coordinate(p.latitude),
                        lon: round_coordinate(p.longitude),
                    })
                    .collect(),
            })
            .collect();
        serde_json::to_string(&params)
    }
}

/// An observation fetch for a set of stations and elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    /// Station ids without the `SN` prefix.
    pub stations: BTreeSet<String>,
    pub elements: BTreeSet<String>,
    pub time_range: TimeRange,
}

impl ObservationQuery {
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty() || self.elements.is_empty()
    }

    /// The `sources` parameter: `SN18700,SN18701`.
    pub fn sources_param(&self) -> String {
        self.stations
            .iter()
            .map(|id| format!("SN{id}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn elements_param(&self) -> String {
        self.elements.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn range() -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_polygons_json_rounds_to_four_decimals() {
        let query = RegionQuery {
            elements: vec!["mean(air_temperature P1M)".to_string()],
            time_range: range(),
            polygons: vec![Polygon(vec![
                Point::new(59.123456, 10.987654),
                Point::new(59.5, 11.0),
            ])],
        };
        assert_eq!(
            query.polygons_json().unwrap(),
            r#"[{"type":"polygon","pos":[{"lat":59.1235,"lon":10.9877},{"lat":59.5,"lon":11.0}]}]"#
        );
    }

    #[test]
    fn test_polygon_contains() {
        let square = Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ]);
        assert!(square.contains(&Point::new(0.5, 0.5)));
        assert!(!square.contains(&Point::new(1.5, 0.5)));
        assert!(!Polygon(vec![]).contains(&Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_observation_params() {
        let query = ObservationQuery {
            stations: ["18700".to_string(), "18210".to_string()].into(),
            elements: [
                "mean(air_temperature P1M)".to_string(),
                "mean(cloud_area_fraction P1M)".to_string(),
            ]
            .into(),
            time_range: range(),
        };
        assert_eq!(query.sources_param(), "SN18210,SN18700");
        assert_eq!(
            query.elements_param(),
            "mean(air_temperature P1M),mean(cloud_area_fraction P1M)"
        );
        assert!(!query.is_empty());
    }
}
