//! Geographic points used for both the estimation target and the weather stations.

use serde::{Deserialize, Serialize};

/// A geographic point with an optional elevation.
///
/// Latitude and longitude are in decimal degrees, elevation in metres above sea level.
/// Station metadata from Frost does not always carry an elevation, so it stays optional
/// everywhere it flows: distance falls back to the surface distance and elevation correction
/// is skipped when it is unknown.
///
/// # Examples
///
/// ```
/// use frost_climate::Point;
///
/// let oslo = Point::new(59.91, 10.75).with_elevation(23.0);
/// assert_eq!(oslo.latitude, 59.91);
/// assert_eq!(oslo.elevation, Some(23.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
}

impl Point {
    /// Creates a point without elevation.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation: None,
        }
    }

    /// Returns a copy of this point carrying the given elevation (metres).
    pub fn with_elevation(self, elevation: f64) -> Self {
        Self {
            elevation: Some(elevation),
            ..self
        }
    }

    /// Returns a copy of this point without elevation.
    pub fn surface(self) -> Self {
        Self {
            elevation: None,
            ..self
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Point::new(latitude, longitude)
    }
}
