use crate::types::point::Point;
use serde::Deserialize;

/// Response of the station-list service (`api/v1/stations`).
#[derive(Debug, Clone, Deserialize)]
pub struct StationListResponse {
    #[serde(default)]
    pub data: Vec<ListedStation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedStation {
    /// Source id, e.g. `SN18700:0`.
    pub id: String,
    pub name: Option<String>,
    pub geometry: Geometry,
    pub masl: Option<f64>,
}

/// GeoJSON-style geometry; coordinates are `[lon, lat]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub coordinates: Vec<f64>,
}

impl ListedStation {
    /// Surface location of the station, or `None` if the coordinates are malformed.
    pub fn location(&self) -> Option<Point> {
        match self.geometry.coordinates.as_slice() {
            [lon, lat, ..] => Some(Point::new(*lat, *lon)),
            _ => None,
        }
    }
}
