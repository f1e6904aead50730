use super::deserialize_station_id;
use crate::types::point::Point;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of the `obs/met.no/filter/get` station search.
#[derive(Debug, Clone, Deserialize)]
pub struct StationSearchResponse {
    pub data: StationSearchData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationSearchData {
    #[serde(default)]
    pub tseries: Vec<TimeSeries>,
}

/// One (station, element) time series found inside the queried region.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeries {
    pub header: TimeSeriesHeader,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesHeader {
    pub id: TimeSeriesId,
    pub extra: TimeSeriesExtra,
    #[serde(default)]
    pub available: Option<Availability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesId {
    #[serde(deserialize_with = "deserialize_station_id")]
    pub stationid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesExtra {
    pub element: ElementInfo,
    pub station: StationInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementInfo {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationInfo {
    #[serde(default)]
    pub location: Vec<LocationRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    pub value: LocationValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationValue {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(rename = "elevation(masl/hs)")]
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Availability {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeSeries {
    pub fn station_id(&self) -> &str {
        &self.header.id.stationid
    }

    pub fn element_id(&self) -> &str {
        &self.header.extra.element.id
    }

    /// The first location record, if it carries both coordinates.
    pub fn location(&self) -> Option<Point> {
        let value = &self.header.extra.station.location.first()?.value;
        let point = Point::new(value.latitude?, value.longitude?);
        Some(match value.elevation {
            Some(elevation) => point.with_elevation(elevation),
            None => point,
        })
    }
}
