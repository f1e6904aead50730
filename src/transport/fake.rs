//! In-memory [`FrostSource`] for exercising the search without a network.

use crate::transport::error::ApiError;
use crate::transport::frost_api::FrostSource;
use crate::types::point::Point;
use crate::types::query::{ObservationQuery, RegionQuery};
use crate::types::responses::observations::{Observation, ObservationData, ObservationsResponse};
use crate::types::responses::station_list::{Geometry, ListedStation, StationListResponse};
use crate::types::responses::station_search::{
    ElementInfo, LocationRecord, LocationValue, StationInfo, StationSearchData,
    StationSearchResponse, TimeSeries, TimeSeriesExtra, TimeSeriesHeader, TimeSeriesId,
};
use crate::types::time_range::TimeRange;
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct FakeStation {
    pub id: String,
    pub location: Point,
    series: HashMap<String, Vec<(DateTime<Utc>, f64)>>,
}

impl FakeStation {
    pub fn new(id: &str, location: Point) -> Self {
        Self {
            id: id.to_string(),
            location,
            series: HashMap::new(),
        }
    }

    /// One reading on the first of each month of 2020, January first.
    pub fn monthly(mut self, element: &str, values: &[f64]) -> Self {
        let readings = values
            .iter()
            .zip(1..=12)
            .filter_map(|(value, month)| {
                let time = Utc.with_ymd_and_hms(2020, month, 1, 0, 0, 0).single()?;
                Some((time, *value))
            })
            .collect();
        self.series.insert(element.to_string(), readings);
        self
    }

    /// One reading at each of the given hours of 2020-06-01.
    pub fn hourly(mut self, element: &str, hours: impl IntoIterator<Item = u32>, value: f64) -> Self {
        let readings = hours
            .into_iter()
            .filter_map(|hour| {
                let time = Utc.with_ymd_and_hms(2020, 6, 1, hour, 0, 0).single()?;
                Some((time, value))
            })
            .collect();
        self.series.insert(element.to_string(), readings);
        self
    }

    /// One reading at noon on the Monday of each given ISO week of 2019.
    pub fn weekly(mut self, element: &str, weeks: impl IntoIterator<Item = u32>, value: f64) -> Self {
        let readings = weeks
            .into_iter()
            .filter_map(|week| {
                let monday = NaiveDate::from_isoywd_opt(2019, week, Weekday::Mon)?;
                Some((monday.and_hms_opt(12, 0, 0)?.and_utc(), value))
            })
            .collect();
        self.series.insert(element.to_string(), readings);
        self
    }

    fn measures(&self, element: &str) -> bool {
        self.series.contains_key(element)
    }

    fn time_series(&self, element: &str) -> TimeSeries {
        TimeSeries {
            header: TimeSeriesHeader {
                id: TimeSeriesId {
                    stationid: self.id.clone(),
                },
                extra: TimeSeriesExtra {
                    element: ElementInfo {
                        id: element.to_string(),
                    },
                    station: StationInfo {
                        location: vec![LocationRecord {
                            value: LocationValue {
                                latitude: Some(self.location.latitude),
                                longitude: Some(self.location.longitude),
                                elevation: self.location.elevation,
                            },
                        }],
                    },
                },
                available: None,
            },
        }
    }
}

/// Which call an injected failure applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeCall {
    Search,
    Observations,
    StationList,
}

/// Answers region queries with a point-in-polygon test over its stations.
#[derive(Debug, Default)]
pub(crate) struct FakeFrost {
    stations: Vec<FakeStation>,
    failure: Mutex<Option<(FakeCall, ApiError)>>,
    search_calls: AtomicUsize,
    observation_calls: AtomicUsize,
    list_calls: AtomicUsize,
    search_log: Mutex<Vec<RegionQuery>>,
    observation_log: Mutex<Vec<ObservationQuery>>,
}

impl FakeFrost {
    pub fn new(stations: Vec<FakeStation>) -> Self {
        Self {
            stations,
            ..Self::default()
        }
    }

    /// Makes the next call of the given kind fail with `error`.
    pub fn failing(self, call: FakeCall, error: ApiError) -> Self {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some((call, error));
        }
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn observation_calls(&self) -> usize {
        self.observation_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn search_queries(&self) -> Vec<RegionQuery> {
        self.search_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn observation_queries(&self) -> Vec<ObservationQuery> {
        self.observation_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn take_failure(&self, call: FakeCall) -> Result<(), ApiError> {
        let Ok(mut failure) = self.failure.lock() else {
            return Ok(());
        };
        match failure.take() {
            Some((kind, error)) if kind == call => Err(error),
            other => {
                *failure = other;
                Ok(())
            }
        }
    }

    fn search(&self, query: &RegionQuery) -> Result<Option<StationSearchResponse>, ApiError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.search_log.lock() {
            log.push(query.clone());
        }
        self.take_failure(FakeCall::Search)?;
        let tseries: Vec<TimeSeries> = self
            .stations
            .iter()
            .filter(|s| query.polygons.iter().any(|p| p.contains(&s.location)))
            .flat_map(|s| {
                query
                    .elements
                    .iter()
                    .filter(|e| s.measures(e))
                    .map(|e| s.time_series(e))
            })
            .collect();
        Ok((!tseries.is_empty()).then(|| StationSearchResponse {
            data: StationSearchData { tseries },
        }))
    }

    fn observations(&self, query: &ObservationQuery) -> Result<Option<ObservationsResponse>, ApiError> {
        self.observation_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.observation_log.lock() {
            log.push(query.clone());
        }
        self.take_failure(FakeCall::Observations)?;
        let mut data = Vec::new();
        for station in self.stations.iter().filter(|s| query.stations.contains(&s.id)) {
            for element in &query.elements {
                let Some(readings) = station.series.get(element) else {
                    continue;
                };
                data.extend(readings.iter().map(|(time, value)| ObservationData {
                    source_id: format!("SN{}:0", station.id),
                    reference_time: *time,
                    observations: vec![Observation {
                        element_id: element.clone(),
                        value: *value,
                        unit: None,
                        quality_code: Some(0),
                    }],
                }));
            }
        }
        Ok((!data.is_empty()).then_some(ObservationsResponse { data }))
    }

    fn list(&self, element: &str) -> Result<Option<StationListResponse>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure(FakeCall::StationList)?;
        let data: Vec<ListedStation> = self
            .stations
            .iter()
            .filter(|s| s.measures(element))
            .map(|s| ListedStation {
                id: format!("SN{}:0", s.id),
                name: None,
                geometry: Geometry {
                    coordinates: vec![s.location.longitude, s.location.latitude],
                },
                masl: s.location.elevation,
            })
            .collect();
        Ok((!data.is_empty()).then_some(StationListResponse { data }))
    }
}

impl FrostSource for FakeFrost {
    async fn search_stations(
        &self,
        query: &RegionQuery,
    ) -> Result<Option<StationSearchResponse>, ApiError> {
        self.search(query)
    }

    async fn fetch_observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<Option<ObservationsResponse>, ApiError> {
        self.observations(query)
    }

    async fn list_stations(
        &self,
        element: &str,
        _time_range: &TimeRange,
    ) -> Result<Option<StationListResponse>, ApiError> {
        self.list(element)
    }
}
