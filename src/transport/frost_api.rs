//! The three Frost services the search talks to, behind the [`FrostSource`] seam.

use crate::config::FrostConfig;
use crate::transport::error::ApiError;
use crate::transport::http_client::{Endpoint, HttpClient};
use crate::types::query::{ObservationQuery, RegionQuery};
use crate::types::responses::observations::ObservationsResponse;
use crate::types::responses::station_list::StationListResponse;
use crate::types::responses::station_search::StationSearchResponse;
use crate::types::time_range::{format_instant, TimeRange};
use log::{debug, info};
use std::future::Future;

/// Remote data the climate search depends on.
///
/// Every operation resolves to `Ok(None)` when the service reports that there is no data.
/// [`FrostApi`] is the production implementation; anything else that can answer these three
/// queries (a recorded fixture, an in-memory store) can drive the search too.
pub trait FrostSource {
    /// Time series of the requested elements whose station lies inside any of the polygons.
    fn search_stations(
        &self,
        query: &RegionQuery,
    ) -> impl Future<Output = Result<Option<StationSearchResponse>, ApiError>> + Send;

    /// Observations of the requested stations and elements over the query's time range.
    fn fetch_observations(
        &self,
        query: &ObservationQuery,
    ) -> impl Future<Output = Result<Option<ObservationsResponse>, ApiError>> + Send;

    /// Every station measuring `element` within `time_range`.
    fn list_stations(
        &self,
        element: &str,
        time_range: &TimeRange,
    ) -> impl Future<Output = Result<Option<StationListResponse>, ApiError>> + Send;
}

/// [`FrostSource`] backed by the met.no HTTP services.
#[derive(Debug, Clone)]
pub struct FrostApi {
    http: HttpClient,
    config: FrostConfig,
}

impl FrostApi {
    pub fn new(config: FrostConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &FrostConfig {
        &self.config
    }

    fn search_endpoint(&self, query: &RegionQuery) -> Result<Endpoint, ApiError> {
        Ok(Endpoint::new(&self.config.search_url)
            .param("incobs", "false")
            .param("elementids", query.elements.join(","))
            .param("time", query.time_range.to_interval_string())
            .param("inside", query.polygons_json()?)
            .authenticated())
    }

    fn observations_endpoint(&self, query: &ObservationQuery) -> Endpoint {
        Endpoint::new(&self.config.observations_url)
            .param("sources", query.sources_param())
            .param("referencetime", query.time_range.to_interval_string())
            .param("elements", query.elements_param())
            .authenticated()
    }

    fn station_list_endpoint(&self, element: &str, time_range: &TimeRange) -> Endpoint {
        Endpoint::new(&self.config.station_list_url)
            .param("weatherElements", element)
            .param("from", format_instant(&time_range.from))
            .param("to", format_instant(&time_range.to))
    }
}

impl FrostSource for FrostApi {
    async fn search_stations(
        &self,
        query: &RegionQuery,
    ) -> Result<Option<StationSearchResponse>, ApiError> {
        let endpoint = self.search_endpoint(query)?;
        info!(
            "Searching {} polygon(s) for {} element(s)",
            query.polygons.len(),
            query.elements.len()
        );
        self.http.get_json(&endpoint).await
    }

    async fn fetch_observations(
        &self,
        query: &ObservationQuery,
    ) -> Result<Option<ObservationsResponse>, ApiError> {
        if query.is_empty() {
            debug!("Skipping empty observation query");
            return Ok(None);
        }
        info!(
            "Fetching observations of {} station(s) for {} element(s)",
            query.stations.len(),
            query.elements.len()
        );
        self.http.get_json(&self.observations_endpoint(query)).await
    }

    async fn list_stations(
        &self,
        element: &str,
        time_range: &TimeRange,
    ) -> Result<Option<StationListResponse>, ApiError> {
        info!("Listing stations measuring {}", element);
        self.http
            .get_json(&self.station_list_endpoint(element, time_range))
            .await
    }
}
