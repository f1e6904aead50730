//! Drives the search rounds until every element has converged, then fuses the result.

use crate::search::fusion::fuse_all;
use crate::search::mode_classifier::classify_round;
use crate::search::region_query::{expansion_query, initial_query, AreaRequests};
use crate::search::selection::{assign_stations, next_fetches};
use crate::search::state::SearchState;
use crate::transport::error::ApiError;
use crate::transport::frost_api::FrostSource;
use crate::types::climate_profile::ClimateProfile;
use crate::types::point::Point;
use crate::types::query::ObservationQuery;
use crate::types::time_range::TimeRange;
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Search for stations in the areas that still need them.
    ExpandArea,
    /// Fetch observations of queued stations and judge the previous fetch.
    FetchObservations,
    Converged,
}

/// Estimates the monthly climate of `center` for every element.
///
/// Alternates between widening the station search and fetching observations until no element
/// wants more data, then fuses. The first remote error aborts the whole estimate.
pub async fn estimate<S: FrostSource>(
    source: &S,
    center: Point,
    elements: &[String],
    time_range: TimeRange,
) -> Result<ClimateProfile, ApiError> {
    let mut state = SearchState::new(center, elements, time_range);
    let mut requests = AreaRequests::default();
    let mut first_round = true;
    let mut phase = Phase::ExpandArea;

    while phase != Phase::Converged {
        debug!("Phase {:?}, {} request(s) so far", phase, state.request_count);
        phase = match phase {
            Phase::ExpandArea => {
                classify_round(&mut state.elements);
                let query = if first_round {
                    first_round = false;
                    Some(initial_query(&state))
                } else {
                    expansion_query(&mut state, &requests)
                };
                let response = match query {
                    Some(query) => {
                        state.request_count += 1;
                        source.search_stations(&query).await?
                    }
                    None => None,
                };
                requests = assign_stations(&mut state, response.as_ref());
                if requests.is_empty() {
                    Phase::FetchObservations
                } else {
                    Phase::ExpandArea
                }
            }
            Phase::FetchObservations => {
                requests = AreaRequests::default();
                let plan = next_fetches(&mut state, &mut requests);
                if plan.is_empty() {
                    if requests.is_empty() {
                        Phase::Converged
                    } else {
                        Phase::ExpandArea
                    }
                } else {
                    let query = ObservationQuery {
                        stations: plan.stations,
                        elements: plan.elements,
                        time_range,
                    };
                    state.request_count += 1;
                    if let Some(response) = source.fetch_observations(&query).await? {
                        let added = state.observations.ingest(&response);
                        debug!("Accumulated {} observation(s)", added);
                    }
                    Phase::FetchObservations
                }
            }
            Phase::Converged => Phase::Converged,
        };
    }

    for element in &state.elements {
        info!("{}: converged in mode {}", element.id, element.mode);
    }
    let series = fuse_all(&state);
    info!(
        "Estimated {} of {} element(s) with {} request(s)",
        series.len(),
        state.elements.len(),
        state.request_count
    );
    Ok(ClimateProfile::new(series, state.request_count))
}
