//! Bucket averages from the closest station that has a complete window.

use crate::error::FrostClimateError;
use crate::search::accumulator::ObservationAccumulator;
use crate::search::geometry::surface_distance;
use crate::transport::frost_api::FrostSource;
use crate::types::point::Point;
use crate::types::query::ObservationQuery;
use crate::types::responses::normalize_source_id;
use crate::types::time_range::{TimeInterval, TimeRange};
use log::{debug, info};
use ordered_float::OrderedFloat;
use std::collections::{BTreeSet, HashSet};

/// Walks the stations listed for `element` from closest to farthest, fetching one at a time,
/// and returns the `interval` bucket averages of the first one with every bucket filled.
pub async fn nearest_window<S: FrostSource>(
    source: &S,
    location: Point,
    element: &str,
    interval: TimeInterval,
    time_range: TimeRange,
) -> Result<Vec<f64>, FrostClimateError> {
    let no_stations = || FrostClimateError::NoStationsListed {
        element: element.to_string(),
    };
    let listed = source
        .list_stations(element, &time_range)
        .await?
        .ok_or_else(no_stations)?;

    let mut seen = HashSet::new();
    let mut stations: Vec<(OrderedFloat<f64>, String)> = listed
        .data
        .iter()
        .filter_map(|station| {
            let point = station.location()?;
            let id = normalize_source_id(&station.id).to_string();
            Some((OrderedFloat(surface_distance(&location, &point)), id))
        })
        .filter(|(_, id)| seen.insert(id.clone()))
        .collect();
    if stations.is_empty() {
        return Err(no_stations());
    }
    stations.sort();
    info!("{} station(s) listed for {}", stations.len(), element);

    let mut checked = 0;
    for (distance, station) in stations {
        checked += 1;
        let query = ObservationQuery {
            stations: BTreeSet::from([station.clone()]),
            elements: BTreeSet::from([element.to_string()]),
            time_range,
        };
        let Some(response) = source.fetch_observations(&query).await? else {
            debug!("Station {} has no {} data", station, element);
            continue;
        };
        let mut accumulator = ObservationAccumulator::for_range(interval, &time_range);
        accumulator.ingest(&response);
        if accumulator.is_complete(element, &station) {
            if let Some(averages) = accumulator.average_array(element, &station) {
                info!(
                    "Using station {} at {:.1} km for {} ({})",
                    station,
                    distance.into_inner(),
                    element,
                    interval
                );
                return Ok(averages);
            }
        }
        debug!("Station {} has an incomplete {} window", station, interval);
    }

    Err(FrostClimateError::NoCompleteWindow {
        element: element.to_string(),
        interval: interval.to_string(),
        checked,
    })
}
