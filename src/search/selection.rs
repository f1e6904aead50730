//! Decides which stations to fetch and which quadrants need a wider search.

use crate::search::geometry::distance;
use crate::search::mode_classifier::{reclassify, EXCEEDED_STEP};
use crate::search::region_query::AreaRequests;
use crate::search::state::{ElementState, QuadrantState, SearchState, NEAREST_RADIUS_KM};
use crate::types::mode::Mode;
use crate::types::quadrant::{Quadrant, QuadrantMap};
use crate::types::responses::station_search::StationSearchResponse;
use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap};

/// Relative weight a further ring must still carry to be worth searching.
pub const MIN_PROBE_WEIGHT: f64 = 0.04;

/// Interpolation is considered covered once this many quadrants contribute.
const COVERED_QUADRANTS: usize = 3;

/// The next observation fetch: every station and element missing data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchPlan {
    pub stations: BTreeSet<String>,
    pub elements: BTreeSet<String>,
}

impl FetchPlan {
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    fn add(&mut self, station: &str, element: &str) {
        self.stations.insert(station.to_string());
        self.elements.insert(element.to_string());
    }
}

/// Weight the next ring of `quadrant` would get if every quadrant's current step were used as
/// its distance: `(1/(s_q+1)²) / (Σ_{p≠q} 1/s_p² + 1/(s_q+1)²)`.
pub fn idw_probe_weight(quadrants: &QuadrantMap<QuadrantState>, quadrant: Quadrant) -> f64 {
    let probe = f64::from(quadrants[quadrant].search_step + 1);
    let probe_weight = 1.0 / (probe * probe);
    let others: f64 = quadrants
        .iter()
        .filter(|(q, _)| *q != quadrant)
        .map(|(_, state)| {
            let step = f64::from(state.search_step);
            1.0 / (step * step)
        })
        .sum();
    probe_weight / (others + probe_weight)
}

/// Requests a wider area for `quadrant` when the element's mode still wants one there.
///
/// `covered` is the number of quadrants already contributing, or able to contribute, data.
pub fn maybe_request_area(
    requests: &mut AreaRequests,
    element: &ElementState,
    quadrant: Quadrant,
    covered: usize,
) {
    let state = &element.quadrants[quadrant];
    if state.search_step >= EXCEEDED_STEP {
        return;
    }
    let wanted = match element.mode {
        Mode::Interpolation => {
            state.usable.is_empty()
                && (covered < COVERED_QUADRANTS
                    || idw_probe_weight(&element.quadrants, quadrant) > MIN_PROBE_WEIGHT)
        }
        Mode::Extrapolation => state.usable.len() < 2,
        Mode::Nearest | Mode::Fail => false,
    };
    if wanted {
        debug!(
            "{}: requesting more area in {} (step {})",
            element.id, quadrant, state.search_step
        );
        requests.insert(&element.id, quadrant);
    }
}

/// Applies a station-search response: records locations, offers nearest candidates, queues
/// stations per quadrant, reclassifies modes, and returns the quadrants that still need area.
///
/// `None` stands for a round without results, either an empty answer or no call at all.
pub fn assign_stations(
    state: &mut SearchState,
    response: Option<&StationSearchResponse>,
) -> AreaRequests {
    let mut batches: HashMap<(String, Quadrant), Vec<(String, f64)>> = HashMap::new();

    for series in response.map(|r| r.data.tseries.as_slice()).unwrap_or_default() {
        let station = series.station_id();
        let element_id = series.element_id();
        let Some(found_at) = series.location() else {
            warn!(
                "Station {} has no usable location for {}, skipping",
                station, element_id
            );
            continue;
        };
        let location = state.record_location(station, found_at);
        let quadrant = Quadrant::classify(&state.center, &location);
        let distance_km = distance(&state.center, &location);

        let Some(element) = state.element_mut(element_id) else {
            debug!("Ignoring station {} for unrequested {}", station, element_id);
            continue;
        };
        if distance_km < NEAREST_RADIUS_KM {
            element.offer_nearest(station, distance_km);
        }
        batches
            .entry((element_id.to_string(), quadrant))
            .or_default()
            .push((station.to_string(), distance_km));
    }

    let mut requests = AreaRequests::default();
    for element in &mut state.elements {
        if element.mode != Mode::Nearest {
            reclassify(element);
        }
        for quadrant in Quadrant::ALL {
            if let Some(batch) = batches.remove(&(element.id.clone(), quadrant)) {
                let added = element.enqueue_stations(quadrant, batch);
                if added > 0 {
                    debug!("{}: queued {} station(s) in {}", element.id, added, quadrant);
                }
            }
        }
        // Stations found so far are not judged yet, so every quadrant counts as covered and
        // only the IDW weight decides whether an empty quadrant widens.
        for quadrant in Quadrant::ALL {
            if element.quadrants[quadrant].queue.is_empty() {
                maybe_request_area(&mut requests, element, quadrant, Quadrant::ALL.len());
            }
        }
    }
    requests
}

/// Decides the next observation fetch, evaluating the previous one on the way.
///
/// Nearest elements request their closest candidate until it is complete. Other elements first
/// judge the last station requested per quadrant, then request the next queued station where
/// the quadrant still lacks usable stations. Quadrants with an exhausted queue are added to
/// `requests` instead.
pub fn next_fetches(state: &mut SearchState, requests: &mut AreaRequests) -> FetchPlan {
    let SearchState {
        elements,
        observations,
        ..
    } = state;
    let mut plan = FetchPlan::default();

    for element in elements.iter_mut() {
        if element.mode == Mode::Nearest && !element.nearest.satisfied {
            let id = element.id.clone();
            advance_nearest(
                element,
                |station| observations.is_complete(&id, station),
                &mut plan,
            );
        }

        if !matches!(element.mode, Mode::Interpolation | Mode::Extrapolation) {
            continue;
        }

        let mut wanting = Vec::new();
        for quadrant in Quadrant::ALL {
            if let Some(station) = element.quadrants[quadrant]
                .pending_evaluation()
                .map(str::to_string)
            {
                if observations.is_complete(&element.id, &station) {
                    if element.mark_usable(quadrant, &station) {
                        debug!("{}: station {} is usable ({})", element.id, station, quadrant);
                    }
                } else {
                    debug!("{}: station {} is incomplete", element.id, station);
                }
                let quadrant_state = &mut element.quadrants[quadrant];
                quadrant_state.queue_pointer = -quadrant_state.queue_pointer;
            }
            let usable = element.quadrants[quadrant].usable.len();
            let wants_more = match element.mode {
                Mode::Interpolation => usable == 0,
                _ => usable < 3,
            };
            if wants_more {
                wanting.push(quadrant);
            }
        }

        let covered = element.usable_quadrant_count();
        for quadrant in wanting {
            let quadrant_state = &mut element.quadrants[quadrant];
            let next = quadrant_state.position() + 1;
            if let Some(station) = quadrant_state.queue.get(next - 1) {
                plan.add(station, &element.id);
                quadrant_state.queue_pointer = next as i64;
            } else {
                maybe_request_area(requests, element, quadrant, covered);
            }
        }
    }
    plan
}

/// Walks the nearest candidates of an element. A candidate is judged only after it was
/// fetched; incomplete ones are dropped. When the list runs dry the element falls back to the
/// radius-based modes.
fn advance_nearest(
    element: &mut ElementState,
    is_complete: impl Fn(&str) -> bool,
    plan: &mut FetchPlan,
) {
    loop {
        let Some(head) = element.nearest.head().map(str::to_string) else {
            info!("{}: no complete station nearby", element.id);
            reclassify(element);
            return;
        };
        if is_complete(&head) {
            info!("{}: using nearest station {}", element.id, head);
            element.nearest.satisfied = true;
            return;
        }
        if element.nearest.was_fetched(&head) {
            debug!("{}: nearest station {} is incomplete", element.id, head);
            element.nearest.pop_head();
            continue;
        }
        element.nearest.mark_fetched(&head);
        plan.add(&head, &element.id);
        return;
    }
}
