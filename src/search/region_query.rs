//! Builds the station-search query of each round.

use crate::search::geometry::{annular_sector, ring_radius, search_circle, RING_WIDTH_KM};
use crate::search::state::SearchState;
use crate::types::quadrant::Quadrant;
use crate::types::query::RegionQuery;
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// The (element, quadrant) pairs that need their search area widened next round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaRequests(BTreeMap<String, BTreeSet<Quadrant>>);

impl AreaRequests {
    pub fn insert(&mut self, element: &str, quadrant: Quadrant) {
        self.0.entry(element.to_string()).or_default().insert(quadrant);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    pub fn contains(&self, element: &str, quadrant: Quadrant) -> bool {
        self.0.get(element).is_some_and(|q| q.contains(&quadrant))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Quadrant)> {
        self.0
            .iter()
            .flat_map(|(element, quadrants)| quadrants.iter().map(move |q| (element.as_str(), *q)))
    }
}

/// First round: one 20 km circle for every element.
pub fn initial_query(state: &SearchState) -> RegionQuery {
    RegionQuery {
        elements: state.elements.iter().map(|e| e.id.clone()).collect(),
        time_range: state.time_range,
        polygons: vec![search_circle(&state.center, RING_WIDTH_KM)],
    }
}

/// Later rounds: advances the step of every requested pair and adds the matching ring, once
/// per distinct (quadrant, step). Pairs of settled elements are skipped. Returns `None` when
/// nothing is left to search.
pub fn expansion_query(state: &mut SearchState, requests: &AreaRequests) -> Option<RegionQuery> {
    let mut rings: HashSet<(Quadrant, u32)> = HashSet::new();
    let mut polygons = Vec::new();

    for (element_id, quadrant) in requests.iter() {
        let Some(element) = state.element_mut(element_id) else {
            continue;
        };
        if element.is_settled() {
            debug!("{}: skipping {} expansion, element is settled", element_id, quadrant);
            continue;
        }
        let step = element.advance_quadrant(quadrant);
        debug!("{}: {} advanced to step {}", element_id, quadrant, step);
        if rings.insert((quadrant, step)) {
            polygons.push(annular_sector(&state.center, ring_radius(step), quadrant));
        }
    }

    if polygons.is_empty() {
        return None;
    }

    let elements: Vec<String> = state
        .elements
        .iter()
        .filter(|e| !e.is_settled())
        .map(|e| e.id.clone())
        .collect();
    info!(
        "Searching {} ring(s) for {} element(s)",
        polygons.len(),
        elements.len()
    );
    Some(RegionQuery {
        elements,
        time_range: state.time_range,
        polygons,
    })
}
