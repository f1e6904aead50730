//! All mutable bookkeeping of one climate-profile search.
//!
//! State is created fresh for every estimate and dropped after fusion. Every write goes through
//! a named operation on [`SearchState`] or [`ElementState`] so the invariants below hold:
//!
//! * a quadrant's search step never decreases;
//! * a station is queued at most once per element, and becomes usable at most once;
//! * a queue is append-only, distance-ascending within each appended batch.

use crate::search::accumulator::ObservationAccumulator;
use crate::types::mode::Mode;
use crate::types::point::Point;
use crate::types::quadrant::{Quadrant, QuadrantMap};
use crate::types::time_range::{TimeInterval, TimeRange};
use log::debug;
use ordered_float::OrderedFloat;
use std::collections::{HashMap, HashSet};

/// Stations closer than this (km) put an element into [`Mode::Nearest`].
pub const NEAREST_RADIUS_KM: f64 = 5.0;

/// Search progress of one element in one quadrant.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantState {
    /// Rings searched so far; ring `n` spans `(n-1)*20..n*20` km.
    pub search_step: u32,
    /// Station ids in the order they were found.
    pub queue: Vec<String>,
    /// 1-based index of the last requested queue entry. Positive while the entry still has to
    /// be evaluated, negated once it has been.
    pub queue_pointer: i64,
    pub usable: Vec<String>,
}

impl Default for QuadrantState {
    fn default() -> Self {
        Self {
            search_step: 1,
            queue: Vec::new(),
            queue_pointer: 0,
            usable: Vec::new(),
        }
    }
}

impl QuadrantState {
    /// Queue position of the last requested entry, ignoring the evaluated flag.
    pub fn position(&self) -> usize {
        self.queue_pointer.unsigned_abs() as usize
    }

    /// The entry waiting for evaluation, if the pointer is positive.
    pub fn pending_evaluation(&self) -> Option<&str> {
        if self.queue_pointer > 0 {
            self.queue.get(self.position() - 1).map(String::as_str)
        } else {
            None
        }
    }
}

/// Distance-ordered stations within [`NEAREST_RADIUS_KM`] of the target.
#[derive(Debug, Clone, Default)]
pub struct NearestCandidates {
    candidates: Vec<(OrderedFloat<f64>, String)>,
    fetched: HashSet<String>,
    pub satisfied: bool,
}

impl NearestCandidates {
    /// Inserts a candidate keeping distance order. Returns `false` if it was already known.
    pub fn offer(&mut self, station: &str, distance_km: f64) -> bool {
        if self.candidates.iter().any(|(_, id)| id == station) {
            return false;
        }
        let key = OrderedFloat(distance_km);
        let index = self.candidates.partition_point(|(d, _)| *d <= key);
        self.candidates.insert(index, (key, station.to_string()));
        true
    }

    pub fn head(&self) -> Option<&str> {
        self.candidates.first().map(|(_, id)| id.as_str())
    }

    pub fn pop_head(&mut self) -> Option<String> {
        if self.candidates.is_empty() {
            None
        } else {
            Some(self.candidates.remove(0).1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn was_fetched(&self, station: &str) -> bool {
        self.fetched.contains(station)
    }

    pub fn mark_fetched(&mut self, station: &str) {
        self.fetched.insert(station.to_string());
    }
}

/// Everything tracked for one requested element.
#[derive(Debug, Clone)]
pub struct ElementState {
    pub id: String,
    pub mode: Mode,
    pub quadrants: QuadrantMap<QuadrantState>,
    pub nearest: NearestCandidates,
    queued: HashSet<String>,
}

impl ElementState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            mode: Mode::default(),
            quadrants: QuadrantMap::from_fn(|_| QuadrantState::default()),
            nearest: NearestCandidates::default(),
            queued: HashSet::new(),
        }
    }

    /// Bumps the search step of a quadrant and returns the new step.
    pub fn advance_quadrant(&mut self, quadrant: Quadrant) -> u32 {
        let state = &mut self.quadrants[quadrant];
        state.search_step += 1;
        state.search_step
    }

    /// Appends a batch of `(station, distance)` to a quadrant queue, sorted by distance.
    /// Stations already queued for this element, in any quadrant, are dropped. Returns the
    /// number of stations actually appended.
    pub fn enqueue_stations(
        &mut self,
        quadrant: Quadrant,
        mut batch: Vec<(String, f64)>,
    ) -> usize {
        batch.sort_by_key(|(_, distance)| OrderedFloat(*distance));
        let queue = &mut self.quadrants[quadrant].queue;
        let before = queue.len();
        for (station, _) in batch {
            if self.queued.insert(station.clone()) {
                queue.push(station);
            }
        }
        queue.len() - before
    }

    /// Adds a station to a quadrant's usable list. Returns `false` if it already was usable.
    pub fn mark_usable(&mut self, quadrant: Quadrant, station: &str) -> bool {
        let usable = &mut self.quadrants[quadrant].usable;
        if usable.iter().any(|id| id == station) {
            return false;
        }
        usable.push(station.to_string());
        true
    }

    /// Offers a station within the nearest radius; switches the element to
    /// [`Mode::Nearest`] unless it is already satisfied.
    pub fn offer_nearest(&mut self, station: &str, distance_km: f64) {
        if self.nearest.satisfied || distance_km >= NEAREST_RADIUS_KM {
            return;
        }
        if self.nearest.offer(station, distance_km) {
            debug!(
                "{}: nearest candidate {} at {:.2} km",
                self.id, station, distance_km
            );
        }
        self.mode = Mode::Nearest;
    }

    /// Elements that need no more stations: failed or satisfied by a nearest station.
    pub fn is_settled(&self) -> bool {
        self.mode == Mode::Fail || (self.mode == Mode::Nearest && self.nearest.satisfied)
    }

    pub fn usable_quadrant_count(&self) -> usize {
        self.quadrants.values().filter(|q| !q.usable.is_empty()).count()
    }
}

/// The aggregate passed through the search rounds.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub center: Point,
    pub time_range: TimeRange,
    pub elements: Vec<ElementState>,
    /// First known location of each station.
    pub locations: HashMap<String, Point>,
    pub observations: ObservationAccumulator,
    /// Remote calls made so far.
    pub request_count: usize,
}

impl SearchState {
    pub fn new(center: Point, elements: &[String], time_range: TimeRange) -> Self {
        let mut states: Vec<ElementState> = Vec::with_capacity(elements.len());
        for element in elements {
            if !states.iter().any(|s| &s.id == element) {
                states.push(ElementState::new(element.clone()));
            }
        }
        Self {
            center,
            time_range,
            elements: states,
            locations: HashMap::new(),
            observations: ObservationAccumulator::new(TimeInterval::Month),
            request_count: 0,
        }
    }

    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut ElementState> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Stores the location of a station the first time it is seen and returns the stored
    /// location.
    pub fn record_location(&mut self, station: &str, location: Point) -> Point {
        *self
            .locations
            .entry(station.to_string())
            .or_insert(location)
    }

    pub fn location(&self, station: &str) -> Option<&Point> {
        self.locations.get(station)
    }
}
