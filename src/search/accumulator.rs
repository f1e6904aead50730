//! Running per-bucket sums of observations, keyed by element and station.

use crate::types::element::normalize_value;
use crate::types::responses::normalize_source_id;
use crate::types::responses::observations::ObservationsResponse;
use crate::types::time_range::{TimeInterval, TimeRange};
use std::collections::{BTreeMap, HashMap};

/// `(sum, count)` per 1-based bucket for one station and element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketSums(BTreeMap<u32, (f64, u32)>);

impl BucketSums {
    pub fn add(&mut self, bucket: u32, value: f64) {
        let entry = self.0.entry(bucket).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    /// Number of distinct buckets that have at least one observation.
    pub fn filled(&self) -> usize {
        self.0.len()
    }

    pub fn average(&self, bucket: u32) -> Option<f64> {
        self.0
            .get(&bucket)
            .map(|(sum, count)| sum / f64::from(*count))
    }

    /// Bucket averages as a dense array of `len` entries. Empty buckets read as `0.0` and
    /// buckets outside `1..=len` are ignored.
    pub fn average_array(&self, len: usize) -> Vec<f64> {
        let mut averages = vec![0.0; len];
        for (&bucket, &(sum, count)) in &self.0 {
            let index = bucket as usize;
            if (1..=len).contains(&index) {
                averages[index - 1] = sum / f64::from(count);
            }
        }
        averages
    }
}

/// Observations aggregated per element, per station, per bucket of `interval`.
#[derive(Debug, Clone)]
pub struct ObservationAccumulator {
    interval: TimeInterval,
    bucket_count: usize,
    series: HashMap<String, HashMap<String, BucketSums>>,
}

impl ObservationAccumulator {
    pub fn new(interval: TimeInterval) -> Self {
        Self {
            interval,
            bucket_count: interval.bucket_count(),
            series: HashMap::new(),
        }
    }

    /// An accumulator whose completeness only asks for the buckets `range` can fill.
    pub fn for_range(interval: TimeInterval, range: &TimeRange) -> Self {
        Self {
            bucket_count: interval.bucket_count_within(range),
            ..Self::new(interval)
        }
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Adds an already normalized value to a bucket.
    pub fn add(&mut self, element: &str, station: &str, bucket: u32, value: f64) {
        self.series
            .entry(element.to_string())
            .or_default()
            .entry(station.to_string())
            .or_default()
            .add(bucket, value);
    }

    /// Normalizes and aggregates every observation in a response. Returns how many values
    /// were added.
    pub fn ingest(&mut self, response: &ObservationsResponse) -> usize {
        let mut added = 0;
        for entry in &response.data {
            let station = normalize_source_id(&entry.source_id);
            let bucket = self.interval.bucket(&entry.reference_time);
            for observation in &entry.observations {
                let value = normalize_value(&observation.element_id, observation.value);
                self.add(&observation.element_id, station, bucket, value);
                added += 1;
            }
        }
        added
    }

    pub fn station(&self, element: &str, station: &str) -> Option<&BucketSums> {
        self.series.get(element)?.get(station)
    }

    /// True once every bucket of the interval has at least one observation.
    pub fn is_complete(&self, element: &str, station: &str) -> bool {
        self.station(element, station)
            .is_some_and(|sums| sums.filled() >= self.bucket_count)
    }

    /// The dense average array of a station, `None` if nothing was recorded for it.
    pub fn average_array(&self, element: &str, station: &str) -> Option<Vec<f64>> {
        self.station(element, station)
            .map(|sums| sums.average_array(self.bucket_count))
    }
}
