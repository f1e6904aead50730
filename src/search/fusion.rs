//! Turns the converged search state into one series per element.

use crate::search::geometry::distance;
use crate::search::state::{ElementState, SearchState};
use crate::types::element::{
    correction_priority, strategy_for, CorrectionInput, ElementKind,
    ELEVATION_CORRECTION_THRESHOLD_M,
};
use crate::types::mode::Mode;
use log::{debug, warn};
use ordered_float::OrderedFloat;

/// A fused series and the elevation it is representative of.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedSeries {
    pub values: Vec<f64>,
    pub source_elevation: Option<f64>,
}

/// Normalized inverse-squared-distance weights. Contributors at distance zero share the whole
/// weight between them.
pub fn idw_weights(distances: &[f64]) -> Vec<f64> {
    let zero_count = distances.iter().filter(|d| **d == 0.0).count();
    if zero_count > 0 {
        let share = 1.0 / zero_count as f64;
        return distances
            .iter()
            .map(|d| if *d == 0.0 { share } else { 0.0 })
            .collect();
    }
    let raw: Vec<f64> = distances.iter().map(|d| 1.0 / (d * d)).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Fits `value = intercept + slope * distance` per bucket across `samples` and returns the
/// intercepts. A bucket without distance spread falls back to the mean value.
pub fn ols_intercepts(samples: &[(f64, Vec<f64>)]) -> Vec<f64> {
    let Some((_, first)) = samples.first() else {
        return Vec::new();
    };
    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;

    (0..first.len())
        .map(|bucket| {
            let mean_y = samples.iter().map(|(_, ys)| ys[bucket]).sum::<f64>() / n;
            let (numerator, denominator) =
                samples
                    .iter()
                    .fold((0.0, 0.0), |(num, den), (x, ys)| {
                        let dx = x - mean_x;
                        (num + dx * (ys[bucket] - mean_y), den + dx * dx)
                    });
            let slope = if denominator == 0.0 {
                0.0
            } else {
                numerator / denominator
            };
            mean_y - slope * mean_x
        })
        .collect()
}

struct Contributor {
    distance_km: f64,
    values: Vec<f64>,
    elevation: Option<f64>,
}

fn contributor(state: &SearchState, element: &ElementState, station: &str) -> Option<Contributor> {
    let Some(location) = state.location(station) else {
        warn!("{}: usable station {} has no location", element.id, station);
        return None;
    };
    let values = state.observations.average_array(&element.id, station)?;
    Some(Contributor {
        distance_km: distance(&state.center, location),
        values,
        elevation: location.elevation,
    })
}

/// Copies the series of the chosen nearest station.
pub fn fuse_nearest(state: &SearchState, element: &ElementState) -> Option<FusedSeries> {
    let station = element.nearest.head()?;
    let chosen = contributor(state, element, station)?;
    Some(FusedSeries {
        values: chosen.values,
        source_elevation: chosen.elevation,
    })
}

/// Inverse-distance weighting of the closest usable station in each quadrant.
pub fn fuse_interpolation(state: &SearchState, element: &ElementState) -> Option<FusedSeries> {
    let contributors: Vec<Contributor> = element
        .quadrants
        .values()
        .filter_map(|quadrant| {
            quadrant
                .usable
                .iter()
                .filter_map(|station| contributor(state, element, station))
                .min_by_key(|c| OrderedFloat(c.distance_km))
        })
        .collect();
    if contributors.is_empty() {
        return None;
    }

    let distances: Vec<f64> = contributors.iter().map(|c| c.distance_km).collect();
    let weights = idw_weights(&distances);
    let len = state.observations.bucket_count();
    let mut values = vec![0.0; len];
    let mut elevation = Some(0.0);
    for (contributor, weight) in contributors.iter().zip(&weights) {
        for (value, contributed) in values.iter_mut().zip(&contributor.values) {
            *value += contributed * weight;
        }
        elevation = elevation
            .zip(contributor.elevation)
            .map(|(sum, e)| sum + e * weight);
    }
    debug!(
        "{}: interpolated from {} station(s), weights {:?}",
        element.id,
        contributors.len(),
        weights
    );
    Some(FusedSeries {
        values,
        source_elevation: elevation,
    })
}

/// Per-quadrant distance regression evaluated at the target, averaged over quadrants with at
/// least two usable stations.
pub fn fuse_extrapolation(state: &SearchState, element: &ElementState) -> Option<FusedSeries> {
    let mut quadrant_intercepts: Vec<Vec<f64>> = Vec::new();
    let mut elevations: Vec<Option<f64>> = Vec::new();

    for quadrant in element.quadrants.values() {
        if quadrant.usable.len() < 2 {
            continue;
        }
        let contributors: Vec<Contributor> = quadrant
            .usable
            .iter()
            .filter_map(|station| contributor(state, element, station))
            .collect();
        if contributors.len() < 2 {
            continue;
        }
        elevations.extend(contributors.iter().map(|c| c.elevation));
        let samples: Vec<(f64, Vec<f64>)> = contributors
            .into_iter()
            .map(|c| (c.distance_km, c.values))
            .collect();
        quadrant_intercepts.push(ols_intercepts(&samples));
    }
    if quadrant_intercepts.is_empty() {
        return None;
    }

    let count = quadrant_intercepts.len() as f64;
    let len = state.observations.bucket_count();
    let values = (0..len)
        .map(|bucket| {
            quadrant_intercepts
                .iter()
                .map(|intercepts| intercepts[bucket])
                .sum::<f64>()
                / count
        })
        .collect();
    let source_elevation = elevations
        .iter()
        .copied()
        .sum::<Option<f64>>()
        .map(|sum| sum / elevations.len() as f64);
    debug!(
        "{}: extrapolated from {} quadrant(s)",
        element.id,
        quadrant_intercepts.len()
    );
    Some(FusedSeries {
        values,
        source_elevation,
    })
}

/// Fuses one element according to its mode. `None` for failed elements or when no station
/// contributes.
pub fn fuse_element(state: &SearchState, element: &ElementState) -> Option<FusedSeries> {
    match element.mode {
        Mode::Nearest => fuse_nearest(state, element),
        Mode::Interpolation => fuse_interpolation(state, element),
        Mode::Extrapolation => fuse_extrapolation(state, element),
        Mode::Fail => None,
    }
}

/// Corrects every series for the elevation difference between target and source. Temperature
/// is corrected first so snow can follow its shift.
pub fn apply_elevation_corrections(
    target_elevation: Option<f64>,
    fused: &mut [(String, FusedSeries)],
) {
    let mut order: Vec<usize> = (0..fused.len()).collect();
    order.sort_by_key(|&index| correction_priority(&fused[index].0));

    let mut temperature_shift: Vec<f64> = Vec::new();
    let mut corrected_temperature: Option<Vec<f64>> = None;

    for index in order {
        let (element, series) = &mut fused[index];
        let Some(strategy) = strategy_for(element) else {
            continue;
        };
        let is_temperature = strategy.kind == ElementKind::AirTemperature;
        let difference = target_elevation
            .zip(series.source_elevation)
            .map(|(target, source)| target - source)
            .filter(|d| d.abs() > ELEVATION_CORRECTION_THRESHOLD_M);

        if let Some(elevation_difference) = difference {
            let mut shifts = vec![0.0; series.values.len()];
            for (bucket, value) in series.values.iter_mut().enumerate() {
                let input = CorrectionInput {
                    elevation_difference,
                    temperature_shift: temperature_shift.get(bucket).copied().unwrap_or(0.0),
                    corrected_temperature: corrected_temperature
                        .as_ref()
                        .and_then(|t| t.get(bucket).copied()),
                };
                if let Some(delta) = strategy.correction(&input) {
                    *value += delta;
                    shifts[bucket] = delta;
                }
            }
            debug!(
                "{}: corrected for {:.0} m elevation difference",
                element, elevation_difference
            );
            if is_temperature {
                temperature_shift = shifts;
            }
        }
        if is_temperature {
            corrected_temperature = Some(series.values.clone());
        }
    }
}

/// Fuses and corrects every element, in request order. Elements without a result are left
/// out.
pub fn fuse_all(state: &SearchState) -> Vec<(String, Vec<f64>)> {
    let mut fused: Vec<(String, FusedSeries)> = state
        .elements
        .iter()
        .filter_map(|element| {
            let series = fuse_element(state, element);
            if series.is_none() {
                debug!("{}: no result ({})", element.id, element.mode);
            }
            series.map(|s| (element.id.clone(), s))
        })
        .collect();
    apply_elevation_corrections(state.center.elevation, &mut fused);
    fused
        .into_iter()
        .map(|(element, series)| (element, series.values))
        .collect()
}
