//! Per-element behaviour: how raw readings are normalized before aggregation and how a fused
//! series is corrected for the elevation difference between target and source.
//!
//! Elements are matched by substring of the Frost element id, so both
//! `mean(air_temperature P1M)` and `air_temperature` resolve to the temperature strategy.

pub const MEAN_AIR_TEMPERATURE: &str = "mean(air_temperature P1M)";
pub const MEAN_SNOW_COVERAGE_TYPE: &str = "mean(snow_coverage_type P1M)";
pub const MEAN_CLOUD_AREA_FRACTION: &str = "mean(cloud_area_fraction P1M)";
pub const HOURLY_SHORTWAVE_FLUX: &str = "mean(surface_downwelling_shortwave_flux_in_air PT1H)";

/// Below this absolute elevation difference (metres) no correction is applied.
pub const ELEVATION_CORRECTION_THRESHOLD_M: f64 = 250.0;

const TEMPERATURE_LAPSE_RATE: f64 = -0.0065;
const SNOW_PER_DEGREE: f64 = 0.08;
const SNOW_THAW_TEMPERATURE: f64 = 5.0;
const CLOUD_METRES_PER_OKTA: f64 = 2000.0;

/// The climate variables with dedicated handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    AirTemperature,
    SnowCoverageType,
    CloudAreaFraction,
    ShortwaveFlux,
}

/// Everything an elevation correction may look at for one bucket.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionInput {
    /// Target elevation minus source elevation, in metres.
    pub elevation_difference: f64,
    /// The temperature shift applied to the same bucket, `0.0` if none was.
    pub temperature_shift: f64,
    /// The already corrected temperature of the same bucket, if temperature was estimated.
    pub corrected_temperature: Option<f64>,
}

/// Normalization and correction rules for one element kind.
#[derive(Debug, Clone, Copy)]
pub struct ElementStrategy {
    pub kind: ElementKind,
    key: &'static str,
    /// Lower runs first when correcting. Temperature must precede snow.
    pub priority: u8,
    normalize: fn(f64) -> f64,
    correct: Option<fn(&CorrectionInput) -> f64>,
}

impl ElementStrategy {
    /// Remaps a raw reading (sentinels, negative noise) before it is aggregated.
    pub fn normalize(&self, value: f64) -> f64 {
        (self.normalize)(value)
    }

    /// The additive correction for one bucket, or `None` for elements without one.
    pub fn correction(&self, input: &CorrectionInput) -> Option<f64> {
        self.correct.map(|correct| correct(input))
    }
}

static STRATEGIES: [ElementStrategy; 4] = [
    ElementStrategy {
        kind: ElementKind::AirTemperature,
        key: "air_temperature",
        priority: 0,
        normalize: identity,
        correct: Some(temperature_correction),
    },
    ElementStrategy {
        kind: ElementKind::SnowCoverageType,
        key: "snow_coverage_type",
        priority: 1,
        normalize: normalize_snow,
        correct: Some(snow_correction),
    },
    ElementStrategy {
        kind: ElementKind::CloudAreaFraction,
        key: "cloud_area_fraction",
        priority: 2,
        normalize: normalize_cloud,
        correct: Some(cloud_correction),
    },
    ElementStrategy {
        kind: ElementKind::ShortwaveFlux,
        key: "surface_downwelling_shortwave_flux_in_air",
        priority: 3,
        normalize: normalize_flux,
        correct: None,
    },
];

/// Looks up the strategy for a Frost element id. Unknown elements get `None`: values pass
/// through unchanged and no correction is applied.
pub fn strategy_for(element: &str) -> Option<&'static ElementStrategy> {
    STRATEGIES.iter().find(|s| element.contains(s.key))
}

/// Normalizes `value` for `element`, passing it through when the element is unknown.
pub fn normalize_value(element: &str, value: f64) -> f64 {
    strategy_for(element).map_or(value, |s| s.normalize(value))
}

/// Correction ordering key for an element. Unknown elements sort last.
pub fn correction_priority(element: &str) -> u8 {
    strategy_for(element).map_or(u8::MAX, |s| s.priority)
}

fn identity(value: f64) -> f64 {
    value
}

fn normalize_snow(value: f64) -> f64 {
    if value == -1.0 {
        0.0
    } else {
        value
    }
}

fn normalize_cloud(value: f64) -> f64 {
    if value == -3.0 || value == 9.0 {
        5.0
    } else {
        value
    }
}

fn normalize_flux(value: f64) -> f64 {
    value.max(0.0)
}

fn temperature_correction(input: &CorrectionInput) -> f64 {
    input.elevation_difference * TEMPERATURE_LAPSE_RATE
}

fn snow_correction(input: &CorrectionInput) -> f64 {
    let shift = input.temperature_shift;
    let stays_cold = input
        .corrected_temperature
        .is_some_and(|t| t < SNOW_THAW_TEMPERATURE);
    if shift > 0.0 || stays_cold {
        -shift * SNOW_PER_DEGREE
    } else {
        0.0
    }
}

fn cloud_correction(input: &CorrectionInput) -> f64 {
    -input.elevation_difference / CLOUD_METRES_PER_OKTA
}
