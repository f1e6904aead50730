use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response of `observations/v0.jsonld`.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub data: Vec<ObservationData>,
}

/// All observations of one source at one reference time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationData {
    pub source_id: String,
    pub reference_time: DateTime<Utc>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub element_id: String,
    pub value: f64,
    pub unit: Option<String>,
    pub quality_code: Option<i32>,
}
