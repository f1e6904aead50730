//! Wire schemas of the three Frost endpoints. Only the fields the search uses are modelled;
//! everything else in the payloads is ignored.

pub mod observations;
pub mod station_list;
pub mod station_search;

use serde::de::{Deserializer, Error as DeError};
use serde::Deserialize;
use serde_json::Value;

/// Station ids arrive as integers from the search endpoint and as strings elsewhere.
pub(crate) fn deserialize_station_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(D::Error::custom(format!(
            "Unexpected type for station id: {:?}",
            other
        ))),
    }
}

/// Turns a Frost source id like `SN18700:0` into the bare station id `18700`.
pub fn normalize_source_id(source_id: &str) -> &str {
    let without_sensor = source_id
        .rsplit_once(':')
        .map_or(source_id, |(id, _)| id);
    without_sensor
        .strip_prefix("SN")
        .unwrap_or(without_sensor)
}
