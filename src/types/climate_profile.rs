use serde::Serialize;
use std::collections::BTreeMap;

/// Estimated monthly series per element, January first.
///
/// Elements for which no estimate could be produced are absent.
///
/// # Examples
///
/// ```
/// use frost_climate::ClimateProfile;
///
/// let profile = ClimateProfile::new(
///     vec![("mean(air_temperature P1M)".to_string(), vec![-4.3; 12])],
///     6,
/// );
/// assert_eq!(profile.get("mean(air_temperature P1M)").map(|s| s.len()), Some(12));
/// assert!(profile.get("mean(cloud_area_fraction P1M)").is_none());
/// assert_eq!(profile.request_count(), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClimateProfile {
    series: BTreeMap<String, Vec<f64>>,
    request_count: usize,
}

impl ClimateProfile {
    pub fn new(series: impl IntoIterator<Item = (String, Vec<f64>)>, request_count: usize) -> Self {
        Self {
            series: series.into_iter().collect(),
            request_count,
        }
    }

    pub fn get(&self, element: &str) -> Option<&[f64]> {
        self.series.get(element).map(Vec::as_slice)
    }

    /// Ids of the elements that have a series.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Remote calls made while estimating.
    pub fn request_count(&self) -> usize {
        self.request_count
    }

    pub fn into_series(self) -> BTreeMap<String, Vec<f64>> {
        self.series
    }
}
