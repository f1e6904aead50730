//! The main entry point: climate profiles and nearest-station windows for any location.

use crate::config::FrostConfig;
use crate::error::FrostClimateError;
use crate::nearest_window::nearest_window;
use crate::search::orchestrator::estimate;
use crate::transport::frost_api::{FrostApi, FrostSource};
use crate::types::climate_profile::ClimateProfile;
use crate::types::point::Point;
use crate::types::time_range::{TimeInterval, TimeRange};
use bon::bon;

/// The client for estimating climate data from Frost observations.
///
/// Every request runs its own search: no state is shared between calls, so one client can be
/// used for any number of locations. By default data comes from the met.no services through
/// [`FrostApi`]; [`FrostClimate::with_source`] plugs in any other [`FrostSource`].
///
/// # Examples
///
/// ```rust
/// # use frost_climate::{FrostClimate, FrostClimateError};
/// # async fn run() -> Result<(), FrostClimateError> {
/// // Reads FROST_CLIENT_ID and friends.
/// let client = FrostClimate::from_env()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FrostClimate<S = FrostApi> {
    source: S,
}

impl FrostClimate<FrostApi> {
    /// Creates a client with default endpoints, timeouts and retries for the given Frost
    /// client id.
    ///
    /// # Errors
    ///
    /// Returns [`FrostClimateError::Api`] if the HTTP client cannot be built.
    pub fn new(client_id: impl Into<String>) -> Result<Self, FrostClimateError> {
        Self::with_config(FrostConfig::builder().client_id(client_id.into()).build())
    }

    /// Creates a client from `FROST_CLIENT_ID`, `FROST_CLIENT_SECRET`, `FROST_TIMEOUT_SECS` and
    /// `FROST_MAX_RETRIES`.
    ///
    /// # Errors
    ///
    /// Returns [`FrostClimateError::Config`] if the client id is missing or a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, FrostClimateError> {
        Self::with_config(FrostConfig::from_env()?)
    }

    pub fn with_config(config: FrostConfig) -> Result<Self, FrostClimateError> {
        Ok(Self {
            source: FrostApi::new(config)?,
        })
    }
}

impl<S: FrostSource> FrostClimate<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[bon]
impl<S: FrostSource> FrostClimate<S> {
    /// Estimates a monthly (January to December) profile for every element at `location`.
    ///
    /// Stations within 5 km are used directly. Otherwise the search widens in 20 km rings per
    /// quadrant and the result is either interpolated between quadrants or extrapolated along
    /// distance, then corrected for the elevation difference between the stations and the
    /// location when the location carries an elevation.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(Point)`: **Required.** The point to estimate for. Give it an elevation to
    ///   enable elevation correction.
    /// * `.elements(Vec<String>)`: **Required.** Frost element ids with a monthly resolution,
    ///   e.g. [`MEAN_AIR_TEMPERATURE`](crate::MEAN_AIR_TEMPERATURE).
    /// * `.time_range(TimeRange)`: Optional. Observations to average over. Defaults to
    ///   [`TimeRange::all_time`].
    ///
    /// # Errors
    ///
    /// Returns [`FrostClimateError::NoElements`] for an empty element list and
    /// [`FrostClimateError::Api`] for the first failing remote call. Elements without enough
    /// data are left out of the profile rather than failing the call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use frost_climate::{FrostClimate, FrostClimateError, Point, MEAN_AIR_TEMPERATURE};
    /// # async fn run() -> Result<(), FrostClimateError> {
    /// let client = FrostClimate::new("my-client-id")?;
    /// let profile = client
    ///     .climate_profile()
    ///     .location(Point::new(59.91, 10.75).with_elevation(23.0))
    ///     .elements(vec![MEAN_AIR_TEMPERATURE.to_string()])
    ///     .call()
    ///     .await?;
    /// if let Some(temperature) = profile.get(MEAN_AIR_TEMPERATURE) {
    ///     println!("July: {:.1} °C", temperature[6]);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn climate_profile(
        &self,
        location: Point,
        elements: Vec<String>,
        time_range: Option<TimeRange>,
    ) -> Result<ClimateProfile, FrostClimateError> {
        if elements.is_empty() {
            return Err(FrostClimateError::NoElements);
        }
        let time_range = time_range.unwrap_or_default();
        Ok(estimate(&self.source, location, &elements, time_range).await?)
    }

    /// Bucket averages of `element` at the closest station that reports every bucket of
    /// `interval` (e.g. all 24 hours of the day).
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(Point)`: **Required.** Stations are ranked by surface distance to it.
    /// * `.element(String)`: **Required.** A Frost element id.
    /// * `.interval(TimeInterval)`: Optional. Defaults to [`TimeInterval::Hour`].
    /// * `.time_range(TimeRange)`: Optional. Defaults to [`TimeRange::current_year`].
    ///
    /// # Errors
    ///
    /// Returns [`FrostClimateError::NoStationsListed`] when no station measures the element,
    /// [`FrostClimateError::NoCompleteWindow`] when none of them has a complete window, and
    /// [`FrostClimateError::Api`] for failing remote calls.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use frost_climate::{FrostClimate, FrostClimateError, Point, HOURLY_SHORTWAVE_FLUX};
    /// # async fn run() -> Result<(), FrostClimateError> {
    /// let client = FrostClimate::new("my-client-id")?;
    /// let daily_cycle = client
    ///     .nearest_window()
    ///     .location(Point::new(63.43, 10.39))
    ///     .element(HOURLY_SHORTWAVE_FLUX)
    ///     .call()
    ///     .await?;
    /// assert_eq!(daily_cycle.len(), 24);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn nearest_window(
        &self,
        location: Point,
        #[builder(into)] element: String,
        interval: Option<TimeInterval>,
        time_range: Option<TimeRange>,
    ) -> Result<Vec<f64>, FrostClimateError> {
        nearest_window(
            &self.source,
            location,
            &element,
            interval.unwrap_or(TimeInterval::Hour),
            time_range.unwrap_or_else(TimeRange::current_year),
        )
        .await
    }
}
