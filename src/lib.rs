mod config;
mod error;
mod frost_climate;
mod nearest_window;
mod search;
mod transport;
mod types;

pub use config::*;
pub use error::{ConfigError, FrostClimateError};
pub use frost_climate::*;

pub use transport::error::{ApiError, ApiErrorKind};
pub use transport::frost_api::{FrostApi, FrostSource};
pub use transport::http_client::{classify_status, Endpoint, HttpClient, StatusClass};

pub use types::climate_profile::ClimateProfile;
pub use types::element::{
    correction_priority, normalize_value, strategy_for, CorrectionInput, ElementKind,
    ElementStrategy, ELEVATION_CORRECTION_THRESHOLD_M, HOURLY_SHORTWAVE_FLUX,
    MEAN_AIR_TEMPERATURE, MEAN_CLOUD_AREA_FRACTION, MEAN_SNOW_COVERAGE_TYPE,
};
pub use types::mode::Mode;
pub use types::point::Point;
pub use types::quadrant::{Quadrant, QuadrantMap};
pub use types::query::{ObservationQuery, Polygon, RegionQuery};
pub use types::responses::observations::*;
pub use types::responses::station_list::*;
pub use types::responses::station_search::*;
pub use types::time_range::{TimeInterval, TimeRange};

pub use search::accumulator::{BucketSums, ObservationAccumulator};
pub use search::fusion::{idw_weights, ols_intercepts};
pub use search::geometry::{
    annular_sector, destination_point, distance, ring_radius, search_circle, surface_distance,
    RING_WIDTH_KM,
};
