//! Endpoints, credentials, timeouts and retry behaviour of the Frost client.

use crate::error::ConfigError;
use bon::bon;
use std::time::Duration;

pub const DEFAULT_SEARCH_URL: &str = "https://frost-beta.met.no/api/v1/obs/met.no/filter/get";
pub const DEFAULT_OBSERVATIONS_URL: &str = "https://frost.met.no/observations/v0.jsonld";
pub const DEFAULT_STATION_LIST_URL: &str = "https://rim.k8s.met.no/api/v1/stations";

pub const CLIENT_ID_VAR: &str = "FROST_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "FROST_CLIENT_SECRET";
pub const TIMEOUT_SECS_VAR: &str = "FROST_TIMEOUT_SECS";
pub const MAX_RETRIES_VAR: &str = "FROST_MAX_RETRIES";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Exponential backoff for retryable failures (HTTP 429, timeouts, network errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; a request is sent at most `max_retries + 1` times.
    pub max_retries: u32,
    /// Delay before the first retry. Doubles on every further retry.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
        }
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}

/// Configuration of [`FrostApi`](crate::FrostApi).
///
/// # Examples
///
/// ```
/// use frost_climate::{FrostConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = FrostConfig::builder()
///     .client_id("my-client-id")
///     .timeout(Duration::from_secs(30))
///     .retry(RetryPolicy::new(5, Duration::from_millis(500)))
///     .build();
/// assert_eq!(config.connect_timeout, Duration::from_secs(10));
/// assert!(config.client_secret.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FrostConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub search_url: String,
    pub observations_url: String,
    pub station_list_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
}

#[bon]
impl FrostConfig {
    #[builder]
    pub fn new(
        #[builder(into)] client_id: String,
        #[builder(into)] client_secret: Option<String>,
        #[builder(into)] search_url: Option<String>,
        #[builder(into)] observations_url: Option<String>,
        #[builder(into)] station_list_url: Option<String>,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
        retry: Option<RetryPolicy>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            search_url: search_url.unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string()),
            observations_url: observations_url
                .unwrap_or_else(|| DEFAULT_OBSERVATIONS_URL.to_string()),
            station_list_url: station_list_url
                .unwrap_or_else(|| DEFAULT_STATION_LIST_URL.to_string()),
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: connect_timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: retry.unwrap_or_default(),
        }
    }

    /// Reads `FROST_CLIENT_ID` (required), `FROST_CLIENT_SECRET`, `FROST_TIMEOUT_SECS` and
    /// `FROST_MAX_RETRIES` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = lookup(CLIENT_ID_VAR)
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::MissingVar(CLIENT_ID_VAR))?;
        let timeout = lookup(TIMEOUT_SECS_VAR)
            .map(|raw| parse_var::<u64>(TIMEOUT_SECS_VAR, raw))
            .transpose()?
            .map(Duration::from_secs);
        let retry = lookup(MAX_RETRIES_VAR)
            .map(|raw| parse_var::<u32>(MAX_RETRIES_VAR, raw))
            .transpose()?
            .map(|max_retries| RetryPolicy {
                max_retries,
                ..RetryPolicy::default()
            });

        Ok(Self::builder()
            .client_id(client_id)
            .maybe_client_secret(lookup(CLIENT_SECRET_VAR))
            .maybe_timeout(timeout)
            .maybe_connect_timeout(timeout)
            .maybe_retry(retry)
            .build())
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVar { name, value: raw })
}
