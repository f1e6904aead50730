use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} was not authorized ({status})")]
    Unauthorized { url: String, status: StatusCode },

    #[error("Request to {url} was rejected as malformed")]
    BadRequest { url: String },

    #[error("Server error for {url} ({status})")]
    Server { url: String, status: StatusCode },

    #[error("Too many requests to {url}, giving up after retries")]
    Overloaded { url: String },

    #[error("Network request failed for {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Could not resolve host for {url}")]
    UnresolvedHost {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus { url: String, status: StatusCode },

    #[error("Failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL '{url}'")]
    InvalidUrl { url: String },

    #[error("Failed to encode query parameters")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

/// Coarse classification of [`ApiError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    Timeout,
    Authorization,
    ServerError,
    Overload,
    Network,
    MalformedRequest,
    Unknown,
}

impl ApiError {
    /// Maps the error onto the coarse taxonomy callers branch on.
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Timeout { .. } => ApiErrorKind::Timeout,
            ApiError::Unauthorized { .. } => ApiErrorKind::Authorization,
            ApiError::BadRequest { .. } => ApiErrorKind::MalformedRequest,
            ApiError::Server { .. } => ApiErrorKind::ServerError,
            ApiError::Overloaded { .. } => ApiErrorKind::Overload,
            ApiError::Network { .. } | ApiError::UnresolvedHost { .. } => ApiErrorKind::Network,
            ApiError::UnexpectedStatus { .. }
            | ApiError::Decode { .. }
            | ApiError::Request { .. }
            | ApiError::InvalidUrl { .. }
            | ApiError::Encode(_)
            | ApiError::ClientBuild(_) => ApiErrorKind::Unknown,
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::Authorization => "authorization",
            ApiErrorKind::ServerError => "server error",
            ApiErrorKind::Overload => "overload",
            ApiErrorKind::Network => "network",
            ApiErrorKind::MalformedRequest => "malformed request",
            ApiErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
