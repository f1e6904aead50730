use crate::transport::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is not set")]
    MissingVar(&'static str),

    #[error("Environment variable '{name}' has an invalid value '{value}'")]
    InvalidVar { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum FrostClimateError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("At least one element is required")]
    NoElements,

    #[error("No stations are listed for '{element}'")]
    NoStationsListed { element: String },

    #[error("None of the {checked} station(s) listed for '{element}' has a complete {interval} window")]
    NoCompleteWindow {
        element: String,
        interval: String,
        checked: usize,
    },
}
