pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod frost_api;
pub mod http_client;
