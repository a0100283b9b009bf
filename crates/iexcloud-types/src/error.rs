//! Error types for iexcloud.

use thiserror::Error;

use crate::Endpoint;

/// Result type alias for iexcloud operations.
pub type Result<T> = std::result::Result<T, IexError>;

/// Errors that can occur while querying IEX Cloud.
#[derive(Error, Debug)]
pub enum IexError {
    /// The HTTP transport could not be initialized.
    #[error("Initialization failed: {0}")]
    Init(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request failed after all retries.
    #[error("Request failed: {0}")]
    Fetch(String),

    /// The server answered, but not with data for the requested endpoint.
    #[error("No data returned for {endpoint}")]
    NoData {
        /// The endpoint that returned nothing.
        endpoint: Endpoint,
    },

    /// The response had an unexpected shape.
    #[error("Unexpected response format: {0}")]
    Format(String),
}
