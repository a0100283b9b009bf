//! Errors produced by the fetch engine.

use thiserror::Error;

use crate::Url;

/// Raised when a [`Url`] or [`Param`](crate::Param) is constructed from empty parts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidUrlError {
    /// The base of the URL was empty.
    #[error("Empty Url")]
    EmptyUrl,

    /// A parameter had an empty key.
    #[error("Empty Param key")]
    EmptyParamKey,

    /// A parameter had an empty value.
    #[error("Empty Param value")]
    EmptyParamValue,

    /// An element of a list-valued parameter was empty.
    #[error("Empty Param list value")]
    EmptyParamListValue,
}

/// Why a single URL of a batch produced no JSON.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL could not be constructed.
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),

    /// The transport layer could not be initialized.
    #[error("Transport initialization failed: {0}")]
    Init(String),

    /// The calling thread could not start its I/O driver.
    #[error("Failed to start I/O driver: {0}")]
    Runtime(String),

    /// The request failed: connection error, TLS error, or an HTTP error status.
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request succeeded but the body was empty.
    #[error("Empty response body")]
    EmptyResponse,

    /// The body was not valid JSON.
    #[error("Invalid JSON in response: {0}")]
    Parse(#[source] serde_json::Error),
}

impl FetchError {
    /// Returns the HTTP status if the failure was an error response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// At least one URL in a batch failed.
#[derive(Error, Debug)]
#[error("{} of {total} urls failed: {}", .failures.len(), describe(.failures))]
pub struct AggregateError {
    /// Every failing URL with its cause.
    pub failures: Vec<(Url, FetchError)>,
    /// Number of URLs in the batch.
    pub total: usize,
}

fn describe(failures: &[(Url, FetchError)]) -> String {
    failures
        .iter()
        .map(|(url, err)| format!("[{url}: {err}]"))
        .collect::<Vec<_>>()
        .join(", ")
}
