//! Declarative retry policy and the per-transfer retry decision.

use std::collections::HashSet;
use std::time::Duration;

/// An HTTP response status, such as 404 (Not Found).
pub type HttpResponseCode = u16;

/// Determines whether and how HTTP requests are retried.
///
/// The default never retries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryBehavior {
    /// A URL is requested at most this many times + 1. Zero disables retries
    /// even if a response code matches.
    pub max_retries: u32,
    /// Error statuses that justify a retry.
    pub responses_to_retry: HashSet<HttpResponseCode>,
    /// Retry when the request succeeded but returned no data.
    pub retry_if_empty_response_data: bool,
    /// Delay before a retried request is re-issued.
    pub timeout: Duration,
}

impl RetryBehavior {
    /// Sets the retry cap.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Adds HTTP statuses that should be retried.
    #[must_use]
    pub fn with_responses_to_retry(
        mut self,
        codes: impl IntoIterator<Item = HttpResponseCode>,
    ) -> Self {
        self.responses_to_retry.extend(codes);
        self
    }

    /// Enables or disables retrying empty bodies.
    #[must_use]
    pub const fn with_retry_if_empty(mut self, retry: bool) -> Self {
        self.retry_if_empty_response_data = retry;
        self
    }

    /// Sets the backoff before a retry.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Decides what to do with a finished transfer, given how many retries
    /// that URL has already used in the current batch.
    #[must_use]
    pub fn decide(&self, outcome: TransferOutcome, retries_so_far: u32) -> RetryDecision {
        if retries_so_far >= self.max_retries {
            return RetryDecision::Finalize;
        }

        let retry = match outcome {
            TransferOutcome::HttpError(code) => self.responses_to_retry.contains(&code),
            TransferOutcome::Received { empty } => empty && self.retry_if_empty_response_data,
            TransferOutcome::TransportError => false,
        };

        if retry {
            RetryDecision::Retry
        } else {
            RetryDecision::Finalize
        }
    }
}

/// What a single transfer attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The transfer finished with a success status.
    Received {
        /// No body bytes arrived.
        empty: bool,
    },
    /// The server answered with an error status (>= 400).
    HttpError(HttpResponseCode),
    /// The transfer failed without an HTTP status (connect, TLS, malformed URL, ...).
    TransportError,
}

/// Result of evaluating a [`RetryBehavior`] against a [`TransferOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Clear the handle and re-issue the request after the backoff.
    Retry,
    /// Keep whatever the transfer produced.
    Finalize,
}
