//! Collecting per-URL outcomes into the map handed back to callers.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use tracing::warn;

use crate::client::Completion;
use crate::{AggregateError, FetchError, Url, UrlMap};

/// Outcome of fetching one URL.
pub type UrlResult = Result<Value, FetchError>;

/// The result of a batch: one entry per submitted URL.
///
/// A URL that failed is still present, with its cause. Use
/// [`contains_url`](Self::contains_url) to tell "never submitted" apart from
/// "submitted but failed" ([`get`](Self::get) returns `None` in both cases).
#[derive(Debug, Default)]
pub struct UrlJsonMap {
    entries: UrlMap<UrlResult>,
}

impl UrlJsonMap {
    /// Returns the JSON for `url`, or `None` if it failed or was not submitted.
    #[must_use]
    pub fn get(&self, url: &Url) -> Option<&Value> {
        self.entries.get(url).and_then(|r| r.as_ref().ok())
    }

    /// Returns the failure for `url`, if it failed.
    #[must_use]
    pub fn error(&self, url: &Url) -> Option<&FetchError> {
        self.entries.get(url).and_then(|r| r.as_ref().err())
    }

    /// Returns true if `url` was part of the batch.
    #[must_use]
    pub fn contains_url(&self, url: &Url) -> bool {
        self.entries.contains_key(url)
    }

    /// Removes and returns the entry for `url`.
    pub fn remove(&mut self, url: &Url) -> Option<UrlResult> {
        self.entries.remove(url)
    }

    /// Number of URLs in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the batch was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every entry.
    pub fn iter(&self) -> impl Iterator<Item = (&Url, &UrlResult)> {
        self.entries.iter()
    }

    /// Iterates over the URLs that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&Url, &FetchError)> {
        self.entries
            .iter()
            .filter_map(|(url, r)| r.as_ref().err().map(|e| (url, e)))
    }

    /// Returns true if every URL produced JSON.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.entries.values().all(Result::is_ok)
    }

    /// Converts into a plain map of successes, failing if any URL failed.
    ///
    /// # Errors
    ///
    /// Returns an [`AggregateError`] naming every failing URL and its cause.
    pub fn into_result(self) -> Result<UrlMap<Value>, AggregateError> {
        let total = self.entries.len();
        let mut values = HashMap::with_capacity(total);
        let mut failures = Vec::new();

        for (url, result) in self.entries {
            match result {
                Ok(value) => {
                    values.insert(url, value);
                }
                Err(e) => failures.push((url, e)),
            }
        }

        if failures.is_empty() {
            Ok(values)
        } else {
            Err(AggregateError { failures, total })
        }
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> UrlMap<UrlResult> {
        self.entries
    }
}

impl IntoIterator for UrlJsonMap {
    type Item = (Url, UrlResult);
    type IntoIter = std::collections::hash_map::IntoIter<Url, UrlResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Builds a [`UrlJsonMap`] as transfers are finalized.
#[derive(Debug)]
pub(crate) struct ResultAggregator {
    entries: UrlMap<UrlResult>,
}

impl ResultAggregator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Records a finalized transfer and its body.
    pub(crate) fn record(&mut self, url: Url, completion: Completion, body: &Bytes) {
        let result = match completion {
            Completion::Failed(e) => Err(FetchError::Transport(e)),
            Completion::Done => parse_body(body),
        };
        self.insert(url, result);
    }

    /// Records a URL that failed before any transfer started.
    pub(crate) fn record_failure(&mut self, url: Url, error: FetchError) {
        self.insert(url, Err(error));
    }

    fn insert(&mut self, url: Url, result: UrlResult) {
        if let Err(e) = &result {
            warn!(%url, error = %e, "fetch failed");
        }
        self.entries.insert(url, result);
    }

    pub(crate) fn finish(self) -> UrlJsonMap {
        UrlJsonMap {
            entries: self.entries,
        }
    }
}

fn parse_body(body: &[u8]) -> UrlResult {
    if body.is_empty() {
        return Err(FetchError::EmptyResponse);
    }
    serde_json::from_slice(body).map_err(FetchError::Parse)
}
