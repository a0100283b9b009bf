//! Concurrent URL-to-JSON fetch engine.
//!
//! This crate turns a set of [`Url`]s into one bounded-parallelism batch of
//! HTTP GET requests and returns a [`UrlJsonMap`] with the parsed JSON (or the
//! failure) for every URL:
//!
//! - [`fetch`] / [`fetch_one`] - Run a batch on the calling thread
//! - [`RetryBehavior`] - Which failures are retried, how often, and the backoff
//! - [`RateGate`] - Spaces batches from every thread at least one cooldown apart
//! - [`init`] / [`init_with`] - One-time transport setup
//!
//! # Threading
//!
//! Each OS thread that calls [`fetch`] gets its own I/O multiplexer and pool of
//! connection handles, created on first use and dropped when the thread exits.
//! `fetch` blocks the calling thread; from async code, call it through a
//! blocking-task facility such as `tokio::task::spawn_blocking`.
//!
//! # Example
//!
//! ```no_run
//! use iexcloud_fetch::{Params, RetryBehavior, Url, UrlSet, fetch};
//!
//! iexcloud_fetch::init().unwrap();
//!
//! let params = Params::from_pairs([("foo1", "bar1")]).unwrap();
//! let url = Url::with_params("https://postman-echo.com/get", &params).unwrap();
//! let urls: UrlSet = [url.clone()].into();
//!
//! let results = fetch(&urls, 0, &RetryBehavior::default());
//! println!("{:?}", results.get(&url));
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/iexcloud-rs/iexcloud/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregate;
mod client;
mod error;
mod gate;
mod pool;
mod retry;
mod scheduler;
mod url;

pub use aggregate::{UrlJsonMap, UrlResult};
pub use client::{TransportConfig, init, init_with};
pub use error::{AggregateError, FetchError, InvalidUrlError};
pub use gate::RateGate;
pub use retry::{HttpResponseCode, RetryBehavior, RetryDecision, TransferOutcome};
pub use url::{Param, Params, Url, UrlMap, UrlSet};

use serde_json::Value;

/// Fetches every URL in `urls` as one batch, blocking until all are finalized.
///
/// At most `max_connections` transfers run at once; zero means no limit.
/// Every URL in `urls` has an entry in the result, holding either the parsed
/// JSON or why none was produced.
///
/// Does not wait on any [`RateGate`]; use [`RateGate::fetch`] for that.
///
/// Blocks the calling thread. Called from within an async runtime, every URL
/// fails with [`FetchError::Runtime`] instead; use
/// `tokio::task::spawn_blocking` there.
#[must_use]
pub fn fetch(urls: &UrlSet, max_connections: usize, policy: &RetryBehavior) -> UrlJsonMap {
    scheduler::run_local(urls, max_connections, policy)
}

/// Fetches a single URL, returning `None` if it produced no JSON.
///
/// Returns `None` when called from within an async runtime, as [`fetch`]
/// fails the URL there.
#[must_use]
pub fn fetch_one(url: &Url, max_connections: usize, policy: &RetryBehavior) -> Option<Value> {
    let urls = UrlSet::from([url.clone()]);
    fetch(&urls, max_connections, policy).remove(url)?.ok()
}
