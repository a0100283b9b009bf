//! IEX Cloud client.
//!
//! - [`IexClient`] - Fetches basic and stock endpoints
//! - [`urls`] - Request URL builders
//! - [`ApiConfig`] - Hosts and connection limits
//! - [`retry_behavior`] / [`set_retry_behavior`] - The process-wide retry policy
//!
//! # Example
//!
//! ```no_run
//! use iexcloud_api::IexClient;
//! use iexcloud_types::{Endpoint, EndpointOptions, Keys};
//!
//! let keys = Keys {
//!     secret_key: std::env::var("IEX_SECRET_KEY").unwrap(),
//!     ..Keys::default()
//! };
//! let client = IexClient::with_defaults(keys).unwrap();
//! let status = client
//!     .get(Endpoint::SystemStatus, &EndpointOptions::default())
//!     .unwrap();
//! println!("{status}");
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/iexcloud-rs/iexcloud/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
pub mod urls;

pub use client::{EndpointData, IexClient, retry_behavior, set_retry_behavior};
pub use config::{
    ApiConfig, CLOUD_BASE_URL, DEFAULT_REQUEST_LIMIT_TIMEOUT, HTTP_TOO_MANY_REQUESTS,
    MAX_SYMBOLS_PER_BATCH, SANDBOX_BASE_URL, default_retry_behavior,
};
