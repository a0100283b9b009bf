//! IEX Cloud market data client.
//!
//! This is a facade crate that re-exports functionality from the iexcloud
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```no_run
//! use iexcloud_lib::prelude::*;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let keys = Keys {
//!         secret_key: std::env::var("IEX_SECRET_KEY")?,
//!         ..Keys::default()
//!     };
//!     let client = IexClient::with_defaults(keys)?;
//!
//!     let symbols: SymbolSet = ["aapl", "msft"].into_iter().map(Symbol::new).collect();
//!     let quotes = client.get_stock(&[Endpoint::Quote], &symbols, &EndpointOptions::default())?;
//!     for (symbol, data) in &quotes {
//!         if let Some(quote) = data.get(&Endpoint::Quote) {
//!             println!("{symbol}: {}", quote["latestPrice"]);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/iexcloud-rs/iexcloud/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use iexcloud_types::*;

// Re-export the fetch engine
#[cfg(feature = "fetch")]
pub use iexcloud_fetch::{
    AggregateError, FetchError, HttpResponseCode, InvalidUrlError, Param, Params, RateGate,
    RetryBehavior, TransportConfig, Url, UrlJsonMap, UrlMap, UrlResult, UrlSet, fetch, fetch_one,
    init, init_with,
};

// Re-export the API client
#[cfg(feature = "api")]
pub use iexcloud_api::{
    ApiConfig, DEFAULT_REQUEST_LIMIT_TIMEOUT, EndpointData, HTTP_TOO_MANY_REQUESTS, IexClient,
    default_retry_behavior, retry_behavior, set_retry_behavior, urls,
};

/// Prelude module for convenient imports.
///
/// ```
/// use iexcloud_lib::prelude::*;
/// ```
pub mod prelude {
    pub use iexcloud_types::{
        DataType, Endpoint, EndpointOptions, IexError, Keys, Result, Symbol, SymbolMap,
        SymbolSet, Version,
    };

    #[cfg(feature = "fetch")]
    pub use iexcloud_fetch::{Params, RateGate, RetryBehavior, Url, UrlJsonMap, UrlSet, fetch};

    #[cfg(feature = "api")]
    pub use iexcloud_api::{ApiConfig, EndpointData, IexClient};
}
