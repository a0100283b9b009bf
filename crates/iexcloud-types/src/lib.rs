//! Core types for the iexcloud market data client.
//!
//! This crate provides the fundamental data structures used throughout iexcloud:
//!
//! - [`Symbol`] - An upper-cased ticker symbol
//! - [`Endpoint`] - A queryable IEX Cloud resource
//! - [`Version`] / [`DataType`] - API version and production/sandbox selection
//! - [`EndpointOptions`] - Extra query options for a request
//! - [`Keys`] - API keys used to sign requests
//! - [`IexError`] - Errors surfaced by the API layer

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/iexcloud-rs/iexcloud/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod endpoint;
mod error;
mod keys;
mod symbol;

pub use endpoint::{DataType, Endpoint, EndpointOptions, Version};
pub use error::{IexError, Result};
pub use keys::Keys;
pub use symbol::{Symbol, SymbolMap, SymbolSet};
