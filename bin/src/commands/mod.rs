//! CLI command implementations.

pub(crate) mod basic;
pub(crate) mod get;
pub(crate) mod stock;
