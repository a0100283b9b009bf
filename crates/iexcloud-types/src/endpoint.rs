//! Endpoint descriptors and request options.

use serde::{Deserialize, Serialize};

/// A queryable IEX Cloud resource.
///
/// Basic endpoints are fetched on their own; stock endpoints are always
/// fetched through the market batch resource, keyed by symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Reference list of all supported symbols.
    Symbols,
    /// API system status.
    SystemStatus,
    /// Latest quote for a stock.
    Quote,
    /// Company profile for a stock.
    Company,
}

impl Endpoint {
    /// Returns the path segment the API accepts for this endpoint.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Symbols => "ref-data/symbols",
            Self::SystemStatus => "status",
            Self::Quote => "quote",
            Self::Company => "company",
        }
    }

    /// Returns a human-readable endpoint name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Symbols => "Stock Symbols",
            Self::SystemStatus => "System Status",
            Self::Quote => "Quote",
            Self::Company => "Company",
        }
    }

    /// Returns true if the endpoint is queried per symbol.
    #[must_use]
    pub const fn is_stock(&self) -> bool {
        matches!(self, Self::Quote | Self::Company)
    }

    /// Returns all endpoints.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Symbols, Self::SystemStatus, Self::Quote, Self::Company]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    /// The stable channel.
    #[default]
    Stable,
    /// Pinned version 1.
    V1,
    /// Pre-release channel.
    Beta,
}

impl Version {
    /// Returns the path segment for this version.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::V1 => "v1",
            Self::Beta => "beta",
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether to query production data or the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Real production data.
    #[default]
    Authentic,
    /// Randomized sandbox data that does not count against quotas.
    Sandbox,
}

/// Options attached to a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointOptions {
    /// Extra query parameters, in insertion order.
    pub options: Vec<(String, String)>,
    /// API version.
    pub version: Version,
    /// Production or sandbox.
    pub data_type: DataType,
}

impl EndpointOptions {
    /// Creates options for the sandbox environment.
    #[must_use]
    pub fn sandbox() -> Self {
        Self {
            data_type: DataType::Sandbox,
            ..Self::default()
        }
    }

    /// Adds a query option. Booleans and numbers are rendered with `Display`.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.options.push((key.into(), value.to_string()));
        self
    }

    /// Sets the API version.
    #[must_use]
    pub const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}
