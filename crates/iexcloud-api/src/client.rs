//! Rate-limited IEX Cloud client.

use std::collections::HashMap;
use std::sync::LazyLock;

use iexcloud_fetch::{RateGate, RetryBehavior, Url, UrlSet};
use iexcloud_types::{
    Endpoint, EndpointOptions, IexError, Keys, Result, Symbol, SymbolMap, SymbolSet,
};
use serde_json::Value;
use tracing::debug;

use crate::urls::{endpoint_url, stock_batch_url};
use crate::{ApiConfig, MAX_SYMBOLS_PER_BATCH, default_retry_behavior};

/// The JSON sections returned for one symbol, keyed by endpoint.
pub type EndpointData = HashMap<Endpoint, Value>;

/// Every request in the process goes through this gate.
static GATE: LazyLock<RateGate> = LazyLock::new(|| RateGate::new(default_retry_behavior()));

/// Returns the retry policy applied to every request.
#[must_use]
pub fn retry_behavior() -> RetryBehavior {
    GATE.retry_behavior()
}

/// Replaces the retry policy applied to every request.
///
/// The policy's `timeout` is also the minimum spacing between requests.
pub fn set_retry_behavior(policy: RetryBehavior) {
    GATE.set_retry_behavior(policy);
}

/// Client for the IEX Cloud REST API.
///
/// Cheap to clone. Calls block the current thread; they are safe to make
/// from several threads at once.
#[derive(Debug, Clone)]
pub struct IexClient {
    keys: Keys,
    config: ApiConfig,
}

impl IexClient {
    /// Creates a client, initializing the HTTP transport if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IexError::Init`] if the transport cannot be initialized.
    pub fn new(keys: Keys, config: ApiConfig) -> Result<Self> {
        iexcloud_fetch::init().map_err(|e| IexError::Init(e.to_string()))?;
        Ok(Self { keys, config })
    }

    /// Creates a client against the public IEX Cloud hosts.
    ///
    /// # Errors
    ///
    /// Returns [`IexError::Init`] if the transport cannot be initialized.
    pub fn with_defaults(keys: Keys) -> Result<Self> {
        Self::new(keys, ApiConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches a basic endpoint such as [`Endpoint::SystemStatus`].
    ///
    /// # Errors
    ///
    /// Returns [`IexError::InvalidUrl`] for stock endpoints or a bad request,
    /// [`IexError::Fetch`] if the request failed after retries, and
    /// [`IexError::NoData`] if the server returned `null`.
    pub fn get(&self, endpoint: Endpoint, options: &EndpointOptions) -> Result<Value> {
        if endpoint.is_stock() {
            return Err(IexError::InvalidUrl(format!(
                "{endpoint} is queried per symbol; use get_stock"
            )));
        }

        let url = endpoint_url(&self.config, &self.keys, endpoint, options)
            .map_err(|e| IexError::InvalidUrl(e.to_string()))?;
        debug!(%endpoint, "requesting");

        match self.perform([url])?.into_iter().next() {
            Some((_, Value::Null)) | None => Err(IexError::NoData { endpoint }),
            Some((_, value)) => Ok(value),
        }
    }

    /// Fetches one or more stock endpoints for a set of symbols.
    ///
    /// Symbols are split into batches of at most [`MAX_SYMBOLS_PER_BATCH`],
    /// fetched together. Symbols the server did not return, and sections it
    /// did not return for a symbol, are omitted from the result.
    ///
    /// # Errors
    ///
    /// Returns [`IexError::InvalidUrl`] if `endpoints` contains a basic
    /// endpoint or either input is empty, [`IexError::Fetch`] if any batch
    /// failed after retries, and [`IexError::Format`] if a response is not a
    /// JSON object.
    pub fn get_stock(
        &self,
        endpoints: &[Endpoint],
        symbols: &SymbolSet,
        options: &EndpointOptions,
    ) -> Result<SymbolMap<EndpointData>> {
        if let Some(basic) = endpoints.iter().find(|e| !e.is_stock()) {
            return Err(IexError::InvalidUrl(format!("{basic} is not a stock endpoint")));
        }

        if symbols.is_empty() {
            return Err(IexError::InvalidUrl("no symbols requested".into()));
        }

        let mut sorted: Vec<&Symbol> = symbols.iter().collect();
        sorted.sort_unstable();
        let urls = sorted
            .chunks(MAX_SYMBOLS_PER_BATCH)
            .map(|chunk| {
                stock_batch_url(
                    &self.config,
                    &self.keys,
                    endpoints,
                    chunk.iter().copied(),
                    options,
                )
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| IexError::InvalidUrl(e.to_string()))?;
        debug!(symbols = symbols.len(), batches = urls.len(), "requesting stock batch");

        let mut data = SymbolMap::with_capacity(symbols.len());
        for (_, response) in self.perform(urls)? {
            collect_sections(&response, endpoints, symbols, &mut data)?;
        }
        Ok(data)
    }

    fn perform(&self, urls: impl IntoIterator<Item = Url>) -> Result<HashMap<Url, Value>> {
        let urls: UrlSet = urls.into_iter().collect();
        GATE.fetch(&urls, self.config.max_connections)
            .into_result()
            .map_err(|e| IexError::Fetch(e.to_string()))
    }
}

fn collect_sections(
    response: &Value,
    endpoints: &[Endpoint],
    symbols: &SymbolSet,
    data: &mut SymbolMap<EndpointData>,
) -> Result<()> {
    let by_symbol = match response {
        Value::Object(map) => map,
        Value::Null => return Ok(()),
        other => {
            return Err(IexError::Format(format!(
                "expected an object keyed by symbol, got {other}"
            )));
        }
    };

    for symbol in symbols {
        let Some(sections) = by_symbol.get(symbol.as_str()) else {
            continue;
        };
        let entry = data.entry(symbol.clone()).or_default();
        for &endpoint in endpoints {
            if let Some(section) = sections.get(endpoint.path()).filter(|v| !v.is_null()) {
                entry.insert(endpoint, section.clone());
            }
        }
    }
    Ok(())
}
