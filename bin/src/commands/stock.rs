//! Commands for per-symbol stock endpoints.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use iexcloud_lib::prelude::*;
use serde_json::Value;

use crate::display::{Format, print_json};

/// Fetches one stock endpoint for several symbols and prints an object keyed
/// by symbol.
pub(crate) fn show(
    client: &IexClient,
    endpoint: Endpoint,
    symbols: &[String],
    options: &EndpointOptions,
    format: Format,
) -> Result<()> {
    let requested: SymbolSet = symbols.iter().map(Symbol::new).collect();
    let data = client
        .get_stock(&[endpoint], &requested, options)
        .with_context(|| format!("Failed to fetch {endpoint}"))?;

    let by_symbol = sections(data, endpoint);
    for symbol in &requested {
        if !by_symbol.contains_key(symbol.as_str()) {
            tracing::warn!(%symbol, %endpoint, "no data returned");
        }
    }
    print_json(&by_symbol, format)
}

/// Picks one endpoint's section per symbol, ordered by symbol.
fn sections(data: SymbolMap<EndpointData>, endpoint: Endpoint) -> BTreeMap<String, Value> {
    data.into_iter()
        .filter_map(|(symbol, mut endpoints)| {
            endpoints
                .remove(&endpoint)
                .map(|value| (symbol.as_str().to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sections_keeps_requested_endpoint() {
        let mut data = SymbolMap::new();
        data.insert(
            Symbol::new("msft"),
            EndpointData::from([(Endpoint::Quote, json!({"latestPrice": 2}))]),
        );
        data.insert(Symbol::new("aapl"), EndpointData::new());

        let picked = sections(data, Endpoint::Quote);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked["MSFT"], json!({"latestPrice": 2}));
    }
}
