//! Commands for endpoints that take no symbols.

use anyhow::{Context, Result};
use iexcloud_lib::prelude::*;

use crate::display::{Format, print_json};

/// Fetches a basic endpoint and prints it.
pub(crate) fn show(
    client: &IexClient,
    endpoint: Endpoint,
    options: &EndpointOptions,
    format: Format,
) -> Result<()> {
    let value = client
        .get(endpoint, options)
        .with_context(|| format!("Failed to fetch {endpoint}"))?;
    print_json(&value, format)
}
