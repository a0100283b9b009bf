//! Raw fetch of an arbitrary JSON URL.

use anyhow::{Context, Result, anyhow};
use iexcloud_lib::prelude::*;

use crate::display::{Format, print_json};

/// Parses a `key=value` argument.
pub(crate) fn parse_param(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{arg}`"))?;
    Ok((key.to_string(), value.to_string()))
}

/// Fetches `base` with the given query parameters and prints the JSON.
pub(crate) fn get(
    base: &str,
    params: &[(String, String)],
    max_connections: usize,
    policy: &RetryBehavior,
    format: Format,
) -> Result<()> {
    let params = Params::from_pairs(params.iter().map(|(k, v)| (k, v)))
        .context("Invalid query parameter")?;
    let url = Url::with_params(base, &params).context("Invalid URL")?;

    let urls = UrlSet::from([url.clone()]);
    let mut results = fetch(&urls, max_connections, policy);
    let value = results
        .remove(&url)
        .ok_or_else(|| anyhow!("No result for {url}"))?
        .with_context(|| format!("Failed to fetch {url}"))?;
    print_json(&value, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("symbols=AAPL,MSFT"),
            Ok(("symbols".to_string(), "AAPL,MSFT".to_string()))
        );
        assert_eq!(parse_param("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_param("novalue").is_err());
    }
}
